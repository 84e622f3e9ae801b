//! Rotor spin drive
//!
//! The drive is a fire-and-forget duty cycle sink; speed regulation is not
//! part of the display.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Current decay mode of the H-bridge while a side is idle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Decay {
    /// Idle side held low
    #[default]
    Fast,
    /// Idle side driven at the minimum duty
    Slow,
}

/// Signed power output for the rotor motor
pub trait SpinDrive {
    /// Error type for drive operations
    type Error;

    /// Largest accepted power magnitude
    const MAX_POWER: i16 = 255;

    /// Drive with `power` in `-MAX_POWER..=MAX_POWER`; sign picks direction,
    /// zero coasts
    fn set_power(&mut self, power: i16) -> Result<(), Self::Error>;

    /// Short both motor terminals
    fn set_brake(&mut self, brake: bool) -> Result<(), Self::Error>;

    /// Select the decay mode used by later power commands
    fn set_decay(&mut self, decay: Decay);
}
