//! Two-input PWM H-bridge
//!
//! | power | IN1        | IN2        |
//! |-------|------------|------------|
//! | `> 0` | `power`    | decay      |
//! | `< 0` | decay      | `-power`   |
//! | `0`   | decay      | decay      |
//! | brake | full       | full       |
//!
//! Duties are out of 255. Decay is 1 for slow decay, 0 for fast.

use embedded_hal::pwm::SetDutyCycle;
use spinring_core::traits::{Decay, SpinDrive};

/// Duty scale of power values
const FULL: u16 = 255;

/// Drive errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpinError<E> {
    /// PWM output rejected the duty cycle
    Pwm(E),
    /// Power outside `-255..=255`
    OutOfRange(i16),
}

/// H-bridge on two PWM channels
pub struct HBridge<A, B> {
    in1: A,
    in2: B,
    decay: Decay,
}

impl<A, B, E> HBridge<A, B>
where
    A: SetDutyCycle<Error = E>,
    B: SetDutyCycle<Error = E>,
{
    pub fn new(in1: A, in2: B) -> Self {
        Self {
            in1,
            in2,
            decay: Decay::Fast,
        }
    }

    pub fn decay(&self) -> Decay {
        self.decay
    }

    pub fn release(self) -> (A, B) {
        (self.in1, self.in2)
    }

    fn idle_duty(&self) -> u16 {
        match self.decay {
            Decay::Slow => 1,
            Decay::Fast => 0,
        }
    }

    fn drive(&mut self, duty1: u16, duty2: u16) -> Result<(), SpinError<E>> {
        self.in1
            .set_duty_cycle_fraction(duty1, FULL)
            .map_err(SpinError::Pwm)?;
        self.in2
            .set_duty_cycle_fraction(duty2, FULL)
            .map_err(SpinError::Pwm)
    }
}

impl<A, B, E> SpinDrive for HBridge<A, B>
where
    A: SetDutyCycle<Error = E>,
    B: SetDutyCycle<Error = E>,
{
    type Error = SpinError<E>;

    fn set_power(&mut self, power: i16) -> Result<(), Self::Error> {
        if power.unsigned_abs() > FULL {
            return Err(SpinError::OutOfRange(power));
        }
        let idle = self.idle_duty();
        let magnitude = power.unsigned_abs();
        match power {
            p if p > 0 => self.drive(magnitude, idle),
            p if p < 0 => self.drive(idle, magnitude),
            _ => self.drive(idle, idle),
        }
    }

    fn set_brake(&mut self, brake: bool) -> Result<(), Self::Error> {
        let duty = if brake { FULL } else { 0 };
        self.drive(duty, duty)
    }

    fn set_decay(&mut self, decay: Decay) {
        self.decay = decay;
    }
}
