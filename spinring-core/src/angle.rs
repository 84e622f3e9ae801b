//! Rotor angle math
//!
//! Angles are radians in `[0, 2π)`. The PWM output of the magnetic encoder
//! is captured in an interrupt; [`AngleCell`] hands the last pulse width to
//! the render loop.

use core::f32::consts::TAU;

use portable_atomic::{AtomicU32, Ordering};

/// Full scale of the 14-bit angle register
pub const REGISTER_SCALE: u32 = 0x4000;

/// Wrap modulus applied after adding the offset
pub const REGISTER_WRAP: u32 = 0x3FFF;

/// Range of valid encoder PWM pulse widths
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PulseWindow {
    /// Pulse width at angle zero, in microseconds
    pub min_us: u32,
    /// Pulse width at the end of a turn, in microseconds
    pub max_us: u32,
}

impl Default for PulseWindow {
    fn default() -> Self {
        Self::AS5048
    }
}

impl PulseWindow {
    /// AS5048A PWM output at the default frequency
    pub const AS5048: Self = Self {
        min_us: 4,
        max_us: 904,
    };

    /// Number of distinct pulse widths in the window
    pub const fn len(&self) -> u32 {
        self.max_us - self.min_us + 1
    }

    /// Map a pulse width to an angle, clamping to the window
    pub fn to_angle(&self, width_us: u32) -> f32 {
        let width = width_us.clamp(self.min_us, self.max_us);
        (width - self.min_us) as f32 / self.len() as f32 * TAU
    }
}

/// Map a raw 14-bit angle register plus offset to an angle
pub fn register_to_angle(raw: u16, offset: u16) -> f32 {
    register_with_offset(raw, offset) as f32 / REGISTER_SCALE as f32 * TAU
}

/// Apply the calibration offset to a raw register value
pub fn register_with_offset(raw: u16, offset: u16) -> u32 {
    (u32::from(raw) + u32::from(offset)) % REGISTER_WRAP
}

/// Ring x offset for an angle over a ring of `virtual_width` pixels
pub fn angle_to_xpos(angle: f32, virtual_width: u32) -> i32 {
    (angle / TAU * virtual_width as f32) as i32
}

/// Single-writer single-reader cell for the last captured pulse width
///
/// Written from the edge interrupt, read by the render loop.
pub struct AngleCell {
    width_us: AtomicU32,
    captured_at_us: AtomicU32,
}

impl Default for AngleCell {
    fn default() -> Self {
        Self::new()
    }
}

impl AngleCell {
    pub const fn new() -> Self {
        Self {
            width_us: AtomicU32::new(0),
            captured_at_us: AtomicU32::new(0),
        }
    }

    /// Record a pulse that started at `start_us` and lasted `width_us`
    pub fn store(&self, width_us: u32, start_us: u32) {
        self.captured_at_us.store(start_us, Ordering::Relaxed);
        self.width_us.store(width_us, Ordering::Release);
    }

    /// Last captured pulse width in microseconds
    pub fn width_us(&self) -> u32 {
        self.width_us.load(Ordering::Acquire)
    }

    /// Start time of the last captured pulse
    pub fn captured_at_us(&self) -> u32 {
        self.captured_at_us.load(Ordering::Relaxed)
    }
}

/// Angle in register units, `0..REGISTER_SCALE`
pub fn angle_to_register(angle: f32) -> u16 {
    ((angle / TAU * REGISTER_SCALE as f32) as u32 % REGISTER_SCALE) as u16
}

/// Offset that makes `angle` read back as zero
pub fn zero_offset(angle: f32) -> u16 {
    ((REGISTER_SCALE - u32::from(angle_to_register(angle))) % REGISTER_SCALE) as u16
}
