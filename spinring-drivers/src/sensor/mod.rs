//! Rotor angle sensors
//!
//! Both read the AS5048A magnetic encoder on the rotor shaft:
//!
//! - [`PwmAngle`]: pulse width of the encoder's PWM output, captured on GPIO
//!   edges into an [`AngleCell`](spinring_core::angle::AngleCell)
//! - [`As5048a`]: the 14-bit angle register read over SPI

mod as5048a;
mod pwm_angle;

pub use as5048a::{As5048a, ANGLE_REGISTER};
pub use pwm_angle::{capture_pulses, EdgeTimer, PwmAngle};
