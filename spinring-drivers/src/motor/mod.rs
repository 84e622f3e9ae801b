//! Spin drive implementations
//!
//! The rotor motor hangs off a DRV8833-style H-bridge driven by two PWM
//! outputs.

pub mod hbridge;

pub use hbridge::{HBridge, SpinError};
