//! Collaborator traits
//!
//! These traits define the interface between the display logic and the
//! rotor hardware around it.

pub mod angle;
pub mod drive;
pub mod random;

pub use angle::AngleSource;
pub use drive::{Decay, SpinDrive};
pub use random::{RandomSource, XorShift32};
