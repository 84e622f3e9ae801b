//! Configuration types
//!
//! Ring topology is fixed at boot from these constants; calibration is
//! stored as postcard binary data.

pub mod calibration;
pub mod geometry;

pub use calibration::*;
pub use geometry::*;
