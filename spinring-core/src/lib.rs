//! Board-agnostic core logic for the spinring POV display
//!
//! This crate contains everything that does not touch hardware:
//!
//! - Ring geometry and calibration config
//! - Panel buffers and ring addressing (wrap-around x, gaps between panels)
//! - The drawer: lines, rectangles, circles, triangles, image blits and a
//!   snowfall effect
//! - The frame pipeline between the renderer and the link
//! - Angle conversions and the interrupt-fed angle cell
//! - Traits for the collaborators (angle sensor, spin drive, randomness)

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

pub mod angle;
pub mod config;
pub mod draw;
pub mod pipeline;
pub mod ring;
pub mod traits;
