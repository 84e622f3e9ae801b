//! Drawing in ring space
//!
//! Every primitive goes through [`RingSurface::set_dot`](crate::ring::RingSurface::set_dot),
//! so shapes wrap around the ring in x and fall silently into gaps. Only
//! ring y is clipped.

pub mod drawer;
pub mod graphics;
pub mod image;
pub mod snow;
mod triangle;

pub use drawer::{RingDrawer, Style};
pub use image::{Blit, MonoImage};
pub use snow::{Grain, Snowfall};
