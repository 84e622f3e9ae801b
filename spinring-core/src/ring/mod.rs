//! Ring addressing and panel buffers
//!
//! The ring surface is one logical bitmap `V` pixels wide and `H` pixels
//! tall. Ring x wraps: any integer is folded into `[0, V)` before lookup.
//! Pixels that fall into a gap between panels are dropped on write and read
//! back as [`Color::Clear`].

pub mod addressing;
pub mod panel;
pub mod surface;

pub use addressing::RingTarget;
pub use panel::{PanelBuffer, PixelIndex};
pub use surface::{RingSurface, SurfaceError};

/// Pixel color of a monochrome panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Color {
    /// Pixel off
    #[default]
    Clear,
    /// Pixel lit
    Set,
}

impl Color {
    pub const fn is_set(self) -> bool {
        matches!(self, Color::Set)
    }

    /// Byte with all eight pixels in this color
    pub const fn fill_byte(self) -> u8 {
        match self {
            Color::Clear => 0x00,
            Color::Set => 0xFF,
        }
    }

    /// The other color
    pub const fn inverted(self) -> Self {
        match self {
            Color::Clear => Color::Set,
            Color::Set => Color::Clear,
        }
    }
}

impl From<bool> for Color {
    fn from(set: bool) -> Self {
        if set {
            Color::Set
        } else {
            Color::Clear
        }
    }
}
