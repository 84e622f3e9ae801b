//! Ring geometry
//!
//! The ring is a row of identical panels around the rotor, each followed by
//! a mechanical gap that cannot show pixels. Ring x runs around the rotor
//! and wraps; ring y runs along the panel's long side.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How ring-local pixels map onto the panel's own memory
///
/// Panel memory is always page-major: bit `b` of the byte at
/// `(column, page)` is pixel `(column, page * 8 + b)` in the panel's native
/// orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PanelLayout {
    /// Panel columns follow ring x, pages follow ring y
    Upright,
    /// Panel mounted on its side: columns follow ring y, pages follow ring x
    #[default]
    Rotated,
}

/// Size and arrangement of the panel ring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RingGeometry {
    /// Visible width of one panel along ring x
    pub panel_width: u16,
    /// Visible height of one panel along ring y
    pub panel_height: u16,
    /// Dead band after each panel along ring x
    pub gap: u16,
    /// Number of panels around the ring
    pub panels: u16,
    /// Panel memory orientation
    pub layout: PanelLayout,
    /// Ring x runs against the panel order (physical rotor)
    pub mirrored: bool,
}

impl Default for RingGeometry {
    fn default() -> Self {
        Self::REFERENCE
    }
}

/// Frame size of the reference ring, for statically sized buffers
pub const REFERENCE_FRAME_BYTES: usize = RingGeometry::REFERENCE.frame_bytes();

impl RingGeometry {
    /// 16 panels of 32x128 with a 39 pixel gap
    pub const REFERENCE: Self = Self::new(32, 128, 39, 16);

    /// Create a geometry with the default layout and no mirroring
    pub const fn new(panel_width: u16, panel_height: u16, gap: u16, panels: u16) -> Self {
        Self {
            panel_width,
            panel_height,
            gap,
            panels,
            layout: PanelLayout::Rotated,
            mirrored: false,
        }
    }

    /// Same geometry with the given panel layout
    pub const fn with_layout(mut self, layout: PanelLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Same geometry with mirrored ring x
    pub const fn with_mirrored(mut self, mirrored: bool) -> Self {
        self.mirrored = mirrored;
        self
    }

    /// Panel plus gap along ring x
    pub const fn pitch(&self) -> u32 {
        self.panel_width as u32 + self.gap as u32
    }

    /// Length of one full turn in ring x (`V`)
    pub const fn virtual_width(&self) -> u32 {
        self.panels as u32 * self.pitch()
    }

    /// Bytes of one panel buffer
    pub const fn panel_bytes(&self) -> usize {
        let (columns, rows) = match self.layout {
            PanelLayout::Upright => (self.panel_width, self.panel_height),
            PanelLayout::Rotated => (self.panel_height, self.panel_width),
        };
        (rows as usize).div_ceil(8) * columns as usize
    }

    /// Bytes of a whole frame, all panels back to back
    pub const fn frame_bytes(&self) -> usize {
        self.panel_bytes() * self.panels as usize
    }

    /// True when every dimension is non-zero
    pub const fn is_valid(&self) -> bool {
        self.panel_width > 0 && self.panel_height > 0 && self.panels > 0
    }
}
