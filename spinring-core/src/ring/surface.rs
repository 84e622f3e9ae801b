//! The ring surface: a frame buffer addressed in ring coordinates

use super::{Color, PanelBuffer, PixelIndex};
use crate::config::RingGeometry;

/// Errors creating a ring surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SurfaceError {
    /// Geometry has a zero dimension
    InvalidGeometry,
    /// Frame buffer length does not match the geometry
    FrameSize { expected: usize, actual: usize },
}

/// All panel buffers of one frame, addressed in ring space
pub struct RingSurface<'a> {
    geometry: RingGeometry,
    frame: &'a mut [u8],
}

impl<'a> RingSurface<'a> {
    /// Wrap a frame buffer of exactly `geometry.frame_bytes()` bytes
    pub fn new(geometry: RingGeometry, frame: &'a mut [u8]) -> Result<Self, SurfaceError> {
        if !geometry.is_valid() {
            return Err(SurfaceError::InvalidGeometry);
        }
        let expected = geometry.frame_bytes();
        if frame.len() != expected {
            return Err(SurfaceError::FrameSize {
                expected,
                actual: frame.len(),
            });
        }
        Ok(Self { geometry, frame })
    }

    pub fn geometry(&self) -> &RingGeometry {
        &self.geometry
    }

    /// Ring width `V`
    pub fn width(&self) -> i32 {
        self.geometry.virtual_width() as i32
    }

    /// Ring height `H`
    pub fn height(&self) -> i32 {
        i32::from(self.geometry.panel_height)
    }

    fn locate(&self, x: i32, y: i32) -> Option<(usize, u8)> {
        let target = self.geometry.resolve(x, y)?;
        let idx = PixelIndex::locate(&self.geometry, target.x, target.y)?;
        Some((
            target.panel * self.geometry.panel_bytes() + idx.byte,
            idx.mask(),
        ))
    }

    /// Read a ring pixel; gaps and rows outside the ring read clear
    pub fn get_dot(&self, x: i32, y: i32) -> Color {
        match self.locate(x, y) {
            Some((byte, mask)) => Color::from(self.frame[byte] & mask != 0),
            None => Color::Clear,
        }
    }

    /// Write a ring pixel; gaps and rows outside the ring are ignored
    pub fn set_dot(&mut self, x: i32, y: i32, color: Color) {
        if let Some((byte, mask)) = self.locate(x, y) {
            match color {
                Color::Set => self.frame[byte] |= mask,
                Color::Clear => self.frame[byte] &= !mask,
            }
        }
    }

    /// Fill every panel
    pub fn clear(&mut self, color: Color) {
        self.frame.fill(color.fill_byte());
    }

    /// One panel's buffer
    pub fn panel(&mut self, index: usize) -> Option<PanelBuffer<'_>> {
        if index >= usize::from(self.geometry.panels) {
            return None;
        }
        let bytes = self.geometry.panel_bytes();
        PanelBuffer::new(
            self.geometry,
            &mut self.frame[index * bytes..(index + 1) * bytes],
        )
    }

    /// The whole frame in bus order
    pub fn as_bytes(&self) -> &[u8] {
        self.frame
    }
}
