//! Packed 1-bit panel buffers

use super::Color;
use crate::config::{PanelLayout, RingGeometry};

/// Location of one pixel inside a panel buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PixelIndex {
    /// Byte offset in the panel buffer
    pub byte: usize,
    /// Bit within that byte
    pub bit: u8,
}

impl PixelIndex {
    /// Locate panel-local `(x, y)`, `None` outside the panel
    pub fn locate(geometry: &RingGeometry, x: u16, y: u16) -> Option<Self> {
        if x >= geometry.panel_width || y >= geometry.panel_height {
            return None;
        }
        let (column, row, columns) = match geometry.layout {
            PanelLayout::Upright => (x, y, geometry.panel_width),
            PanelLayout::Rotated => (y, x, geometry.panel_height),
        };
        Some(Self {
            byte: usize::from(row >> 3) * usize::from(columns) + usize::from(column),
            bit: (row & 7) as u8,
        })
    }

    pub const fn mask(&self) -> u8 {
        1 << self.bit
    }
}

/// View of one panel's buffer
pub struct PanelBuffer<'a> {
    geometry: RingGeometry,
    data: &'a mut [u8],
}

impl<'a> PanelBuffer<'a> {
    /// Wrap `data`, which must hold at least `panel_bytes()` bytes
    pub fn new(geometry: RingGeometry, data: &'a mut [u8]) -> Option<Self> {
        let bytes = geometry.panel_bytes();
        if data.len() < bytes {
            return None;
        }
        Some(Self {
            geometry,
            data: &mut data[..bytes],
        })
    }

    /// Read panel-local `(x, y)`; outside the panel reads clear
    pub fn get(&self, x: u16, y: u16) -> Color {
        match PixelIndex::locate(&self.geometry, x, y) {
            Some(idx) => Color::from(self.data[idx.byte] & idx.mask() != 0),
            None => Color::Clear,
        }
    }

    /// Write panel-local `(x, y)`; outside the panel is ignored
    pub fn set(&mut self, x: u16, y: u16, color: Color) {
        if let Some(idx) = PixelIndex::locate(&self.geometry, x, y) {
            match color {
                Color::Set => self.data[idx.byte] |= idx.mask(),
                Color::Clear => self.data[idx.byte] &= !idx.mask(),
            }
        }
    }

    /// Fill the whole panel
    pub fn clear(&mut self, color: Color) {
        self.data.fill(color.fill_byte());
    }

    /// Raw panel bytes in bus order
    pub fn as_bytes(&self) -> &[u8] {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotated_index() {
        let g = RingGeometry::REFERENCE;
        // Ring-local x picks the page and bit, ring y picks the column
        assert_eq!(
            PixelIndex::locate(&g, 0, 0),
            Some(PixelIndex { byte: 0, bit: 0 })
        );
        assert_eq!(
            PixelIndex::locate(&g, 9, 5),
            Some(PixelIndex { byte: 128 + 5, bit: 1 })
        );
        assert_eq!(
            PixelIndex::locate(&g, 31, 127),
            Some(PixelIndex { byte: 511, bit: 7 })
        );
        assert_eq!(PixelIndex::locate(&g, 32, 0), None);
    }

    #[test]
    fn test_upright_index() {
        let g = RingGeometry::REFERENCE.with_layout(PanelLayout::Upright);
        assert_eq!(
            PixelIndex::locate(&g, 3, 10),
            Some(PixelIndex { byte: 32 + 3, bit: 2 })
        );
        assert_eq!(PixelIndex::locate(&g, 0, 128), None);
    }

    #[test]
    fn test_set_get_clear() {
        let g = RingGeometry::REFERENCE;
        let mut mem = [0u8; 512];
        let mut panel = PanelBuffer::new(g, &mut mem).unwrap();

        panel.set(4, 100, Color::Set);
        assert_eq!(panel.get(4, 100), Color::Set);
        assert_eq!(panel.get(5, 100), Color::Clear);

        panel.set(4, 100, Color::Clear);
        assert_eq!(panel.get(4, 100), Color::Clear);

        panel.clear(Color::Set);
        assert!(panel.as_bytes().iter().all(|&b| b == 0xFF));
        assert_eq!(panel.get(40, 0), Color::Clear);
    }

    #[test]
    fn test_short_buffer_rejected() {
        let mut mem = [0u8; 100];
        assert!(PanelBuffer::new(RingGeometry::REFERENCE, &mut mem).is_none());
    }
}
