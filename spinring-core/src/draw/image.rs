//! Monochrome image assets and blitting
//!
//! Image data uses the same page-major packing as an upright panel: bit
//! `y % 8` of byte `(y / 8) * width + x`. An optional alpha plane with the
//! same packing marks opaque pixels.

use super::RingDrawer;
use crate::ring::Color;

/// A read-only packed 1-bit image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonoImage<'a> {
    width: u16,
    height: u16,
    offset_x: i16,
    offset_y: i16,
    data: &'a [u8],
    alpha: Option<&'a [u8]>,
}

impl<'a> MonoImage<'a> {
    /// Create an opaque image
    pub const fn new(width: u16, height: u16, data: &'a [u8]) -> Self {
        Self {
            width,
            height,
            offset_x: 0,
            offset_y: 0,
            data,
            alpha: None,
        }
    }

    /// Attach an alpha plane
    pub const fn with_alpha(mut self, alpha: &'a [u8]) -> Self {
        self.alpha = Some(alpha);
        self
    }

    /// Set the draw offset applied by [`Blit::offset`]
    pub const fn with_offset(mut self, x: i16, y: i16) -> Self {
        self.offset_x = x;
        self.offset_y = y;
        self
    }

    pub const fn width(&self) -> u16 {
        self.width
    }

    pub const fn height(&self) -> u16 {
        self.height
    }

    pub const fn offset(&self) -> (i16, i16) {
        (self.offset_x, self.offset_y)
    }

    pub const fn has_alpha(&self) -> bool {
        self.alpha.is_some()
    }

    /// Bytes needed for the pixel plane
    pub const fn data_len(&self) -> usize {
        (self.height as usize).div_ceil(8) * self.width as usize
    }

    fn bit(plane: &[u8], width: u16, x: u16, y: u16) -> bool {
        let idx = usize::from(y / 8) * usize::from(width) + usize::from(x);
        plane.get(idx).is_some_and(|b| b & (1 << (y % 8)) != 0)
    }

    /// Pixel at `(x, y)`; out of range or missing data reads clear
    pub fn get_dot(&self, x: u16, y: u16) -> Color {
        if x >= self.width || y >= self.height {
            return Color::Clear;
        }
        Color::from(Self::bit(self.data, self.width, x, y))
    }

    /// True when `(x, y)` should be drawn in a blended blit
    pub fn is_opaque(&self, x: u16, y: u16) -> bool {
        match self.alpha {
            Some(alpha) => Self::bit(alpha, self.width, x, y),
            None => true,
        }
    }
}

/// How an image is placed and combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Blit {
    /// Only draw pixels the alpha plane marks opaque
    pub blend: bool,
    /// The position is the image center
    pub centered: bool,
    /// Add the image's own draw offset
    pub offset: bool,
}

impl Blit {
    /// Top-left placement, every pixel overwritten
    pub const PLAIN: Self = Self {
        blend: false,
        centered: false,
        offset: false,
    };

    pub const fn blend(mut self) -> Self {
        self.blend = true;
        self
    }

    pub const fn centered(mut self) -> Self {
        self.centered = true;
        self
    }

    pub const fn offset(mut self) -> Self {
        self.offset = true;
        self
    }
}

impl RingDrawer<'_> {
    /// Draw `image` at ring position `(x, y)`
    ///
    /// Image pixels carry their own color; the foreground color is not used.
    pub fn image(&mut self, x: i32, y: i32, image: &MonoImage<'_>, mode: Blit) {
        let (mut x, mut y) = (x, y);
        if mode.centered {
            x -= i32::from(image.width() / 2);
            y -= i32::from(image.height() / 2);
        }
        if mode.offset {
            let (ox, oy) = image.offset();
            x += i32::from(ox);
            y += i32::from(oy);
        }

        let blend = mode.blend && image.has_alpha();
        for iy in 0..image.height() {
            for ix in 0..image.width() {
                if blend && !image.is_opaque(ix, iy) {
                    continue;
                }
                self.set_dot(x + i32::from(ix), y + i32::from(iy), image.get_dot(ix, iy));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RingGeometry;
    use crate::ring::RingSurface;

    // 4x10 image: column 0 fully set, everything else clear
    const DATA: [u8; 8] = [0xFF, 0x00, 0x00, 0x00, 0x03, 0x00, 0x00, 0x00];
    // Alpha: only the left half is opaque
    const ALPHA: [u8; 8] = [0xFF, 0xFF, 0x00, 0x00, 0x03, 0x03, 0x00, 0x00];

    fn blit(setup: impl FnOnce(&mut RingDrawer<'_>)) -> [u8; 8192] {
        let mut frame = [0u8; 8192];
        {
            let surface = RingSurface::new(RingGeometry::REFERENCE, &mut frame).unwrap();
            let mut drawer = RingDrawer::new(surface);
            setup(&mut drawer);
        }
        frame
    }

    fn lit(frame: &mut [u8; 8192], x: i32, y: i32) -> bool {
        RingSurface::new(RingGeometry::REFERENCE, frame)
            .unwrap()
            .get_dot(x, y)
            .is_set()
    }

    #[test]
    fn test_image_pixels() {
        let img = MonoImage::new(4, 10, &DATA);
        assert_eq!(img.data_len(), 8);
        assert_eq!(img.get_dot(0, 9), Color::Set);
        assert_eq!(img.get_dot(1, 0), Color::Clear);
        assert_eq!(img.get_dot(0, 10), Color::Clear);
    }

    #[test]
    fn test_plain_blit_overwrites() {
        let img = MonoImage::new(4, 10, &DATA);
        let mut frame = blit(|d| {
            d.rect(0, 0, 10, 20, crate::draw::Style::Filled);
            d.image(2, 3, &img, Blit::PLAIN);
        });
        assert!(lit(&mut frame, 2, 3));
        assert!(lit(&mut frame, 2, 12));
        assert!(!lit(&mut frame, 3, 3));
        assert!(!lit(&mut frame, 5, 12));
        // Outside the image the rectangle survives
        assert!(lit(&mut frame, 6, 3));
    }

    #[test]
    fn test_blend_keeps_transparent_pixels() {
        let img = MonoImage::new(4, 10, &DATA).with_alpha(&ALPHA);
        let mut frame = blit(|d| {
            d.rect(0, 0, 10, 20, crate::draw::Style::Filled);
            d.image(2, 3, &img, Blit::PLAIN.blend());
        });
        // Opaque clear pixel erased, transparent pixel kept
        assert!(!lit(&mut frame, 3, 3));
        assert!(lit(&mut frame, 4, 3));
        assert!(lit(&mut frame, 5, 3));
    }

    #[test]
    fn test_centered_and_offset() {
        let img = MonoImage::new(4, 10, &DATA).with_offset(3, -1);
        let mut frame = blit(|d| d.image(10, 10, &img, Blit::PLAIN.centered().offset()));
        // Top-left is (10 - 2 + 3, 10 - 5 - 1)
        assert!(lit(&mut frame, 11, 4));
        assert!(lit(&mut frame, 11, 13));
        assert!(!lit(&mut frame, 11, 14));
    }

    #[test]
    fn test_blit_wraps_across_ring_origin() {
        let img = MonoImage::new(4, 10, &DATA);
        let mut frame = blit(|d| d.image(1136 + 1, 0, &img, Blit::PLAIN));
        assert!(lit(&mut frame, 1, 0));
    }
}
