//! embedded-graphics support
//!
//! Lets text and any embedded-graphics primitive render into ring space.
//! Pixels wrap around the ring like every other drawing operation.

use core::convert::Infallible;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;

use super::RingDrawer;
use crate::ring::{Color, RingSurface};

impl From<BinaryColor> for Color {
    fn from(color: BinaryColor) -> Self {
        Color::from(color.is_on())
    }
}

impl From<Color> for BinaryColor {
    fn from(color: Color) -> Self {
        BinaryColor::from(color.is_set())
    }
}

impl OriginDimensions for RingSurface<'_> {
    fn size(&self) -> Size {
        Size::new(self.width() as u32, self.height() as u32)
    }
}

impl DrawTarget for RingSurface<'_> {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_dot(point.x, point.y, color.into());
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        RingSurface::clear(self, color.into());
        Ok(())
    }
}

impl OriginDimensions for RingDrawer<'_> {
    fn size(&self) -> Size {
        self.surface.size()
    }
}

impl DrawTarget for RingDrawer<'_> {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        self.surface.draw_iter(pixels)
    }
}
