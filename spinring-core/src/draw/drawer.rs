//! Primitive drawing operations

use crate::angle::angle_to_xpos;
use crate::ring::{Color, RingSurface};

/// Outline or solid shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Style {
    #[default]
    Outline,
    Filled,
}

/// Drawer over a ring surface with a foreground color
pub struct RingDrawer<'a> {
    pub(super) surface: RingSurface<'a>,
    pub(super) color: Color,
}

impl<'a> RingDrawer<'a> {
    /// Create a drawer that paints in [`Color::Set`]
    pub fn new(surface: RingSurface<'a>) -> Self {
        Self {
            surface,
            color: Color::Set,
        }
    }

    /// Foreground color used by every primitive
    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn surface(&self) -> &RingSurface<'a> {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut RingSurface<'a> {
        &mut self.surface
    }

    pub fn into_surface(self) -> RingSurface<'a> {
        self.surface
    }

    /// Ring width `V`
    pub fn width(&self) -> i32 {
        self.surface.width()
    }

    /// Ring height `H`
    pub fn height(&self) -> i32 {
        self.surface.height()
    }

    /// Ring x offset for a rotor angle in radians
    pub fn angle_to_xpos(&self, angle: f32) -> i32 {
        angle_to_xpos(angle, self.surface.geometry().virtual_width())
    }

    /// Fill the whole ring
    pub fn clear_frame(&mut self, color: Color) {
        self.surface.clear(color);
    }

    pub fn get_dot(&self, x: i32, y: i32) -> Color {
        self.surface.get_dot(x, y)
    }

    /// Write one pixel in an explicit color
    pub fn set_dot(&mut self, x: i32, y: i32, color: Color) {
        self.surface.set_dot(x, y, color);
    }

    /// Write one pixel in the foreground color
    pub fn dot(&mut self, x: i32, y: i32) {
        self.surface.set_dot(x, y, self.color);
    }

    /// Horizontal line from `x1` to `x2` inclusive
    ///
    /// Wraps around the ring in x; a span of a full ring width or more
    /// fills the row. Rows outside the ring draw nothing.
    pub fn hline(&mut self, x1: i32, x2: i32, y: i32) {
        self.hline_wide(i64::from(x1), i64::from(x2), i64::from(y));
    }

    /// Vertical line from `y1` to `y2` inclusive, clipped to the ring height
    pub fn vline(&mut self, x: i32, y1: i32, y2: i32) {
        let h = self.height();
        if (y1 < 0 && y2 < 0) || (y1 >= h && y2 >= h) {
            return;
        }
        let (y1, y2) = if y1 > y2 { (y2, y1) } else { (y1, y2) };
        for y in y1.max(0)..=y2.min(h - 1) {
            self.dot(x, y);
        }
    }

    /// Line between two points (Bresenham)
    ///
    /// Only the rows inside the ring are walked, so endpoints anywhere in
    /// the `i32` plane are fine.
    pub fn line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        let (x1, y1, x2, y2) = (
            i64::from(x1),
            i64::from(y1),
            i64::from(x2),
            i64::from(y2),
        );
        let step_x = if x2 >= x1 { 1 } else { -1 };
        let step_y = if y2 >= y1 { 1 } else { -1 };
        let dx = (x2 - x1).abs();
        let dy = (y2 - y1).abs();

        if dx >= dy {
            // One horizontal run per row
            let Some((lo, hi)) = self.visible_steps(y1, step_y, dy) else {
                return;
            };
            for m in lo..=hi {
                let first = first_step(m, dx, dy);
                let last = (first_step(m + 1, dx, dy) - 1).min(dx);
                self.hline_wide(x1 + step_x * first, x1 + step_x * last, y1 + step_y * m);
            }
        } else {
            // One dot per row
            let Some((lo, hi)) = self.visible_steps(y1, step_y, dy) else {
                return;
            };
            for k in lo..=hi {
                let minor = (i128::from(dy / 2) + i128::from(k) * i128::from(dx)) / i128::from(dy);
                self.dot_wide(x1 + step_x * minor as i64, y1 + step_y * k);
            }
        }
    }

    /// Rectangle with corners `(x1, y1)` and `(x2, y2)` inclusive
    pub fn rect(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, style: Style) {
        match style {
            Style::Outline => {
                self.hline(x1, x2, y1);
                self.hline(x1, x2, y2);
                self.vline(x1, y1, y2);
                self.vline(x2, y1, y2);
            }
            Style::Filled => {
                let (y1, y2) = if y1 > y2 { (y2, y1) } else { (y1, y2) };
                for y in y1.max(0)..=y2.min(self.height() - 1) {
                    self.hline(x1, x2, y);
                }
            }
        }
    }

    /// Circle around `(x0, y0)` (midpoint algorithm)
    pub fn circle(&mut self, x0: i32, y0: i32, radius: i32, style: Style) {
        let (x0, y0, radius) = (i64::from(x0), i64::from(y0), i64::from(radius));
        if y0 + radius < 0 || y0 - radius >= i64::from(self.height()) {
            return;
        }

        let mut x = radius - 1;
        let mut y = 0;
        let mut dx = 1;
        let mut dy = 1;
        let mut err = dx - (radius << 1);

        while x >= y {
            match style {
                Style::Outline => {
                    self.dot_wide(x0 + x, y0 + y);
                    self.dot_wide(x0 + y, y0 + x);
                    self.dot_wide(x0 - y, y0 + x);
                    self.dot_wide(x0 - x, y0 + y);
                    self.dot_wide(x0 - x, y0 - y);
                    self.dot_wide(x0 - y, y0 - x);
                    self.dot_wide(x0 + y, y0 - x);
                    self.dot_wide(x0 + x, y0 - y);
                }
                Style::Filled => {
                    self.hline_wide(x0 - x, x0 + x, y0 + y);
                    self.hline_wide(x0 - x, x0 + x, y0 - y);
                    self.vline_wide(x0 - y, y0 - x, y0 + x);
                    self.vline_wide(x0 + y, y0 - x, y0 + x);
                }
            }

            if err <= 0 {
                y += 1;
                err += dy;
                dy += 2;
            }
            if err > 0 {
                x -= 1;
                dx += 2;
                err += dx - (radius << 1);
            }
        }
    }

    /// Step range `lo..=hi` of `0..=steps` whose row `y1 + step_y * k` is visible
    fn visible_steps(&self, y1: i64, step_y: i64, steps: i64) -> Option<(i64, i64)> {
        let h = i64::from(self.height());
        let (lo, hi) = if step_y > 0 {
            (-y1, h - 1 - y1)
        } else {
            (y1 - (h - 1), y1)
        };
        let (lo, hi) = (lo.max(0), hi.min(steps));
        (lo <= hi).then_some((lo, hi))
    }

    /// Ring x reduced into `0..V`
    fn wrap_x(&self, x: i64) -> i32 {
        let v = i64::from(self.width()).max(1);
        x.rem_euclid(v) as i32
    }

    fn dot_wide(&mut self, x: i64, y: i64) {
        if let Ok(y) = i32::try_from(y) {
            let x = self.wrap_x(x);
            self.dot(x, y);
        }
    }

    fn hline_wide(&mut self, x1: i64, x2: i64, y: i64) {
        let Ok(y) = i32::try_from(y) else {
            return;
        };
        if y < 0 || y >= self.height() {
            return;
        }
        let (x1, x2) = if x1 > x2 { (x2, x1) } else { (x1, x2) };
        let width = i64::from(self.width());
        let (start, len) = if x2 - x1 + 1 >= width {
            (0, width)
        } else {
            (i64::from(self.wrap_x(x1)), x2 - x1 + 1)
        };
        for x in start..start + len {
            // start + len < 2V, inside i32
            self.dot(x as i32, y);
        }
    }

    fn vline_wide(&mut self, x: i64, y1: i64, y2: i64) {
        let h = i64::from(self.height());
        let x = self.wrap_x(x);
        let (y1, y2) = if y1 > y2 { (y2, y1) } else { (y1, y2) };
        for y in y1.max(0)..=y2.min(h - 1) {
            self.dot(x, y as i32);
        }
    }

    /// Triangle through three points
    pub fn triangle(&mut self, a: (i32, i32), b: (i32, i32), c: (i32, i32), style: Style) {
        match style {
            Style::Outline => {
                self.line(a.0, a.1, b.0, b.1);
                self.line(a.0, a.1, c.0, c.1);
                self.line(b.0, b.1, c.0, c.1);
            }
            Style::Filled => self.fill_triangle(a, b, c),
        }
    }
}

/// First major step at which a Bresenham walk has taken `m` minor steps
///
/// The walk starts with half a step of error, so after `k` major steps it
/// has taken `(den / 2 + k * add) / den` minor ones.
fn first_step(m: i64, den: i64, add: i64) -> i64 {
    if m <= 0 {
        return 0;
    }
    if add == 0 {
        return den + 1;
    }
    let need = i128::from(m) * i128::from(den) - i128::from(den / 2);
    let add = i128::from(add);
    ((need + add - 1) / add) as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RingGeometry;

    fn with_drawer(f: impl FnOnce(&mut RingDrawer<'_>)) -> [u8; 8192] {
        let mut frame = [0u8; 8192];
        {
            let surface = RingSurface::new(RingGeometry::REFERENCE, &mut frame).unwrap();
            let mut drawer = RingDrawer::new(surface);
            f(&mut drawer);
        }
        frame
    }

    fn lit(frame: &mut [u8; 8192], x: i32, y: i32) -> bool {
        RingSurface::new(RingGeometry::REFERENCE, frame)
            .unwrap()
            .get_dot(x, y)
            .is_set()
    }

    fn count(frame: &[u8]) -> u32 {
        frame.iter().map(|b| b.count_ones()).sum()
    }

    #[test]
    fn test_hline_wraps_around_ring() {
        let mut frame = with_drawer(|d| d.hline(-45, 2, 10));
        // -45..=-40 is the tail of panel 15, -39..=-1 the last gap
        assert!(lit(&mut frame, -45, 10));
        assert!(lit(&mut frame, 1091, 10));
        assert!(lit(&mut frame, -40, 10));
        assert!(!lit(&mut frame, -39, 10));
        assert!(lit(&mut frame, 2, 10));
        assert_eq!(count(&frame), 9);
    }

    #[test]
    fn test_hline_swapped_and_offscreen() {
        let mut frame = with_drawer(|d| {
            d.hline(5, 0, 3);
            d.hline(0, 5, 128);
            d.hline(0, 5, -1);
        });
        assert_eq!(count(&frame), 6);
        assert!(lit(&mut frame, 0, 3));
        assert!(lit(&mut frame, 5, 3));
    }

    #[test]
    fn test_vline_clamps() {
        let mut frame = with_drawer(|d| d.vline(1, -10, 200));
        assert_eq!(count(&frame), 128);
        assert!(lit(&mut frame, 1, 0));
        assert!(lit(&mut frame, 1, 127));

        let frame = with_drawer(|d| d.vline(1, -10, -1));
        assert_eq!(count(&frame), 0);
    }

    #[test]
    fn test_line_endpoints_and_length() {
        let mut frame = with_drawer(|d| d.line(0, 0, 10, 4));
        assert!(lit(&mut frame, 0, 0));
        assert!(lit(&mut frame, 10, 4));
        assert_eq!(count(&frame), 11);

        let mut frame = with_drawer(|d| d.line(3, 20, 1, 2));
        assert!(lit(&mut frame, 3, 20));
        assert!(lit(&mut frame, 1, 2));
        assert_eq!(count(&frame), 19);
    }

    #[test]
    fn test_rect_outline_and_fill() {
        let frame = with_drawer(|d| d.rect(2, 2, 6, 5, Style::Outline));
        // 5 wide, 4 tall: perimeter 14 pixels
        assert_eq!(count(&frame), 14);

        let frame = with_drawer(|d| d.rect(6, 5, 2, 2, Style::Filled));
        assert_eq!(count(&frame), 20);
    }

    #[test]
    fn test_circle_symmetry() {
        let mut frame = with_drawer(|d| d.circle(15, 60, 6, Style::Outline));
        assert!(lit(&mut frame, 20, 60));
        assert!(lit(&mut frame, 10, 60));
        assert!(lit(&mut frame, 15, 65));
        assert!(lit(&mut frame, 15, 55));
        assert!(!lit(&mut frame, 15, 60));
    }

    #[test]
    fn test_filled_circle_covers_center() {
        let mut frame = with_drawer(|d| d.circle(15, 60, 6, Style::Filled));
        for (x, y) in [(15, 60), (12, 58), (18, 62), (20, 60), (15, 55)] {
            assert!(lit(&mut frame, x, y), "({}, {}) not filled", x, y);
        }
        assert!(!lit(&mut frame, 21, 60));
    }

    #[test]
    fn test_foreground_color() {
        let frame = with_drawer(|d| {
            d.rect(0, 0, 31, 127, Style::Filled);
            d.set_color(Color::Clear);
            d.hline(0, 31, 0);
        });
        assert_eq!(count(&frame), 32 * 127);
    }

    #[test]
    fn test_clear_frame_and_angle() {
        let frame = with_drawer(|d| {
            d.clear_frame(Color::Set);
            assert_eq!(d.angle_to_xpos(core::f32::consts::PI), 568);
            assert_eq!(d.width(), 1136);
            assert_eq!(d.height(), 128);
        });
        assert!(frame.iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_line_at_extreme_x() {
        // i32::MAX sits at ring x 607
        let far = with_drawer(|d| d.line(i32::MAX - 40, 5, i32::MAX, 5));
        let near = with_drawer(|d| d.line(567, 5, 607, 5));
        assert_eq!(far, near);
        assert_eq!(count(&far), 32);
    }

    #[test]
    fn test_line_wider_than_ring() {
        // Each row's run is longer than the ring, so both rows fill
        let frame = with_drawer(|d| d.line(i32::MIN + 1, 0, 1, 1));
        assert_eq!(count(&frame), 2 * 16 * 32);

        let mut frame = with_drawer(|d| d.line(0, i32::MIN, 0, i32::MAX));
        assert_eq!(count(&frame), 128);
        assert!(lit(&mut frame, 0, 0));
        assert!(lit(&mut frame, 0, 127));
    }

    #[test]
    fn test_line_steep_matches_walk() {
        // Same dots as a plain per-row walk
        let mut frame = with_drawer(|d| d.line(0, 0, 3, 9));
        let expected = [0, 0, 1, 1, 1, 2, 2, 2, 3, 3];
        for (y, x) in expected.iter().enumerate() {
            assert!(lit(&mut frame, *x, y as i32), "row {}", y);
        }
        assert_eq!(count(&frame), 10);
    }

    #[test]
    fn test_wide_hline_and_rect() {
        let frame = with_drawer(|d| d.hline(i32::MIN, i32::MAX, 7));
        assert_eq!(count(&frame), 16 * 32);

        let frame = with_drawer(|d| d.rect(0, i32::MIN, 3, i32::MAX, Style::Filled));
        assert_eq!(count(&frame), 4 * 128);
    }

    #[test]
    fn test_circle_at_extreme_center() {
        let far = with_drawer(|d| d.circle(i32::MIN, 60, 6, Style::Filled));
        let wrapped = (i32::MIN as i64).rem_euclid(1136) as i32;
        let near = with_drawer(|d| d.circle(wrapped, 60, 6, Style::Filled));
        assert_eq!(far, near);

        let frame = with_drawer(|d| d.circle(0, i32::MIN, i32::MAX, Style::Outline));
        assert_eq!(count(&frame), 0);
    }
}
