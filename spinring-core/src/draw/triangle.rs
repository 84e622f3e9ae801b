//! Scanline triangle fill

use super::RingDrawer;

/// One triangle edge walked a scanline at a time
#[derive(Clone, Copy)]
struct Edge {
    x: f32,
    slope: f32,
}

/// Round to nearest, halves up, without libm
fn round_half_up(v: f32) -> i32 {
    let t = v + 0.5;
    let i = t as i32;
    if (i as f32) > t {
        i.saturating_sub(1)
    } else {
        i
    }
}

/// x per scanline along `a -> b`, zero for horizontal edges
fn slope(a: (i32, i32), b: (i32, i32)) -> f32 {
    if a.1 == b.1 {
        0.0
    } else {
        (a.0 as f32 - b.0 as f32) / (a.1 as f32 - b.1 as f32)
    }
}

/// x where the line through `a` and `b` crosses ring row 0, seen from `b`
fn cross_row_zero(a: (i32, i32), b: (i32, i32)) -> f32 {
    (b.0 as f32 - a.0 as f32) * b.1 as f32 / (a.1 as f32 - b.1 as f32) + b.0 as f32
}

impl RingDrawer<'_> {
    pub(super) fn fill_triangle(&mut self, a: (i32, i32), b: (i32, i32), c: (i32, i32)) {
        let (mut top, mut mid, mut btm) = (a, b, c);
        if top.1 > mid.1 {
            core::mem::swap(&mut top, &mut mid);
        }
        if top.1 > btm.1 {
            core::mem::swap(&mut top, &mut btm);
        }
        if mid.1 > btm.1 {
            core::mem::swap(&mut mid, &mut btm);
        }

        let h = self.height();
        if top.1 >= h || btm.1 < 0 {
            return;
        }

        let mut top_mid_x = top.0 as f32;
        let mut top_btm_x = top.0 as f32;
        if top.1 == mid.1 {
            top_mid_x = mid.0 as f32;
        }

        let mut sy = top.1;
        let ey = btm.1.min(h - 1);
        let my = mid.1.min(ey + 1);

        // Start at row 0 with the edges' intersections there
        if top.1 < 0 {
            sy = 0;
            if mid.1 >= 0 {
                if top.1 != mid.1 {
                    top_mid_x = cross_row_zero(top, mid);
                }
            } else if mid.1 != btm.1 {
                top_mid_x = cross_row_zero(mid, btm);
            }
            if top.1 != btm.1 {
                top_btm_x = cross_row_zero(top, btm);
            }
        }

        let top_mid = Edge {
            x: top_mid_x,
            slope: slope(mid, top),
        };
        let top_btm = Edge {
            x: top_btm_x,
            slope: slope(top, btm),
        };
        let mid_btm_slope = slope(mid, btm);

        let split_x = if top.1 != btm.1 {
            let num = (i128::from(top.0) - i128::from(btm.0))
                * (i128::from(mid.1) - i128::from(top.1));
            num / (i128::from(top.1) - i128::from(btm.1)) + i128::from(top.0)
        } else {
            i128::from(btm.0)
        };
        let mid_on_left = i128::from(mid.0) < split_x;

        let (mut left, mut right) = if mid_on_left {
            (top_mid, top_btm)
        } else {
            (top_btm, top_mid)
        };

        self.scan(&mut left, &mut right, &mut sy, my);
        if mid_on_left {
            left.slope = mid_btm_slope;
        } else {
            right.slope = mid_btm_slope;
        }
        self.scan(&mut left, &mut right, &mut sy, ey + 1);
    }

    fn scan(&mut self, left: &mut Edge, right: &mut Edge, sy: &mut i32, ey: i32) {
        while *sy < ey {
            self.hline(round_half_up(left.x), round_half_up(right.x), *sy);
            left.x += left.slope;
            right.x += right.slope;
            *sy += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::RingGeometry;
    use crate::draw::{RingDrawer, Style};
    use crate::ring::RingSurface;

    fn fill(a: (i32, i32), b: (i32, i32), c: (i32, i32)) -> [u8; 8192] {
        let mut frame = [0u8; 8192];
        {
            let surface = RingSurface::new(RingGeometry::REFERENCE, &mut frame).unwrap();
            RingDrawer::new(surface).triangle(a, b, c, Style::Filled);
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
    fn test_round_half_up() {
        assert_eq!(super::round_half_up(2.5), 3);
        assert_eq!(super::round_half_up(2.49), 2);
        assert_eq!(super::round_half_up(-0.5), 0);
        assert_eq!(super::round_half_up(-0.51), -1);
        assert_eq!(super::round_half_up(-3.0), -3);
    }

    #[test]
    fn test_fill_rows_within_extent() {
        let mut frame = fill((10, 0), (0, 10), (20, 10));
        for y in 0..=10 {
            for x in -5..=25 {
                let inside = x >= 10 - y && x <= 10 + y;
                assert_eq!(lit(&mut frame, x, y), inside, "pixel ({}, {})", x, y);
            }
        }
        assert!(!lit(&mut frame, 10, 11));
        let total: u32 = frame.iter().map(|b| b.count_ones()).sum();
        assert_eq!(total, 121);
    }

    #[test]
    fn test_vertex_order_irrelevant() {
        assert_eq!(
            fill((10, 0), (0, 10), (20, 10)),
            fill((20, 10), (10, 0), (0, 10))
        );
    }

    #[test]
    fn test_clipped_top() {
        let mut frame = fill((10, -10), (0, 10), (20, 10));
        assert!(lit(&mut frame, 5, 0));
        assert!(lit(&mut frame, 15, 0));
        assert!(!lit(&mut frame, 4, 0));
        assert!(!lit(&mut frame, 16, 0));
        assert!(lit(&mut frame, 0, 10));
        assert!(lit(&mut frame, 20, 10));
    }

    #[test]
    fn test_flat_top() {
        let mut frame = fill((0, 5), (20, 5), (10, 15));
        assert!(lit(&mut frame, 0, 5));
        assert!(lit(&mut frame, 20, 5));
        assert!(lit(&mut frame, 10, 15));
        assert!(!lit(&mut frame, 10, 16));
    }

    #[test]
    fn test_offscreen_is_noop() {
        let frame = fill((0, 130), (5, 140), (10, 135));
        assert!(frame.iter().all(|&b| b == 0));
        let frame = fill((0, -30), (5, -1), (10, -20));
        assert!(frame.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_extreme_vertices() {
        let mut frame = fill((i32::MIN, 0), (i32::MAX, 0), (0, 127));
        for x in 0..32 {
            assert!(lit(&mut frame, x, 0));
        }

        // Steep edges far off the ring
        fill((i32::MIN, -5), (i32::MAX, 200), (i32::MIN, 200));
        assert_eq!(super::round_half_up(-3.0e10), i32::MIN);
        assert_eq!(super::round_half_up(3.0e10), i32::MAX);
    }

    #[test]
    fn test_outline_hits_vertices() {
        let mut frame = [0u8; 8192];
        {
            let surface = RingSurface::new(RingGeometry::REFERENCE, &mut frame).unwrap();
            RingDrawer::new(surface).triangle((2, 2), (20, 8), (5, 30), Style::Outline);
        }
        assert!(lit(&mut frame, 2, 2));
        assert!(lit(&mut frame, 20, 8));
        assert!(lit(&mut frame, 5, 30));
        assert!(!lit(&mut frame, 9, 12));
    }
}
