//! Ring coordinate to panel resolution

use crate::config::RingGeometry;

/// A ring pixel resolved to a panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RingTarget {
    /// Panel index in rotation order
    pub panel: usize,
    /// Panel-local x, `< panel_width`
    pub x: u16,
    /// Panel-local y, `< panel_height`
    pub y: u16,
}

impl RingGeometry {
    /// Resolve a ring coordinate to a panel pixel
    ///
    /// `x` may be any integer and wraps around the ring. Returns `None` for
    /// `y` outside the panel height and for pixels inside a gap.
    pub fn resolve(&self, x: i32, y: i32) -> Option<RingTarget> {
        if y < 0 || y >= i32::from(self.panel_height) {
            return None;
        }
        let v = i64::from(self.virtual_width());
        if v == 0 {
            return None;
        }

        let mut x = i64::from(x);
        if self.mirrored {
            x = -x - (i64::from(self.gap) + 1);
        }
        let x = x.rem_euclid(v);

        let pitch = i64::from(self.pitch());
        let local_x = x % pitch;
        if local_x >= i64::from(self.panel_width) {
            return None;
        }

        Some(RingTarget {
            panel: ((x / pitch) % i64::from(self.panels)) as usize,
            x: local_x as u16,
            y: y as u16,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const G: RingGeometry = RingGeometry::REFERENCE;

    #[test]
    fn test_first_panel() {
        assert_eq!(G.resolve(0, 0), Some(RingTarget { panel: 0, x: 0, y: 0 }));
        assert_eq!(
            G.resolve(31, 127),
            Some(RingTarget {
                panel: 0,
                x: 31,
                y: 127
            })
        );
    }

    #[test]
    fn test_gap_and_next_panel() {
        assert_eq!(G.resolve(32, 5), None);
        assert_eq!(G.resolve(70, 5), None);
        assert_eq!(G.resolve(71, 5), Some(RingTarget { panel: 1, x: 0, y: 5 }));
    }

    #[test]
    fn test_wraps_negative() {
        // -1 is the last pixel of the last gap
        assert_eq!(G.resolve(-1, 0), None);
        // -1136 + 3 is ring x 3
        assert_eq!(G.resolve(-1133, 0), G.resolve(3, 0));
        assert_eq!(G.resolve(i32::MIN, 0), G.resolve((i32::MIN as i64).rem_euclid(1136) as i32, 0));
    }

    #[test]
    fn test_y_out_of_range() {
        assert_eq!(G.resolve(0, -1), None);
        assert_eq!(G.resolve(0, 128), None);
    }

    #[test]
    fn test_mirrored_phase() {
        let g = G.with_mirrored(true);
        // x = 0 maps to -(gap + 1) = -40, i.e. 1096 = 15 * 71 + 31
        assert_eq!(g.resolve(0, 0), Some(RingTarget { panel: 15, x: 31, y: 0 }));
        // Moving right in ring x moves left on the panels
        assert_eq!(g.resolve(1, 0), Some(RingTarget { panel: 15, x: 30, y: 0 }));
    }

    proptest! {
        #[test]
        fn resolve_matches_period(x in any::<i32>(), y in -200i32..300) {
            let target = G.resolve(x, y);
            let in_panel = (x as i64).rem_euclid(1136) % 71 < 32;
            if (0..128).contains(&y) && in_panel {
                let t = target.unwrap();
                prop_assert!(t.panel < 16);
                prop_assert!(t.x < 32);
                prop_assert_eq!(i32::from(t.y), y);
            } else {
                prop_assert!(target.is_none());
            }
        }

        #[test]
        fn resolve_is_periodic(x in -100_000i32..100_000, k in -50i32..50, y in 0i32..128) {
            prop_assert_eq!(G.resolve(x, y), G.resolve(x + k * 1136, y));
        }
    }
}
