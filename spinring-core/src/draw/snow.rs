//! Falling snow effect
//!
//! Grains drift down the ring and respawn above the top edge once they
//! reach the bottom.

use super::RingDrawer;
use crate::traits::RandomSource;

/// One grain in ring space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Grain {
    pub x: i32,
    pub y: i32,
}

/// A fixed population of `N` grains
#[derive(Debug, Clone)]
pub struct Snowfall<const N: usize> {
    grains: [Grain; N],
    width: i32,
    height: i32,
    fall_speed: i32,
    shake_range: u32,
    shake_offset: i32,
}

impl<const N: usize> Snowfall<N> {
    /// Grains for a ring of `width` by `height`, all waiting to spawn
    pub const fn new(width: i32, height: i32) -> Self {
        Self {
            grains: [Grain { x: 0, y: height }; N],
            width,
            height,
            fall_speed: 1,
            shake_range: 3,
            shake_offset: -1,
        }
    }

    pub const fn with_fall_speed(mut self, fall_speed: i32) -> Self {
        self.fall_speed = fall_speed;
        self
    }

    /// Sideways drift per step is `random % range + offset`
    pub const fn with_shake(mut self, range: u32, offset: i32) -> Self {
        self.shake_range = range;
        self.shake_offset = offset;
        self
    }

    pub fn grains(&self) -> &[Grain] {
        &self.grains
    }

    /// Advance every grain by one frame
    pub fn step<R: RandomSource>(&mut self, rng: &mut R) {
        for grain in self.grains.iter_mut() {
            if grain.y >= self.height {
                // One draw for both coordinates
                let rnd = rng.next_u32();
                grain.x = ((rnd >> 16) % self.width.max(1) as u32) as i32;
                grain.y = -(((rnd & 0xFFFF) % self.height.max(1) as u32) as i32);
            } else {
                grain.x += rng.below(self.shake_range) as i32 + self.shake_offset;
                grain.y += self.fall_speed;
            }
        }
    }

    /// Plot every grain, shifted left by `xpos`
    pub fn draw(&self, drawer: &mut RingDrawer<'_>, xpos: i32) {
        for grain in &self.grains {
            drawer.dot(grain.x - xpos, grain.y);
        }
    }
}
