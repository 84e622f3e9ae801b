//! Randomness for content effects

/// Source of pseudo-random numbers
pub trait RandomSource {
    fn next_u32(&mut self) -> u32;

    /// Uniform-ish value in `0..bound`, zero when `bound` is zero
    fn below(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            0
        } else {
            self.next_u32() % bound
        }
    }
}

/// Marsaglia xorshift32
#[derive(Debug, Clone)]
pub struct XorShift32 {
    state: u32,
}

impl XorShift32 {
    /// Seed the generator; a zero seed is replaced since it would stick
    pub const fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 0x9E37_79B9 } else { seed },
        }
    }
}

impl RandomSource for XorShift32 {
    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xorshift_sequence() {
        let mut rng = XorShift32::new(1);
        assert_eq!(rng.next_u32(), 270_369);
        assert_ne!(rng.next_u32(), 270_369);
    }

    #[test]
    fn test_zero_seed_is_not_stuck() {
        let mut rng = XorShift32::new(0);
        assert_ne!(rng.next_u32(), 0);
    }

    #[test]
    fn test_below_bound() {
        let mut rng = XorShift32::new(42);
        for _ in 0..100 {
            assert!(rng.below(16) < 16);
        }
        assert_eq!(rng.below(0), 0);
    }
}
