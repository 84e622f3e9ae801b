//! Bus fan-out to the panels of one bridge board
//!
//! A bridge drives up to eight panel buses, one [`BusLane`] each. The
//! [`FanoutEngine`] pushes every bus step to all lanes before moving on, so
//! all panels finish a frame together. [`PanelArray`] speaks the SSD1306
//! command set on top of it.
//!
//! [`BusLane`]: spinring_hal::BusLane

mod engine;
pub mod ssd1306;

pub use engine::FanoutEngine;
pub use ssd1306::{PanelArray, PanelArrayConfig, Vcc};

use spinring_hal::LaneConfig;

/// Most lanes a bridge can drive
pub const MAX_LANES: usize = 8;

/// Default 7-bit panel bus address
pub const DEFAULT_ADDRESS: u8 = 0x3C;

/// Control byte announcing command bytes
pub const CONTROL_COMMAND: u8 = 0x00;

/// Control byte announcing display data
pub const CONTROL_DATA: u8 = 0x40;

/// Fan-out configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FanoutConfig {
    /// Lanes in use, `1..=MAX_LANES`
    pub lanes: usize,
    /// 7-bit bus address of every panel
    pub address: u8,
    /// Polls of a full queue or a busy bus before a lane counts as stalled
    pub poll_budget: u32,
    /// Bus timing
    pub lane: LaneConfig,
}

impl Default for FanoutConfig {
    fn default() -> Self {
        Self::new(MAX_LANES)
    }
}

impl FanoutConfig {
    pub const fn new(lanes: usize) -> Self {
        Self {
            lanes,
            address: DEFAULT_ADDRESS,
            poll_budget: 100_000,
            lane: LaneConfig::FAST_PLUS,
        }
    }

    pub const fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    pub const fn with_poll_budget(mut self, poll_budget: u32) -> Self {
        self.poll_budget = poll_budget;
        self
    }
}

/// Why a lane dropped out of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LaneError {
    /// NAK or other bus fault
    Bus,
    /// Queue stayed full or the bus never went idle within the poll budget
    Stalled,
    /// No lane with this index
    InvalidLane,
}

/// Per-lane outcome of one transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LaneReport {
    errors: [Option<LaneError>; MAX_LANES],
}

impl LaneReport {
    /// True when no lane failed
    pub fn is_ok(&self) -> bool {
        self.errors.iter().all(Option::is_none)
    }

    /// Outcome of one lane
    pub fn error(&self, lane: usize) -> Option<LaneError> {
        self.errors.get(lane).copied().flatten()
    }

    /// Bit mask of failed lanes
    pub fn failed_lanes(&self) -> u8 {
        self.errors
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_some())
            .fold(0, |mask, (lane, _)| mask | 1 << lane)
    }

    pub(crate) fn record(&mut self, lane: usize, error: LaneError) {
        if let Some(slot) = self.errors.get_mut(lane) {
            // Keep the first cause
            if slot.is_none() {
                *slot = Some(error);
            }
        }
    }

    /// Combine with a later transaction's report
    pub fn merge(&mut self, other: LaneReport) {
        for (lane, error) in other.errors.iter().enumerate() {
            if let Some(error) = error {
                self.record(lane, *error);
            }
        }
    }
}

/// Which physical lane serves logical panel slot `i`
///
/// Bridges sit on either side of the ring and see their panels in opposite
/// order; the link's direction commands pick the mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LaneMap {
    #[default]
    Forward,
    Reverse,
}

impl LaneMap {
    /// Physical lane for logical slot `slot` out of `lanes`
    pub const fn physical(self, slot: usize, lanes: usize) -> usize {
        match self {
            LaneMap::Forward => slot,
            LaneMap::Reverse => lanes - 1 - slot,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_lane_report() {
        let mut report = LaneReport::default();
        assert!(report.is_ok());

        report.record(2, LaneError::Bus);
        report.record(2, LaneError::Stalled);
        report.record(5, LaneError::Stalled);
        report.record(9, LaneError::Bus);

        assert!(!report.is_ok());
        assert_eq!(report.error(2), Some(LaneError::Bus));
        assert_eq!(report.error(5), Some(LaneError::Stalled));
        assert_eq!(report.error(0), None);
        assert_eq!(report.failed_lanes(), 0b0010_0100);
    }

    #[test]
    fn test_lane_map() {
        assert_eq!(LaneMap::Forward.physical(0, 8), 0);
        assert_eq!(LaneMap::Reverse.physical(0, 8), 7);
        assert_eq!(LaneMap::Reverse.physical(7, 8), 0);
        assert_eq!(LaneMap::Reverse.physical(1, 3), 1);
    }

    #[test]
    fn test_merge() {
        let mut a = LaneReport::default();
        let mut b = LaneReport::default();
        a.record(0, LaneError::Bus);
        b.record(0, LaneError::Stalled);
        b.record(1, LaneError::Stalled);
        a.merge(b);
        assert_eq!(a.error(0), Some(LaneError::Bus));
        assert_eq!(a.error(1), Some(LaneError::Stalled));
    }

    proptest! {
        #[test]
        fn lane_map_is_a_permutation(lanes in 1usize..=MAX_LANES, reverse in any::<bool>()) {
            let map = if reverse { LaneMap::Reverse } else { LaneMap::Forward };
            let mut seen = 0u8;
            for slot in 0..lanes {
                let lane = map.physical(slot, lanes);
                prop_assert!(lane < lanes);
                seen |= 1 << lane;
            }
            prop_assert_eq!(u32::from(seen).count_ones() as usize, lanes);
        }
    }
}
