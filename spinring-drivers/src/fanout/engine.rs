//! Lock-step fan-out engine
//!
//! One transaction on every participating lane:
//!
//! ```text
//! start, rx off
//! address word                     \
//! control word (0x00 / 0x40)        } one step each, pushed to every live
//! byte 0 .. byte n-1 (final on n-1) /  lane before the next step starts
//! stop, wait idle
//! resume + stop on lanes that failed
//! ```
//!
//! A lane that faults or stays full drops out of the transaction; the
//! others carry on.

use spinring_hal::lane::word;
use spinring_hal::BusLane;

use super::{
    FanoutConfig, LaneError, LaneMap, LaneReport, CONTROL_COMMAND, CONTROL_DATA, MAX_LANES,
};

/// Drives `M` panel bus lanes in lock-step
pub struct FanoutEngine<L, const M: usize = MAX_LANES> {
    lanes: [L; M],
    config: FanoutConfig,
    map: LaneMap,
}

impl<L: BusLane, const M: usize> FanoutEngine<L, M> {
    pub fn new(lanes: [L; M], config: FanoutConfig) -> Self {
        Self {
            lanes,
            config,
            map: LaneMap::Forward,
        }
    }

    pub fn config(&self) -> &FanoutConfig {
        &self.config
    }

    /// Lanes taking part in transactions
    pub fn lane_count(&self) -> usize {
        self.config.lanes.min(M).min(MAX_LANES)
    }

    pub fn lane_map(&self) -> LaneMap {
        self.map
    }

    /// Select the lane mapping; `true` reverses the lane order
    pub fn set_direction(&mut self, reverse: bool) {
        self.map = if reverse {
            LaneMap::Reverse
        } else {
            LaneMap::Forward
        };
    }

    /// Lanes in physical order
    pub fn lanes(&self) -> &[L] {
        &self.lanes
    }

    /// Direct access to a physical lane
    pub fn lane_mut(&mut self, lane: usize) -> Option<&mut L> {
        self.lanes.get_mut(lane)
    }

    pub fn release(self) -> [L; M] {
        self.lanes
    }

    /// Send the same bytes to every lane
    pub fn send_all(&mut self, bytes: &[u8], is_command: bool) -> LaneReport {
        let count = self.lane_count();
        self.transact(
            0..count,
            control_byte(is_command),
            bytes.len(),
            |_, step| bytes[step],
        )
    }

    /// Send `len` copies of `value` as display data to every lane
    pub fn fill_all(&mut self, value: u8, len: usize) -> LaneReport {
        let count = self.lane_count();
        self.transact(0..count, CONTROL_DATA, len, |_, _| value)
    }

    /// Send bytes to the panel in logical slot `slot`
    pub fn send(&mut self, slot: usize, bytes: &[u8], is_command: bool) -> Result<(), LaneError> {
        if slot >= self.lane_count() {
            return Err(LaneError::InvalidLane);
        }
        let report = self.transact(
            slot..slot + 1,
            control_byte(is_command),
            bytes.len(),
            |_, step| bytes[step],
        );
        let physical = self.map.physical(slot, self.lane_count());
        match report.error(physical) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Send each panel its own `panel_bytes` slice of `frame` as display data
    ///
    /// Slot `i` gets `frame[i * panel_bytes..][..panel_bytes]`; slots whose
    /// slice is not fully inside `frame` sit out.
    pub fn write_frame_multi(&mut self, frame: &[u8], panel_bytes: usize) -> LaneReport {
        if panel_bytes == 0 {
            return LaneReport::default();
        }
        let slots = self.lane_count().min(frame.len() / panel_bytes);
        self.transact(0..slots, CONTROL_DATA, panel_bytes, |slot, step| {
            frame[slot * panel_bytes + step]
        })
    }

    fn transact<F>(
        &mut self,
        slots: core::ops::Range<usize>,
        control: u8,
        len: usize,
        byte_at: F,
    ) -> LaneReport
    where
        F: Fn(usize, usize) -> u8,
    {
        let count = self.lane_count();
        let map = self.map;
        let budget = self.config.poll_budget;
        let address = word::address(self.config.address);

        let mut report = LaneReport::default();
        let mut taking_part = [false; M];
        for slot in slots {
            taking_part[map.physical(slot, count)] = true;
        }
        let mut live = taking_part;

        for (_, lane) in self.participants(&live) {
            lane.start();
            lane.set_rx_enabled(false);
        }

        push_step(&mut self.lanes, &mut live, &mut report, budget, |_| address);
        // The control byte goes out as its own final byte
        push_step(&mut self.lanes, &mut live, &mut report, budget, |_| {
            word::data(control, true)
        });
        for step in 0..len {
            let last = step + 1 == len;
            // The mapping is its own inverse, so it also takes lanes to slots
            push_step(&mut self.lanes, &mut live, &mut report, budget, |lane| {
                word::data(byte_at(map.physical(lane, count), step), last)
            });
        }

        for (_, lane) in self.participants(&live) {
            lane.stop();
        }
        for (index, lane) in self.participants(&live) {
            let mut polls = budget;
            while !lane.is_idle() {
                if polls == 0 {
                    report.record(index, LaneError::Stalled);
                    break;
                }
                polls -= 1;
            }
        }

        for (index, lane) in self.participants(&taking_part) {
            if lane.has_error() {
                report.record(index, LaneError::Bus);
            }
            if report.error(index).is_some() {
                lane.resume_after_error();
                lane.stop();
            }
        }

        #[cfg(feature = "defmt")]
        if !report.is_ok() {
            defmt::warn!("fanout: failed lanes {=u8:b}", report.failed_lanes());
        }
        report
    }

    fn participants<'a>(
        &'a mut self,
        mask: &'a [bool; M],
    ) -> impl Iterator<Item = (usize, &'a mut L)> + 'a {
        self.lanes
            .iter_mut()
            .enumerate()
            .filter(move |(index, _)| mask[*index])
    }
}

fn control_byte(is_command: bool) -> u8 {
    if is_command {
        CONTROL_COMMAND
    } else {
        CONTROL_DATA
    }
}

/// Push one word to every live lane once none of them is full
///
/// Lanes still full when the budget runs out, and lanes that fault on the
/// push, leave `live`.
fn push_step<L: BusLane>(
    lanes: &mut [L],
    live: &mut [bool],
    report: &mut LaneReport,
    budget: u32,
    word: impl Fn(usize) -> u16,
) {
    let mut polls = budget;
    loop {
        let any_full = lanes
            .iter()
            .zip(live.iter())
            .any(|(lane, on)| *on && lane.is_tx_full());
        if !any_full {
            break;
        }
        if polls == 0 {
            for (index, (lane, on)) in lanes.iter().zip(live.iter_mut()).enumerate() {
                if *on && lane.is_tx_full() {
                    *on = false;
                    report.record(index, LaneError::Stalled);
                }
            }
            break;
        }
        polls -= 1;
    }

    for (index, (lane, on)) in lanes.iter_mut().zip(live.iter_mut()).enumerate() {
        if !*on {
            continue;
        }
        lane.push(word(index));
        if lane.has_error() {
            *on = false;
            report.record(index, LaneError::Bus);
        }
    }
}
