//! Bit-level panel bus lanes
//!
//! A lane is one I2C-style bus implemented by a PIO state machine. The
//! state machine consumes 16-bit instruction words from a TX queue; the
//! layout of those words is described in [`word`].

/// One panel bus lane
///
/// Methods never block. The fan-out engine decides how long to poll.
pub trait BusLane {
    /// Queue a start condition
    fn start(&mut self);

    /// Queue a stop condition
    fn stop(&mut self);

    /// Queue a repeated start condition
    fn repeated_start(&mut self);

    /// Enable or disable pushing received bytes into the RX queue
    fn set_rx_enabled(&mut self, enabled: bool);

    /// Push one word into the TX queue
    ///
    /// Callers check [`is_tx_full`](Self::is_tx_full) first.
    fn push(&mut self, word: u16);

    /// True when the TX queue cannot take another word
    fn is_tx_full(&self) -> bool;

    /// True when the lane has seen a NAK or other bus fault
    fn has_error(&self) -> bool;

    /// Clear the fault and let the state machine continue
    fn resume_after_error(&mut self);

    /// True when the lane has drained its queue and released the bus
    fn is_idle(&self) -> bool;
}

/// Lane configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LaneConfig {
    /// Bus clock frequency in Hz
    pub frequency: u32,
}

impl Default for LaneConfig {
    fn default() -> Self {
        Self::FAST_PLUS
    }
}

impl LaneConfig {
    /// PIO cycles per bus bit of the lane program
    pub const CYCLES_PER_BIT: u32 = 32;

    /// Standard mode (100 kHz)
    pub const STANDARD: Self = Self { frequency: 100_000 };

    /// Fast mode (400 kHz)
    pub const FAST: Self = Self { frequency: 400_000 };

    /// Fast mode plus (1 MHz)
    pub const FAST_PLUS: Self = Self {
        frequency: 1_000_000,
    };

    /// State machine clock divider for a system clock of `sys_hz`
    ///
    /// Returned as 16.8 fixed point, the format of the PIO `CLKDIV` register.
    pub fn clock_divider(&self, sys_hz: u32) -> u32 {
        let bit_hz = u64::from(self.frequency) * u64::from(Self::CYCLES_PER_BIT);
        if bit_hz == 0 {
            return 0;
        }
        ((u64::from(sys_hz) << 8) / bit_hz) as u32
    }
}

/// TX word layout of the lane program
pub mod word {
    /// Bit 0: NAK handling flag, always set for writes
    pub const NAK_LSB: u16 = 0;
    /// Bits 1..=8: data byte
    pub const DATA_LSB: u16 = 1;
    /// Bit 9: final byte of a read
    pub const FINAL_LSB: u16 = 9;
    /// Bits 10..: instruction count for raw instruction words
    pub const ICOUNT_LSB: u16 = 10;

    /// Address word for a write to the 7-bit address `addr`
    pub const fn address(addr: u8) -> u16 {
        ((addr as u16) << 2) | 1
    }

    /// Data word for `byte`, with the final marker when `last`
    pub const fn data(byte: u8, last: bool) -> u16 {
        ((byte as u16) << DATA_LSB) | ((last as u16) << FINAL_LSB) | (1 << NAK_LSB)
    }
}
