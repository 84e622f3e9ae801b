//! Link port abstractions
//!
//! A link port is the controller's SPI master connection to one group of
//! bridge boards. Besides plain transfers it can stream a bulk payload in
//! the background so that two ports can move frame data at the same time.

/// Controller side of one link channel
///
/// Every byte clocked out is answered with one byte from the bridge.
pub trait LinkPort {
    /// Error type for link operations
    type Error;

    /// Full-duplex transfer
    ///
    /// Writes `write` while reading into `read`. Both buffers must be the
    /// same length.
    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error>;

    /// Write data, discarding whatever comes back
    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Clock one byte out and return the byte clocked in
    fn exchange(&mut self, byte: u8) -> Result<u8, Self::Error> {
        let mut read = [0u8; 1];
        self.transfer(&mut read, &[byte])?;
        Ok(read[0])
    }

    /// Start streaming `data` to the bridge
    ///
    /// Ports without background transfer support complete the write before
    /// returning, which is what the default does.
    fn begin_write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.write(data)
    }

    /// Check whether the last [`begin_write`](Self::begin_write) has finished
    fn is_write_done(&mut self) -> bool {
        true
    }

    /// Block until the last [`begin_write`](Self::begin_write) has finished
    fn finish_write(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// SPI configuration for a link channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpiConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
    /// Clock polarity and phase
    pub mode: Mode,
    /// Bit order on the wire
    pub bit_order: BitOrder,
}

impl Default for SpiConfig {
    fn default() -> Self {
        Self::LINK
    }
}

impl SpiConfig {
    /// Settings the bridges expect: 3 MHz, mode 0, MSB first
    pub const LINK: Self = Self {
        frequency: 3_000_000,
        mode: Mode::Mode0,
        bit_order: BitOrder::MsbFirst,
    };

    /// Clock polarity of the configured mode
    pub fn polarity(&self) -> Polarity {
        let (polarity, _) = self.mode.into();
        polarity
    }

    /// Clock phase of the configured mode
    pub fn phase(&self) -> Phase {
        let (_, phase) = self.mode.into();
        phase
    }
}

/// Bit order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BitOrder {
    MsbFirst,
    LsbFirst,
}

/// SPI clock polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    /// CPOL = 0
    IdleLow,
    /// CPOL = 1
    IdleHigh,
}

/// SPI clock phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// CPHA = 0, sample on the leading edge
    CaptureOnFirstTransition,
    /// CPHA = 1, sample on the trailing edge
    CaptureOnSecondTransition,
}

/// Polarity and phase as one of the four standard modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    Mode0,
    Mode1,
    Mode2,
    Mode3,
}

impl From<Mode> for (Polarity, Phase) {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Mode0 => (Polarity::IdleLow, Phase::CaptureOnFirstTransition),
            Mode::Mode1 => (Polarity::IdleLow, Phase::CaptureOnSecondTransition),
            Mode::Mode2 => (Polarity::IdleHigh, Phase::CaptureOnFirstTransition),
            Mode::Mode3 => (Polarity::IdleHigh, Phase::CaptureOnSecondTransition),
        }
    }
}
