//! SPI link port
//!
//! Wraps an `embedded-hal` SPI bus and a chip select pin. Chip select is
//! held low for the duration of every transfer; a bulk write started with
//! `begin_write` keeps the bridge selected until `finish_write`.
//!
//! On a bus that also implements `embedded-hal-async`, [`SpiLink::write_async`]
//! streams a payload without blocking the executor, so several links can
//! move data at the same time.

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::{ErrorType, SpiBus};
use spinring_hal::LinkPort;

/// SPI link errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpiLinkError<S, P> {
    /// Bus error
    Spi(S),
    /// Chip select pin error
    Pin(P),
}

/// One link channel on an SPI bus
pub struct SpiLink<S, CS> {
    spi: S,
    cs: CS,
    writing: bool,
}

impl<S: ErrorType, CS: OutputPin> SpiLink<S, CS> {
    /// Wrap a bus configured per [`SpiConfig::LINK`](spinring_hal::SpiConfig::LINK)
    pub fn new(spi: S, cs: CS) -> Self {
        Self {
            spi,
            cs,
            writing: false,
        }
    }

    pub fn release(self) -> (S, CS) {
        (self.spi, self.cs)
    }

    fn select(&mut self) -> Result<(), SpiLinkError<S::Error, CS::Error>> {
        self.cs.set_low().map_err(SpiLinkError::Pin)
    }

    fn deselect(&mut self) -> Result<(), SpiLinkError<S::Error, CS::Error>> {
        self.cs.set_high().map_err(SpiLinkError::Pin)
    }
}

impl<S: embedded_hal_async::spi::SpiBus, CS: OutputPin> SpiLink<S, CS> {
    /// Write `data` with chip select held, awaiting the bus
    ///
    /// A bulk write left open by [`begin_write`](LinkPort::begin_write) is
    /// flushed and deselected first.
    pub async fn write_async(
        &mut self,
        data: &[u8],
    ) -> Result<(), SpiLinkError<S::Error, CS::Error>> {
        if self.writing {
            self.writing = false;
            let flushed = embedded_hal_async::spi::SpiBus::flush(&mut self.spi).await;
            self.deselect()?;
            flushed.map_err(SpiLinkError::Spi)?;
        }
        self.select()?;
        let result = match embedded_hal_async::spi::SpiBus::write(&mut self.spi, data).await {
            Ok(()) => embedded_hal_async::spi::SpiBus::flush(&mut self.spi).await,
            Err(err) => Err(err),
        };
        self.deselect()?;
        result.map_err(SpiLinkError::Spi)
    }
}

impl<S: SpiBus, CS: OutputPin> LinkPort for SpiLink<S, CS> {
    type Error = SpiLinkError<S::Error, CS::Error>;

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        self.finish_write()?;
        self.select()?;
        let result = self
            .spi
            .transfer(read, write)
            .and_then(|_| self.spi.flush())
            .map_err(SpiLinkError::Spi);
        self.deselect()?;
        result
    }

    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.finish_write()?;
        self.select()?;
        let result = self
            .spi
            .write(data)
            .and_then(|_| self.spi.flush())
            .map_err(SpiLinkError::Spi);
        self.deselect()?;
        result
    }

    fn begin_write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.finish_write()?;
        self.select()?;
        if let Err(err) = self.spi.write(data) {
            self.deselect()?;
            return Err(SpiLinkError::Spi(err));
        }
        self.writing = true;
        Ok(())
    }

    fn is_write_done(&mut self) -> bool {
        !self.writing
    }

    fn finish_write(&mut self) -> Result<(), Self::Error> {
        if !self.writing {
            return Ok(());
        }
        self.writing = false;
        let result = self.spi.flush().map_err(SpiLinkError::Spi);
        self.deselect()?;
        result
    }
}
