//! Calibration persistence
//!
//! Wear-leveled key-value storage in the last 64KB of flash, holding the
//! postcard-encoded [`RingCalibration`].

use defmt::*;
use embassy_rp::dma::Channel;
use embassy_rp::flash::{Async, Flash};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use sequential_storage::cache::NoCache;
use sequential_storage::map;

use spinring_core::config::{CalibrationError, RingCalibration, CALIBRATION_MAX_SIZE};

/// 2MB flash on the controller board
pub const FLASH_SIZE: usize = 2 * 1024 * 1024;
/// Partition reserved in memory.x
pub const CONFIG_PARTITION_SIZE: usize = 64 * 1024;
pub const CONFIG_PARTITION_START: usize = FLASH_SIZE - CONFIG_PARTITION_SIZE;

const CONFIG_RANGE: core::ops::Range<u32> = (CONFIG_PARTITION_START as u32)..(FLASH_SIZE as u32);

/// Map key of the calibration blob
const CALIBRATION_KEY: u8 = 1;

/// Scratch for sequential-storage item headers plus the blob
const ITEM_BUFFER_SIZE: usize = 128;

/// Storage errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// No calibration stored yet
    NotFound,
    /// Flash or map operation failed
    Flash,
    /// Stored blob rejected
    Calibration(CalibrationError),
}

impl From<CalibrationError> for StorageError {
    fn from(e: CalibrationError) -> Self {
        StorageError::Calibration(e)
    }
}

/// Calibration store on the on-board flash
pub struct CalibrationStore<'d> {
    flash: Flash<'d, FLASH, Async, FLASH_SIZE>,
}

impl<'d> CalibrationStore<'d> {
    pub fn new(flash: Peri<'d, FLASH>, dma: Peri<'d, impl Channel>) -> Self {
        Self {
            flash: Flash::new(flash, dma),
        }
    }

    /// Stored calibration, or defaults when missing or invalid
    pub async fn load_or_default(&mut self) -> RingCalibration {
        match self.load().await {
            Ok(calibration) => {
                info!(
                    "Loaded calibration: offset={}, reverse_lanes={}, contrast={}",
                    calibration.angle_offset, calibration.reverse_lanes, calibration.contrast
                );
                calibration
            }
            Err(StorageError::NotFound) => {
                debug!("No calibration in flash, using defaults");
                RingCalibration::new()
            }
            Err(e) => {
                warn!("Failed to load calibration: {:?}, using defaults", e);
                RingCalibration::new()
            }
        }
    }

    pub async fn load(&mut self) -> Result<RingCalibration, StorageError> {
        let mut buffer = [0u8; ITEM_BUFFER_SIZE];
        let item = map::fetch_item::<u8, &[u8], _>(
            &mut self.flash,
            CONFIG_RANGE,
            &mut NoCache::new(),
            &mut buffer,
            &CALIBRATION_KEY,
        )
        .await
        .map_err(|_| StorageError::Flash)?;

        let data = item.ok_or(StorageError::NotFound)?;
        Ok(RingCalibration::load(data)?)
    }

    pub async fn save(&mut self, calibration: &RingCalibration) -> Result<(), StorageError> {
        let mut blob = [0u8; CALIBRATION_MAX_SIZE];
        let bytes: &[u8] = calibration.store(&mut blob)?;

        let mut buffer = [0u8; ITEM_BUFFER_SIZE];
        map::store_item(
            &mut self.flash,
            CONFIG_RANGE,
            &mut NoCache::new(),
            &mut buffer,
            &CALIBRATION_KEY,
            &bytes,
        )
        .await
        .map_err(|_| StorageError::Flash)?;

        debug!("Saved {} bytes of calibration", bytes.len());
        Ok(())
    }
}
