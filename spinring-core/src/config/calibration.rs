//! Ring calibration data
//!
//! Per-rig values measured once and persisted: the angle sensor offset that
//! lines ring x up with the rotor index, the lane direction of the bridge
//! boards and the panel contrast.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use spinring_protocol::crc::crc16_update;

/// Magic number to identify valid calibration data
pub const CALIBRATION_MAGIC: u32 = 0x5350_5243; // "SPRC"

/// Current calibration data version
pub const CALIBRATION_VERSION: u8 = 1;

/// Largest encoded size of [`RingCalibration`]
pub const CALIBRATION_MAX_SIZE: usize = 32;

/// Errors that can occur loading or storing calibration data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationError {
    /// Serialization failed (buffer too small)
    Encode,
    /// Stored bytes are not a calibration blob
    Decode,
    /// Magic number mismatch (erased or foreign data)
    BadMagic,
    /// Written by an incompatible version
    BadVersion,
    /// CRC mismatch
    BadCrc,
}

/// Calibration blob stored in flash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RingCalibration {
    /// Magic number for validation
    pub magic: u32,
    /// Data format version
    pub version: u8,
    /// Added to the raw 14-bit angle register
    pub angle_offset: u16,
    /// Bridges use the reversed lane mapping
    pub reverse_lanes: bool,
    /// Panel contrast
    pub contrast: u8,
    /// CRC16 over the fields above
    pub crc: u16,
}

impl Default for RingCalibration {
    fn default() -> Self {
        Self::new()
    }
}

impl RingCalibration {
    /// Contrast used until calibrated
    pub const DEFAULT_CONTRAST: u8 = 0x8F;

    /// Uncalibrated defaults
    pub const fn new() -> Self {
        Self {
            magic: CALIBRATION_MAGIC,
            version: CALIBRATION_VERSION,
            angle_offset: 0,
            reverse_lanes: false,
            contrast: Self::DEFAULT_CONTRAST,
            crc: 0,
        }
    }

    /// Check magic and version
    pub fn is_valid(&self) -> bool {
        self.magic == CALIBRATION_MAGIC && self.version == CALIBRATION_VERSION
    }

    /// CRC16 over every field except `crc`
    pub fn calculate_crc(&self) -> u16 {
        let mut crc = crc16_update(0xFFFF, &self.magic.to_le_bytes());
        crc = crc16_update(crc, &[self.version]);
        crc = crc16_update(crc, &self.angle_offset.to_le_bytes());
        crc = crc16_update(crc, &[self.reverse_lanes as u8, self.contrast]);
        crc
    }

    /// Update the CRC field
    pub fn update_crc(&mut self) {
        self.crc = self.calculate_crc();
    }

    /// Verify the CRC is correct
    pub fn verify_crc(&self) -> bool {
        self.crc == self.calculate_crc()
    }

    /// Check magic, version and CRC
    pub fn validate(&self) -> Result<(), CalibrationError> {
        if self.magic != CALIBRATION_MAGIC {
            return Err(CalibrationError::BadMagic);
        }
        if self.version != CALIBRATION_VERSION {
            return Err(CalibrationError::BadVersion);
        }
        if !self.verify_crc() {
            return Err(CalibrationError::BadCrc);
        }
        Ok(())
    }

    /// Serialize into `buf` with a fresh CRC, returning the used prefix
    #[cfg(feature = "serde")]
    pub fn store<'a>(&self, buf: &'a mut [u8]) -> Result<&'a mut [u8], CalibrationError> {
        let mut sealed = *self;
        sealed.update_crc();
        postcard::to_slice(&sealed, buf).map_err(|_| CalibrationError::Encode)
    }

    /// Deserialize and validate a stored blob
    #[cfg(feature = "serde")]
    pub fn load(buf: &[u8]) -> Result<Self, CalibrationError> {
        let data: Self = postcard::from_bytes(buf).map_err(|_| CalibrationError::Decode)?;
        data.validate()?;
        Ok(data)
    }
}
