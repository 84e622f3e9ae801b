//! Command frame encoding for the controller-to-bridge link.
//!
//! Frame format (9 bytes):
//! - SYNC1, SYNC2: 0xAA 0x55
//! - OPCODE: command identifier
//! - OPT1, OPT2: option bytes
//! - ~OPT1, ~OPT2: bitwise complements of the options
//! - CRC (2 bytes, little endian): CRC16 of the seven preceding bytes

use crate::crc::crc16;
use crate::parser::FrameError;

/// First synchronization byte
pub const SYNC1: u8 = 0xAA;

/// Second synchronization byte
pub const SYNC2: u8 = 0x55;

/// Option byte used by commands that carry no argument
pub const DEFAULT_OPTION: u8 = 0x55;

/// Length of the frame without its CRC
pub const HEADER_LEN: usize = 7;

/// Length of a complete command frame
pub const COMMAND_FRAME_LEN: usize = HEADER_LEN + 2;

/// Link opcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Opcode {
    /// Query the bridge status byte
    GetStatus = 0x01,
    /// Announce that a frame transfer begins
    StartFrame = 0x02,
    /// Bulk frame data follows (options carry the length)
    SetData = 0x03,
    /// Liveness check, answered with the ping-ack bit
    Ping = 0x04,
    /// Status LED on
    LedOn = 0x05,
    /// Status LED off
    LedOff = 0x06,
    /// Select lane mapping A
    DirectionA = 0x07,
    /// Select lane mapping B
    DirectionB = 0x08,
    /// Reboot the bridge
    HardReset = 0xFE,
}

impl Opcode {
    /// Wire value of this opcode
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Opcode {
    type Error = FrameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(Self::GetStatus),
            0x02 => Ok(Self::StartFrame),
            0x03 => Ok(Self::SetData),
            0x04 => Ok(Self::Ping),
            0x05 => Ok(Self::LedOn),
            0x06 => Ok(Self::LedOff),
            0x07 => Ok(Self::DirectionA),
            0x08 => Ok(Self::DirectionB),
            0xFE => Ok(Self::HardReset),
            other => Err(FrameError::UnknownOpcode(other)),
        }
    }
}

/// A command frame ready to be put on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandFrame {
    /// Command identifier
    pub opcode: Opcode,
    /// First option byte
    pub opt1: u8,
    /// Second option byte
    pub opt2: u8,
}

impl CommandFrame {
    /// Create a frame with explicit options
    pub const fn new(opcode: Opcode, opt1: u8, opt2: u8) -> Self {
        Self { opcode, opt1, opt2 }
    }

    /// Create a frame with the default option bytes
    pub const fn simple(opcode: Opcode) -> Self {
        Self::new(opcode, DEFAULT_OPTION, DEFAULT_OPTION)
    }

    /// Bulk data header announcing `len` payload bytes on this channel
    pub const fn set_data(len: u16) -> Self {
        let [lo, hi] = len.to_le_bytes();
        Self::new(Opcode::SetData, lo, hi)
    }

    /// Payload length carried in the options (meaningful for `SetData`)
    pub const fn data_len(&self) -> u16 {
        u16::from_le_bytes([self.opt1, self.opt2])
    }

    /// The seven bytes covered by the CRC
    pub const fn header(&self) -> [u8; HEADER_LEN] {
        [
            SYNC1,
            SYNC2,
            self.opcode.as_u8(),
            self.opt1,
            self.opt2,
            !self.opt1,
            !self.opt2,
        ]
    }

    /// CRC of the header
    pub fn crc(&self) -> u16 {
        crc16(&self.header())
    }

    /// Complete 9-byte frame
    pub fn encode(&self) -> [u8; COMMAND_FRAME_LEN] {
        let header = self.header();
        let [lo, hi] = crc16(&header).to_le_bytes();
        let mut out = [0u8; COMMAND_FRAME_LEN];
        out[..HEADER_LEN].copy_from_slice(&header);
        out[HEADER_LEN] = lo;
        out[HEADER_LEN + 1] = hi;
        out
    }

    /// Decode and verify a complete frame
    pub fn decode(bytes: &[u8; COMMAND_FRAME_LEN]) -> Result<Self, FrameError> {
        if bytes[0] != SYNC1 || bytes[1] != SYNC2 {
            return Err(FrameError::InvalidSync);
        }
        if bytes[3] != !bytes[5] || bytes[4] != !bytes[6] {
            return Err(FrameError::InvalidOptions);
        }
        let crc = u16::from_le_bytes([bytes[7], bytes[8]]);
        if crc != crc16(&bytes[..HEADER_LEN]) {
            return Err(FrameError::InvalidChecksum);
        }
        let opcode = Opcode::try_from(bytes[2])?;
        Ok(Self::new(opcode, bytes[3], bytes[4]))
    }
}
