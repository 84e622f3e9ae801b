//! Byte-fed receiver for the bridge side of the link.
//!
//! The parser resynchronizes on `0xAA 0x55`, checks the option complements,
//! and only yields a command once its CRC has been verified. A `SET_DATA`
//! header switches it into payload mode: exactly `len` bytes are collected,
//! the zero pad is skipped and the trailing CRC (seeded from the header CRC)
//! is checked before the payload becomes visible through [`FrameParser::payload`].

use heapless::Vec;

use crate::command::{CommandFrame, Opcode, HEADER_LEN, SYNC1, SYNC2};
use crate::crc::{crc16, Crc16};

/// Zero bytes clocked between the payload and its CRC
pub const DEFAULT_PAD_LEN: usize = 32;

/// Errors that can occur while parsing link frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Frame does not start with the sync pair
    InvalidSync,
    /// Option bytes and their complements disagree
    InvalidOptions,
    /// Command CRC mismatch
    InvalidChecksum,
    /// Opcode is not part of the protocol
    UnknownOpcode(u8),
    /// Payload CRC mismatch, the payload was dropped
    PayloadChecksum,
    /// Announced payload does not fit the receive buffer
    PayloadTooLarge,
}

/// Something the parser accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Received {
    /// A verified command frame
    Command(CommandFrame),
    /// A verified payload of this many bytes, see [`FrameParser::payload`]
    Data(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Waiting for SYNC1
    WaitingForSync1,
    /// Got SYNC1, waiting for SYNC2
    WaitingForSync2,
    /// Collecting opcode and options
    ReadingHeader,
    /// Waiting for the command CRC
    ReadingCrc,
    /// Collecting bulk payload
    ReadingPayload,
    /// Skipping the zero pad
    SkippingPad,
    /// Waiting for the payload CRC
    ReadingPayloadCrc,
}

/// State machine for parsing link traffic with a payload buffer of `N` bytes
#[derive(Debug, Clone)]
pub struct FrameParser<const N: usize> {
    state: ParseState,
    header: [u8; HEADER_LEN],
    header_len: usize,
    crc_bytes: [u8; 2],
    crc_len: usize,
    payload: Vec<u8, N>,
    expected_len: usize,
    payload_valid: bool,
    pad_len: usize,
    pad_left: usize,
    running: Crc16,
}

impl<const N: usize> Default for FrameParser<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> FrameParser<N> {
    /// Create a parser expecting the default pad length
    pub fn new() -> Self {
        Self::with_pad(DEFAULT_PAD_LEN)
    }

    /// Create a parser expecting `pad_len` zero bytes before each payload CRC
    pub fn with_pad(pad_len: usize) -> Self {
        Self {
            state: ParseState::WaitingForSync1,
            header: [0; HEADER_LEN],
            header_len: 0,
            crc_bytes: [0; 2],
            crc_len: 0,
            payload: Vec::new(),
            expected_len: 0,
            payload_valid: false,
            pad_len,
            pad_left: 0,
            running: Crc16::new(),
        }
    }

    /// Drop any partial frame and the last payload
    pub fn reset(&mut self) {
        self.restart();
        self.payload.clear();
        self.payload_valid = false;
    }

    fn restart(&mut self) {
        self.state = ParseState::WaitingForSync1;
        self.header_len = 0;
        self.crc_len = 0;
        self.expected_len = 0;
        self.pad_left = 0;
    }

    /// True while a bulk transfer is in progress
    pub fn in_transfer(&self) -> bool {
        matches!(
            self.state,
            ParseState::ReadingPayload | ParseState::SkippingPad | ParseState::ReadingPayloadCrc
        )
    }

    /// The last verified payload, empty if none is available
    pub fn payload(&self) -> &[u8] {
        if self.payload_valid {
            &self.payload
        } else {
            &[]
        }
    }

    /// Feed a single byte to the parser
    ///
    /// Returns `Ok(Some(_))` when a command or payload was verified,
    /// `Ok(None)` when more bytes are needed, or `Err` when a frame was
    /// rejected. After an error the parser is hunting for sync again.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Received>, FrameError> {
        match self.state {
            ParseState::WaitingForSync1 => {
                if byte == SYNC1 {
                    self.state = ParseState::WaitingForSync2;
                }
                Ok(None)
            }
            ParseState::WaitingForSync2 => {
                self.state = match byte {
                    SYNC2 => {
                        self.header[0] = SYNC1;
                        self.header[1] = SYNC2;
                        self.header_len = 2;
                        ParseState::ReadingHeader
                    }
                    SYNC1 => ParseState::WaitingForSync2,
                    _ => ParseState::WaitingForSync1,
                };
                Ok(None)
            }
            ParseState::ReadingHeader => {
                self.header[self.header_len] = byte;
                self.header_len += 1;
                if self.header_len < HEADER_LEN {
                    return Ok(None);
                }
                self.end_of_header()
            }
            ParseState::ReadingCrc => {
                self.crc_bytes[self.crc_len] = byte;
                self.crc_len += 1;
                if self.crc_len < 2 {
                    return Ok(None);
                }
                self.restart();

                if u16::from_le_bytes(self.crc_bytes) != crc16(&self.header) {
                    return Err(FrameError::InvalidChecksum);
                }
                let opcode = Opcode::try_from(self.header[2])?;
                Ok(Some(Received::Command(CommandFrame::new(
                    opcode,
                    self.header[3],
                    self.header[4],
                ))))
            }
            ParseState::ReadingPayload => {
                // Capacity was checked against expected_len when the header arrived
                let _ = self.payload.push(byte);
                self.running.push(byte);
                if self.payload.len() == self.expected_len {
                    self.enter_pad();
                }
                Ok(None)
            }
            ParseState::SkippingPad => {
                self.pad_left -= 1;
                if self.pad_left == 0 {
                    self.state = ParseState::ReadingPayloadCrc;
                }
                Ok(None)
            }
            ParseState::ReadingPayloadCrc => {
                self.crc_bytes[self.crc_len] = byte;
                self.crc_len += 1;
                if self.crc_len < 2 {
                    return Ok(None);
                }
                let len = self.expected_len;
                self.restart();

                if u16::from_le_bytes(self.crc_bytes) != self.running.value() {
                    self.payload.clear();
                    return Err(FrameError::PayloadChecksum);
                }
                self.payload_valid = true;
                Ok(Some(Received::Data(len)))
            }
        }
    }

    /// Feed multiple bytes to the parser
    ///
    /// Returns the first verified item found, if any.
    /// Remaining bytes after it are not consumed.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Result<Option<Received>, FrameError> {
        for &byte in bytes {
            if let Some(item) = self.feed(byte)? {
                return Ok(Some(item));
            }
        }
        Ok(None)
    }

    fn end_of_header(&mut self) -> Result<Option<Received>, FrameError> {
        let h = &self.header;
        if h[3] != !h[5] || h[4] != !h[6] {
            self.restart();
            return Err(FrameError::InvalidOptions);
        }

        if h[2] != Opcode::SetData.as_u8() {
            self.crc_len = 0;
            self.state = ParseState::ReadingCrc;
            return Ok(None);
        }

        // Bulk header: no CRC of its own, the payload CRC is chained from it
        let len = usize::from(u16::from_le_bytes([h[3], h[4]]));
        if len > N {
            self.restart();
            return Err(FrameError::PayloadTooLarge);
        }
        self.running = Crc16::seeded(crc16(h));
        self.payload.clear();
        self.payload_valid = false;
        self.expected_len = len;
        self.crc_len = 0;
        if len == 0 {
            self.enter_pad();
        } else {
            self.state = ParseState::ReadingPayload;
        }
        Ok(None)
    }

    fn enter_pad(&mut self) {
        self.pad_left = self.pad_len;
        self.state = if self.pad_len == 0 {
            ParseState::ReadingPayloadCrc
        } else {
            ParseState::SkippingPad
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crc::crc16_update;

    fn bulk(payload: &[u8], pad: usize) -> std::vec::Vec<u8> {
        let header = CommandFrame::set_data(payload.len() as u16).header();
        let crc = crc16_update(crc16(&header), payload);
        let mut out = std::vec::Vec::new();
        out.extend_from_slice(&header);
        out.extend_from_slice(payload);
        out.extend(core::iter::repeat(0).take(pad));
        out.extend_from_slice(&crc.to_le_bytes());
        out
    }

    #[test]
    fn test_parse_command() {
        let mut parser: FrameParser<16> = FrameParser::new();
        let bytes = CommandFrame::simple(Opcode::Ping).encode();
        let result = parser.feed_bytes(&bytes).unwrap();
        assert_eq!(
            result,
            Some(Received::Command(CommandFrame::simple(Opcode::Ping)))
        );
    }

    #[test]
    fn test_resync_after_garbage() {
        let mut parser: FrameParser<16> = FrameParser::new();
        let mut stream = [0u8; 13];
        stream[..4].copy_from_slice(&[0x00, 0xAA, 0x13, 0xAA]);
        stream[4..].copy_from_slice(&CommandFrame::simple(Opcode::LedOff).encode());
        let result = parser.feed_bytes(&stream).unwrap();
        assert_eq!(
            result,
            Some(Received::Command(CommandFrame::simple(Opcode::LedOff)))
        );
    }

    #[test]
    fn test_bad_crc_discards_command() {
        let mut parser: FrameParser<16> = FrameParser::new();
        let mut bytes = CommandFrame::simple(Opcode::HardReset).encode();
        bytes[7] ^= 0x40;
        assert_eq!(parser.feed_bytes(&bytes), Err(FrameError::InvalidChecksum));

        // Parser recovers for the next frame
        let good = CommandFrame::simple(Opcode::GetStatus).encode();
        assert!(matches!(
            parser.feed_bytes(&good),
            Ok(Some(Received::Command(_)))
        ));
    }

    #[test]
    fn test_bad_complement_rejected() {
        let mut parser: FrameParser<16> = FrameParser::new();
        let mut bytes = CommandFrame::simple(Opcode::Ping).encode();
        bytes[6] = 0x00;
        assert_eq!(parser.feed_bytes(&bytes), Err(FrameError::InvalidOptions));
    }

    #[test]
    fn test_unknown_opcode_after_crc() {
        let mut parser: FrameParser<16> = FrameParser::new();
        let header = [0xAA, 0x55, 0x42, 0x55, 0x55, 0xAA, 0xAA];
        let crc = crc16(&header).to_le_bytes();
        assert_eq!(parser.feed_bytes(&header), Ok(None));
        assert_eq!(
            parser.feed_bytes(&crc),
            Err(FrameError::UnknownOpcode(0x42))
        );
    }

    #[test]
    fn test_payload_verified() {
        let mut parser: FrameParser<64> = FrameParser::new();
        let payload: [u8; 24] = core::array::from_fn(|i| i as u8 * 3);
        let stream = bulk(&payload, DEFAULT_PAD_LEN);

        let (last, head) = stream.split_last().unwrap();
        assert_eq!(parser.feed_bytes(head), Ok(None));
        assert!(parser.in_transfer());
        assert_eq!(parser.feed(*last), Ok(Some(Received::Data(24))));
        assert_eq!(parser.payload(), &payload);
        assert!(!parser.in_transfer());
    }

    #[test]
    fn test_payload_corruption_drops_everything() {
        let mut parser: FrameParser<64> = FrameParser::new();
        let payload = [0x5Au8; 20];
        let mut stream = bulk(&payload, DEFAULT_PAD_LEN);
        stream[7 + 10] ^= 0x01;

        assert_eq!(parser.feed_bytes(&stream), Err(FrameError::PayloadChecksum));
        assert!(parser.payload().is_empty());
    }

    #[test]
    fn test_custom_pad() {
        let mut parser: FrameParser<8> = FrameParser::with_pad(0);
        let payload = [1u8, 2, 3, 4];
        let stream = bulk(&payload, 0);
        assert_eq!(parser.feed_bytes(&stream), Ok(Some(Received::Data(4))));
        assert_eq!(parser.payload(), &payload);
    }

    #[test]
    fn test_payload_too_large() {
        let mut parser: FrameParser<8> = FrameParser::new();
        let header = CommandFrame::set_data(9).header();
        assert_eq!(parser.feed_bytes(&header), Err(FrameError::PayloadTooLarge));
    }

    #[test]
    fn test_reset_clears_payload() {
        let mut parser: FrameParser<8> = FrameParser::with_pad(0);
        let stream = bulk(&[9, 9], 0);
        parser.feed_bytes(&stream).unwrap();
        assert_eq!(parser.payload(), &[9, 9]);
        parser.reset();
        assert!(parser.payload().is_empty());
    }
}
