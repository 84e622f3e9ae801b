//! Bridge status byte
//!
//! Every byte a bridge clocks back to the controller is its status byte.
//! Bit 7 marks the byte as a real response; a line that idles low or high
//! without a bridge attached never looks valid with a clear busy bit.

/// Marks a byte as a valid response
pub const VALID: u8 = 0x80;
/// Bridge is busy with a previous frame
pub const BUSY: u8 = 1 << 1;
/// Acknowledges a ping
pub const PING_ACK: u8 = 1 << 2;
/// Bridge saw a bus or CRC error
pub const ERROR: u8 = 1 << 3;

/// Status byte wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status(pub u8);

impl Status {
    /// Status reported when no valid response arrived
    pub const NONE: Self = Self(0);

    /// Idle bridge with no flags
    pub const IDLE: Self = Self(VALID);

    pub const fn is_valid(self) -> bool {
        self.0 & VALID != 0
    }

    pub const fn is_busy(self) -> bool {
        self.0 & BUSY != 0
    }

    pub const fn is_error(self) -> bool {
        self.0 & ERROR != 0
    }

    /// True when the response is exactly a ping acknowledgement
    pub const fn is_ping_ack(self) -> bool {
        self.0 & !VALID == PING_ACK
    }

    /// Valid and not busy
    pub const fn is_ready(self) -> bool {
        self.is_valid() && !self.is_busy()
    }

    /// Return a copy with `flag` set or cleared
    pub const fn with(self, flag: u8, on: bool) -> Self {
        if on {
            Self(self.0 | flag)
        } else {
            Self(self.0 & !flag)
        }
    }
}

impl From<u8> for Status {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready() {
        assert!(Status(0x80).is_ready());
        assert!(!Status(0x82).is_ready());
        assert!(!Status(0x00).is_ready());
    }

    #[test]
    fn test_ping_ack_exact() {
        assert!(Status(0x84).is_ping_ack());
        assert!(!Status(0x86).is_ping_ack());
        assert!(!Status(0x80).is_ping_ack());
    }

    #[test]
    fn test_with_flags() {
        let s = Status::IDLE.with(BUSY, true).with(ERROR, true);
        assert_eq!(s.0, 0x8A);
        assert_eq!(s.with(BUSY, false).0, 0x88);
    }
}
