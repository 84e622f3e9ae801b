//! Controller side of the bridge link
//!
//! The controller talks to each group of bridge boards over its own
//! [`LinkPort`](spinring_hal::LinkPort). [`LinkMaster`] owns the ports,
//! frames commands, polls readiness and streams frames to all channels at
//! once.

mod master;
mod spi;

pub use master::LinkMaster;
pub use spi::{SpiLink, SpiLinkError};

use spinring_protocol::{Status, DEFAULT_PAD_LEN};

/// Link timing and retry configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkConfig {
    /// Status polls before a channel counts as not ready
    pub ready_retries: u32,
    /// Bytes clocked while waiting for a valid response byte
    pub response_tries: u8,
    /// Zero bytes clocked between a payload and its CRC
    pub pad_len: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkConfig {
    pub const fn new() -> Self {
        Self {
            ready_retries: 0xF_FFFF,
            response_tries: 32,
            pad_len: DEFAULT_PAD_LEN,
        }
    }

    /// Override the readiness retry bound
    pub const fn with_ready_retries(mut self, retries: u32) -> Self {
        self.ready_retries = retries;
        self
    }

    /// Override the pad length
    pub const fn with_pad_len(mut self, pad_len: usize) -> Self {
        self.pad_len = pad_len;
        self
    }
}

/// Link errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError<E> {
    /// Transport error from the port
    Port(E),
    /// Channel never reported ready within the retry bound
    ReadinessTimeout(usize),
    /// Channel answered a ping with something other than an ack
    PingFailed { channel: usize, status: Status },
    /// No port with this index
    InvalidChannel(usize),
    /// Frame cannot be split evenly into per-channel blocks
    FrameSize(usize),
}
