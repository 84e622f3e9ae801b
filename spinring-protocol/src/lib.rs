//! Spinring link protocol
//!
//! This crate defines the SPI-based protocol between the rotor controller
//! (which renders frames) and the bridge boards (which fan each frame out to
//! their attached OLED panels). The controller is always the bus master; a
//! bridge answers every clocked byte with its current status byte.
//!
//! # Command frame
//!
//! ```text
//! ┌──────┬──────┬────────┬──────┬──────┬───────┬───────┬────────┬────────┐
//! │ 0xAA │ 0x55 │ OPCODE │ OPT1 │ OPT2 │ ~OPT1 │ ~OPT2 │ CRC_LO │ CRC_HI │
//! └──────┴──────┴────────┴──────┴──────┴───────┴───────┴────────┴────────┘
//! ```
//!
//! The CRC is CRC-16/CCITT (poly 0x1021, init 0xFFFF) over the seven bytes
//! before it.
//!
//! # Bulk data
//!
//! A `SET_DATA` frame carries the per-channel payload length in OPT1/OPT2
//! (little endian) and is sent without its own CRC. The raw payload follows,
//! then a short zero pad, then a CRC seeded from the header CRC and run over
//! the payload:
//!
//! ```text
//! ┌─────────────┬───────────────┬──────────┬────────┬────────┐
//! │ HEADER (7B) │ PAYLOAD (len) │ PAD (0s) │ CRC_LO │ CRC_HI │
//! └─────────────┴───────────────┴──────────┴────────┴────────┘
//! ```

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

pub mod command;
pub mod crc;
pub mod parser;
pub mod status;

pub use command::{
    CommandFrame, Opcode, COMMAND_FRAME_LEN, DEFAULT_OPTION, HEADER_LEN, SYNC1, SYNC2,
};
pub use crc::{crc16, crc16_update, Crc16};
pub use parser::{FrameError, FrameParser, Received, DEFAULT_PAD_LEN};
pub use status::Status;
