//! Spinring Hardware Abstraction Layer
//!
//! This crate defines the two bus abstractions the display needs, so the
//! protocol and fan-out logic can be tested on the host and run on any chip
//! that can provide them.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────┐            ┌──────────────────────────┐
//! │  controller              │  LinkPort  │  bridge board            │
//! │  (renders, LinkMaster)   │ ─────────► │  (BridgeReceiver)        │
//! └──────────────────────────┘   x2 SPI   └──────────────────────────┘
//!                                                      │ BusLane x8
//!                                                      ▼
//!                                          ┌──────────────────────────┐
//!                                          │  OLED panels             │
//!                                          └──────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`link::LinkPort`] - Byte link from the controller to one bridge group
//! - [`lane::BusLane`] - One bit-level panel bus driven by a PIO state machine

#![no_std]
#![deny(unsafe_code)]

pub mod lane;
pub mod link;

// Re-export key traits at crate root for convenience
pub use lane::{BusLane, LaneConfig};
pub use link::{LinkPort, SpiConfig};
