//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in spinring-core and spinring-hal:
//!
//! - Link master (controller side of the bridge link) and an SPI adapter
//! - Bus fan-out engine and the SSD1306 panel array on top of it
//! - Bridge receiver (bridge side of the link)
//! - Angle sensors (encoder PWM capture, AS5048A over SPI)
//! - Spin drive (two-pin PWM H-bridge)

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

pub mod bridge;
pub mod fanout;
pub mod link;
pub mod motor;
pub mod sensor;
