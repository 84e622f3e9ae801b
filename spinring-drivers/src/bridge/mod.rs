//! Bridge side of the link
//!
//! A bridge board sits between one link channel and its panels. It parses
//! the controller's traffic byte by byte, answers every byte with its
//! status, and hands verified frames to its [`PanelArray`].
//!
//! [`PanelArray`]: crate::fanout::PanelArray

mod receiver;

pub use receiver::BridgeReceiver;
