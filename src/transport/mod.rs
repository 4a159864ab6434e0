// MIT License - Copyright (c) 2026 The lora-sentinel authors

//! Radio link abstraction.
//!
//! The coordinator talks to the radio through [`RadioLink`]; the production
//! implementation lives in [`udp`], and the tests substitute mocks.

pub mod udp;

use crate::error::Result;

/// One frame pulled from the radio.
#[derive(Debug, Clone)]
pub struct ReceivedPacket {
    pub payload: Vec<u8>,
    /// Signal strength of the frame (dBm).
    pub rssi: i16,
}

/// The half-duplex radio link.
///
/// `send` takes the radio out of receive mode; callers must follow up with
/// [`RadioLink::listen`] to re-arm reception, and must do so even when the
/// send failed.
pub trait RadioLink: Send {
    /// Pull the next pending frame, if any. Never blocks.
    fn receive(&mut self) -> Result<Option<ReceivedPacket>>;

    /// Transmit one frame.
    fn send(&mut self, payload: &[u8]) -> Result<()>;

    /// Return the radio to receive mode.
    fn listen(&mut self) -> Result<()>;
}
