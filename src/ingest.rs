// MIT License - Copyright (c) 2026 The lora-sentinel authors

//! Packet-ready latch and frame drain.
//!
//! The radio signals frame arrival from a wait thread by calling
//! [`PacketIngest::on_packet_ready`]; the coordinator drains at most one
//! frame per loop iteration with [`PacketIngest::drain`]. The latch carries
//! no payload, only the fact that something is pending.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, warn};

use crate::protocol::{decode_inbound, IncomingEvent};
use crate::transport::RadioLink;

#[derive(Debug, Default)]
pub struct PacketIngest {
    packet_received: AtomicBool,
}

impl PacketIngest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal that a frame is waiting. Safe to call from any thread.
    pub fn on_packet_ready(&self) {
        self.packet_received.store(true, Ordering::Release);
    }

    /// Consume the latch and pull one frame, if the latch was set.
    ///
    /// Frames that fail to decode are dropped here with a log line; the
    /// caller only ever sees well-formed events.
    pub fn drain(&self, radio: &mut dyn RadioLink, now: u64) -> Option<IncomingEvent> {
        if !self.packet_received.swap(false, Ordering::AcqRel) {
            return None;
        }

        let packet = match radio.receive() {
            Ok(Some(packet)) => packet,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "failed to read pending frame");
                return None;
            }
        };

        let payload = String::from_utf8_lossy(&packet.payload).into_owned();
        match decode_inbound(&payload) {
            Some(kind) => Some(IncomingEvent {
                kind,
                payload,
                rssi: packet.rssi,
                received_at: now,
            }),
            None => {
                debug!(%payload, rssi = packet.rssi, "dropping unrecognized frame");
                None
            }
        }
    }
}
