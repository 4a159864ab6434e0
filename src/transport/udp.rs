// MIT License - Copyright (c) 2026 The lora-sentinel authors

//! UDP-backed radio link.
//!
//! The LoRa modem is reached through a datagram bridge: one UDP datagram is
//! one radio frame. [`UdpRadio`] is the non-blocking data path used by the
//! coordinator; [`RadioIrq`] is a second handle to the same socket that a
//! dedicated thread polls to deliver the packet-ready signal, the way a DIO
//! interrupt line would. Both handles stay non-blocking: they share one
//! file description, so a mode change on either would leak into the
//! coordinator's data path.

use std::io::ErrorKind;
use std::net::UdpSocket;
use std::time::Duration;

use tracing::debug;

use crate::error::{Result, SentinelError};
use crate::transport::{RadioLink, ReceivedPacket};

const MAX_FRAME: usize = 512;

/// Signal strength placeholder: the datagram bridge does not report one.
const BRIDGE_RSSI: i16 = -50;

/// Pacing of the frame-arrival watcher between peeks.
const IRQ_POLL_MS: u64 = 20;

pub struct UdpRadio {
    socket: UdpSocket,
    listening: bool,
}

impl UdpRadio {
    /// Bind the local end and connect to the bridge peer.
    pub fn bind(local: &str, peer: &str) -> Result<Self> {
        let socket = UdpSocket::bind(local)?;
        socket.connect(peer)?;
        socket.set_nonblocking(true)?;
        debug!(%local, %peer, "radio bridge socket bound");
        Ok(Self {
            socket,
            listening: true,
        })
    }

    /// A second handle to the same socket for the wait thread. The clone
    /// must not change blocking mode or timeouts: those live on the shared
    /// file description and would stall [`UdpRadio::receive`].
    pub fn irq_handle(&self) -> Result<RadioIrq> {
        Ok(RadioIrq {
            socket: self.socket.try_clone()?,
        })
    }
}

impl RadioLink for UdpRadio {
    fn receive(&mut self) -> Result<Option<ReceivedPacket>> {
        if !self.listening {
            return Ok(None);
        }
        let mut buf = [0u8; MAX_FRAME];
        match self.socket.recv(&mut buf) {
            Ok(n) => Ok(Some(ReceivedPacket {
                payload: buf[..n].to_vec(),
                rssi: BRIDGE_RSSI,
            })),
            Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(SentinelError::Radio {
                details: format!("receive failed: {}", e),
            }),
        }
    }

    fn send(&mut self, payload: &[u8]) -> Result<()> {
        self.listening = false;
        let sent = self.socket.send(payload).map_err(|e| SentinelError::Radio {
            details: format!("send failed: {}", e),
        })?;
        if sent != payload.len() {
            return Err(SentinelError::Radio {
                details: format!("short send: {} of {} bytes", sent, payload.len()),
            });
        }
        Ok(())
    }

    fn listen(&mut self) -> Result<()> {
        self.listening = true;
        Ok(())
    }
}

/// Companion handle used by the packet-ready wait thread.
pub struct RadioIrq {
    socket: UdpSocket,
}

impl RadioIrq {
    /// Poll for a pending frame: true when one is queued.
    ///
    /// Peeks non-blockingly without consuming — the frame stays queued for
    /// [`UdpRadio::receive`] on the coordinator side — then sleeps one poll
    /// interval so the watcher thread never spins, even while a latched
    /// frame waits out an alarm window.
    pub fn wait(&self) -> bool {
        let mut buf = [0u8; 1];
        let pending = match self.socket.peek(&mut buf) {
            Ok(_) => true,
            Err(e) if e.kind() == ErrorKind::WouldBlock => false,
            Err(e) => {
                debug!(error = %e, "radio wait failed");
                false
            }
        };
        std::thread::sleep(Duration::from_millis(IRQ_POLL_MS));
        pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_receive_over_loopback() {
        let peer = UdpSocket::bind("127.0.0.1:0").unwrap();
        let peer_addr = peer.local_addr().unwrap();

        let mut radio = UdpRadio::bind("127.0.0.1:0", &peer_addr.to_string()).unwrap();
        let radio_addr = radio.socket.local_addr().unwrap();
        peer.connect(radio_addr).unwrap();

        radio.send(b"{\"type\":\"STATUS\"}").unwrap();
        radio.listen().unwrap();

        let mut buf = [0u8; 64];
        let n = peer.recv(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"{\"type\":\"STATUS\"}");

        peer.send(b"{\"type\":\"MOTION\"}").unwrap();
        // Non-blocking receive may race the loopback delivery.
        let mut got = None;
        for _ in 0..50 {
            if let Some(pkt) = radio.receive().unwrap() {
                got = Some(pkt);
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        let pkt = got.expect("frame not delivered");
        assert_eq!(pkt.payload, b"{\"type\":\"MOTION\"}");
    }

    #[test]
    fn test_receive_empty_when_idle() {
        let mut radio = UdpRadio::bind("127.0.0.1:0", "127.0.0.1:9").unwrap();
        assert!(radio.receive().unwrap().is_none());
    }

    #[test]
    fn test_receive_stays_nonblocking_after_irq_handle() {
        let mut radio = UdpRadio::bind("127.0.0.1:0", "127.0.0.1:9").unwrap();
        let _irq = radio.irq_handle().unwrap();

        // The handles share one file description; the clone must not have
        // flipped it to blocking.
        let start = std::time::Instant::now();
        assert!(radio.receive().unwrap().is_none());
        assert!(
            start.elapsed() < Duration::from_millis(100),
            "receive() blocked for {:?} on an empty queue",
            start.elapsed()
        );
    }

    #[test]
    fn test_wait_signals_without_consuming() {
        let peer = UdpSocket::bind("127.0.0.1:0").unwrap();
        let peer_addr = peer.local_addr().unwrap();

        let mut radio = UdpRadio::bind("127.0.0.1:0", &peer_addr.to_string()).unwrap();
        let radio_addr = radio.socket.local_addr().unwrap();
        peer.connect(radio_addr).unwrap();
        let irq = radio.irq_handle().unwrap();

        peer.send(b"{\"type\":\"MOTION\"}").unwrap();
        let mut signaled = false;
        for _ in 0..50 {
            if irq.wait() {
                signaled = true;
                break;
            }
        }
        assert!(signaled, "pending frame never signaled");

        // The peek left the frame queued for the data path.
        let pkt = radio.receive().unwrap().expect("frame was consumed by wait");
        assert_eq!(pkt.payload, b"{\"type\":\"MOTION\"}");
    }
}
