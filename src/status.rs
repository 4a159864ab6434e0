// MIT License - Copyright (c) 2026 The lora-sentinel authors

//! Periodic and change-driven status broadcast to the peer transmitter.

use tracing::{error, info};

use crate::event::{EventSender, NodeEvent};
use crate::protocol::StatusMessage;
use crate::state::{NodeState, StatusFlags};
use crate::transport::RadioLink;

/// Why a status message went out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendKind {
    /// A flag changed (or a component asked for an immediate send).
    Change,
    /// The heartbeat interval elapsed with nothing changed.
    Heartbeat,
}

/// What one broadcast attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Sent(SendKind),
    /// Nothing changed and the heartbeat is not due.
    Skipped,
    /// A send was due but the radio refused it; state was not advanced, so
    /// the same send is re-attempted next iteration.
    Failed,
}

pub struct StatusBroadcaster {
    event_tx: EventSender,
}

impl StatusBroadcaster {
    pub fn new(event_tx: EventSender) -> Self {
        Self { event_tx }
    }

    /// Send a status message if a flag changed since the last successful
    /// send or the heartbeat is due. Sends on change take priority over
    /// heartbeats when both apply.
    ///
    /// The radio is re-armed for reception after every send attempt,
    /// successful or not.
    pub fn maybe_send(
        &self,
        state: &mut NodeState,
        radio: &mut dyn RadioLink,
        now: u64,
    ) -> SendOutcome {
        let flags = state.flags();
        let changed = flags != state.last_sent_flags || state.status_changed;
        let heartbeat_due =
            now.saturating_sub(state.last_status_sent) >= state.status_interval_ms;

        let kind = if changed {
            SendKind::Change
        } else if heartbeat_due {
            SendKind::Heartbeat
        } else {
            return SendOutcome::Skipped;
        };

        let encoded = match StatusMessage::from_state(state, now).encode() {
            Ok(encoded) => encoded,
            Err(e) => {
                error!(error = %e, "failed to encode status message");
                return SendOutcome::Failed;
            }
        };

        let sent = radio.send(encoded.as_bytes());
        if let Err(e) = radio.listen() {
            error!(error = %e, "failed to re-arm radio after status send");
        }

        match sent {
            Ok(()) => {
                match kind {
                    SendKind::Change => {
                        let diff = StatusFlags::changed(state.last_sent_flags, flags);
                        info!(
                            changed = ?diff.names(),
                            busy = state.is_busy,
                            alarm = state.alarm_active,
                            ready = state.is_ready,
                            "status sent (change)"
                        );
                    }
                    SendKind::Heartbeat => {
                        info!(
                            busy = state.is_busy,
                            alarm = state.alarm_active,
                            ready = state.is_ready,
                            "status sent (heartbeat)"
                        );
                    }
                }
                state.last_sent_flags = flags;
                state.status_changed = false;
                state.last_status_sent = now;
                let _ = self.event_tx.send(NodeEvent::StatusSent {
                    kind,
                    busy: state.is_busy,
                    alarm: state.alarm_active,
                    ready: state.is_ready,
                });
                SendOutcome::Sent(kind)
            }
            Err(e) => {
                error!(error = %e, "status send failed");
                SendOutcome::Failed
            }
        }
    }
}
