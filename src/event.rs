// MIT License - Copyright (c) 2026 The lora-sentinel authors

use crate::node::RestartKind;
use crate::status::SendKind;

/// All events emitted by the node coordinator.
///
/// Observers (display, dashboards, test harnesses) subscribe via
/// `node.subscribe()` and receive a
/// `tokio::sync::broadcast::Receiver<NodeEvent>`. The display collaborator
/// treats every event that changes what should be on screen as a redraw
/// request; `DisplayRefresh` is the explicit variant for the cases where
/// nothing else signals the change.
#[derive(Debug, Clone)]
pub enum NodeEvent {
    /// A confirmed motion event was decoded.
    MotionDetected {
        count: u64,
        rssi: i16,
        payload: String,
    },
    /// The alarm window opened.
    AlarmStarted,
    /// The alarm window closed and the node is ready again.
    AlarmCleared,
    /// A status message went out to the peer.
    StatusSent {
        kind: SendKind,
        busy: bool,
        alarm: bool,
        ready: bool,
    },
    /// The main display should redraw.
    DisplayRefresh,
    /// The uplink was lost and the local configuration network is up.
    SetupModeEntered {
        ssid: &'static str,
        passphrase: &'static str,
        ip: String,
    },
    /// A restart was requested; no further iterations will run.
    RestartRequested { kind: RestartKind },
}

/// Type alias for the broadcast sender.
pub type EventSender = tokio::sync::broadcast::Sender<NodeEvent>;

/// Type alias for the broadcast receiver.
pub type EventReceiver = tokio::sync::broadcast::Receiver<NodeEvent>;

/// Create a new event channel with the given capacity.
pub fn event_channel(capacity: usize) -> (EventSender, EventReceiver) {
    tokio::sync::broadcast::channel(capacity)
}
