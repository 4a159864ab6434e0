// MIT License - Copyright (c) 2026 The lora-sentinel authors

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use bitflags::bitflags;

use crate::constants::{RECEIVER_ID_PREFIX, STATUS_INTERVAL_MS};

bitflags! {
    /// The three externally observable status flags, packed for
    /// change detection against the last-sent shadow copy.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StatusFlags: u8 {
        const BUSY  = 0b001;
        const ALARM = 0b010;
        const READY = 0b100;
    }
}

impl StatusFlags {
    /// Flags that differ between two snapshots.
    pub fn changed(old: Self, new: Self) -> Self {
        old ^ new
    }

    /// Human-readable names of the set flags, for send logging.
    pub fn names(self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.contains(Self::BUSY) {
            names.push("busy");
        }
        if self.contains(Self::ALARM) {
            names.push("alarm");
        }
        if self.contains(Self::READY) {
            names.push("ready");
        }
        names
    }
}

/// The single mutable aggregate shared by the coordination core.
///
/// Owned by the node coordinator, mutated by the alarm state machine and
/// the status broadcaster, read by everything else. No component holds a
/// second long-lived copy; they all borrow this one.
///
/// Invariant: `is_ready == !is_busy && !alarm_active` at every externally
/// observable point (end of each loop iteration and around each status
/// send). See [`NodeState::is_consistent`].
#[derive(Debug, Clone)]
pub struct NodeState {
    /// Monotonically increasing count of confirmed motion events.
    /// Never decreases; resets only with the process.
    pub motion_count: u64,
    /// Signal strength of the most recent decoded event (dBm).
    pub last_rssi: i16,
    /// Raw payload of the most recent decoded event.
    pub last_message: String,

    pub alarm_active: bool,
    pub is_busy: bool,
    pub is_ready: bool,

    /// Derived once at startup from a host identity; immutable afterwards.
    pub receiver_id: String,

    /// Heartbeat interval for the status broadcast.
    pub status_interval_ms: u64,
    /// Uptime timestamp of the last successful status send.
    pub last_status_sent: u64,

    /// Shadow copy of the flags as of the last successful send. Updated
    /// only by the status broadcaster, immediately after that send.
    pub last_sent_flags: StatusFlags,
    /// Explicit request for an immediate broadcast, set by components that
    /// want a send even if the flag comparison alone would not trigger one.
    pub status_changed: bool,
}

impl NodeState {
    pub fn new(receiver_id: String) -> Self {
        Self {
            motion_count: 0,
            last_rssi: 0,
            last_message: String::new(),
            alarm_active: false,
            is_busy: false,
            is_ready: true,
            receiver_id,
            status_interval_ms: STATUS_INTERVAL_MS,
            last_status_sent: 0,
            last_sent_flags: StatusFlags::READY,
            status_changed: false,
        }
    }

    /// Current flags, packed.
    pub fn flags(&self) -> StatusFlags {
        let mut flags = StatusFlags::empty();
        if self.is_busy {
            flags |= StatusFlags::BUSY;
        }
        if self.alarm_active {
            flags |= StatusFlags::ALARM;
        }
        if self.is_ready {
            flags |= StatusFlags::READY;
        }
        flags
    }

    /// Whether the ready invariant holds.
    pub fn is_consistent(&self) -> bool {
        self.is_ready == (!self.is_busy && !self.alarm_active)
    }
}

/// Derive the receiver identity from a host identity: `RX-` plus six
/// uppercase hex characters.
///
/// Prefers the machine id, falls back to the hostname, and as a last
/// resort hashes the process id so the function is infallible.
pub fn derive_receiver_id() -> String {
    let identity = std::fs::read_to_string("/etc/machine-id")
        .map(|s| s.trim().to_string())
        .ok()
        .filter(|s| !s.is_empty())
        .or_else(|| std::env::var("HOSTNAME").ok().filter(|s| !s.is_empty()))
        .unwrap_or_else(|| format!("pid-{}", std::process::id()));

    let mut hasher = DefaultHasher::new();
    identity.hash(&mut hasher);
    format!("{}{:06X}", RECEIVER_ID_PREFIX, hasher.finish() & 0xFF_FFFF)
}
