// MIT License - Copyright (c) 2026 The lora-sentinel authors

//! Wire tags, setup-network parameters and timing defaults.
//!
//! The values here are part of the contract with the peer transmitter and
//! with the operator; they are not tunables. Anything an installation may
//! legitimately change lives in [`NodeConfig`](crate::config::NodeConfig).

/// Wire tag of an inbound motion announcement.
pub const MSG_TYPE_MOTION: &str = "MOTION";

/// Wire tag of the outbound status message.
pub const MSG_TYPE_STATUS: &str = "STATUS";

/// Prefix of the derived receiver identity (`RX-` + 6 hex chars).
pub const RECEIVER_ID_PREFIX: &str = "RX-";

// --- Setup (local configuration) access point -----------------------------
//
// Fixed credentials: the peer expecting to reconfigure the node must be able
// to find it without any prior state.

pub const SETUP_AP_SSID: &str = "LoRa-Security-WIFI-MANAGER";
pub const SETUP_AP_PASSPHRASE: &str = "LoRa1234";
pub const SETUP_AP_CHANNEL: u8 = 1;
pub const SETUP_AP_HIDDEN: bool = false;
pub const SETUP_AP_MAX_CLIENTS: u8 = 4;

// --- Timing defaults (milliseconds) ---------------------------------------

/// Minimum time between accepted raw edges on the button input.
pub const DEBOUNCE_DELAY_MS: u64 = 50;

/// Hold duration at which a press is promoted to a long press.
pub const LONG_PRESS_DELAY_MS: u64 = 2_000;

/// Heartbeat interval for the status broadcast.
pub const STATUS_INTERVAL_MS: u64 = 30_000;

/// Minimum time between uplink connectivity checks.
pub const LINK_POLL_INTERVAL_MS: u64 = 5_000;

/// Buzzer toggle cadence during an active alarm.
pub const ALARM_TOGGLE_MS: u64 = 100;

/// Number of buzzer toggles per alarm cycle (200 x 100 ms = 20 s).
pub const ALARM_TOGGLE_COUNT: u32 = 200;
