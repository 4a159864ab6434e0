// MIT License - Copyright (c) 2026 The lora-sentinel authors

//! Trait seams for everything the coordinator drives but does not own:
//! the buzzer, the setup access point, the uplink monitor and the motion
//! notifier. Production implementations live in the binary; the tests
//! substitute mocks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::Result;

/// A fixed chirp sequence: `count` beeps of `on_ms` separated by `off_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeepPattern {
    pub on_ms: u64,
    pub off_ms: u64,
    pub count: u32,
}

/// Played before a plain restart.
pub const RESTART_BEEP: BeepPattern = BeepPattern {
    on_ms: 200,
    off_ms: 100,
    count: 3,
};

/// Played before a factory reset wipes the stored configuration.
pub const CONFIG_RESET_BEEP: BeepPattern = BeepPattern {
    on_ms: 150,
    off_ms: 150,
    count: 3,
};

/// Played when the node falls back to the setup access point.
pub const SETUP_MODE_BEEP: BeepPattern = BeepPattern {
    on_ms: 100,
    off_ms: 100,
    count: 5,
};

/// The audible alarm output.
pub trait Buzzer: Send {
    /// Drive the output level directly. Used by the alarm toggle cadence.
    fn set_active(&mut self, active: bool);

    /// Play a short feedback pattern, blocking until it finishes.
    fn chirp(&mut self, pattern: &BeepPattern);
}

/// Parameters for the setup access point.
#[derive(Debug, Clone)]
pub struct ApConfig {
    pub ssid: &'static str,
    pub passphrase: &'static str,
    pub channel: u8,
    pub hidden: bool,
    pub max_clients: u8,
}

impl ApConfig {
    /// The fixed setup network the operator's tooling looks for.
    pub fn setup_defaults() -> Self {
        Self {
            ssid: crate::constants::SETUP_AP_SSID,
            passphrase: crate::constants::SETUP_AP_PASSPHRASE,
            channel: crate::constants::SETUP_AP_CHANNEL,
            hidden: crate::constants::SETUP_AP_HIDDEN,
            max_clients: crate::constants::SETUP_AP_MAX_CLIENTS,
        }
    }
}

/// What the access point reports once it is up.
#[derive(Debug, Clone)]
pub struct ApDetails {
    /// Address the configuration portal is reachable on.
    pub ip: String,
}

/// The local configuration network.
pub trait AccessPoint: Send {
    fn start(&mut self, config: &ApConfig) -> Result<ApDetails>;
}

/// Answers "is the uplink alive right now".
pub trait LinkMonitor: Send {
    fn is_connected(&mut self) -> bool;
}

/// Uplink status fed asynchronously (e.g. from a broker event loop) and
/// read synchronously by the connectivity supervisor.
#[derive(Debug, Clone, Default)]
pub struct SharedLinkStatus(Arc<AtomicBool>);

impl SharedLinkStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_connected(&self, connected: bool) {
        self.0.store(connected, Ordering::Release);
    }
}

impl LinkMonitor for SharedLinkStatus {
    fn is_connected(&mut self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// A confirmed motion event, packaged for external notification.
#[derive(Debug, Clone)]
pub struct MotionAlert {
    pub count: u64,
    pub rssi: i16,
    pub payload: String,
    pub uptime_ms: u64,
}

/// Pushes motion alerts to the outside world.
pub trait Notifier: Send {
    fn notify_motion(&mut self, alert: &MotionAlert) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_ap_defaults() {
        let config = ApConfig::setup_defaults();
        assert_eq!(config.ssid, "LoRa-Security-WIFI-MANAGER");
        assert_eq!(config.passphrase, "LoRa1234");
        assert_eq!(config.channel, 1);
        assert!(!config.hidden);
        assert_eq!(config.max_clients, 4);
    }

    #[test]
    fn test_shared_link_status() {
        let status = SharedLinkStatus::new();
        let mut reader = status.clone();
        assert!(!reader.is_connected());
        status.set_connected(true);
        assert!(reader.is_connected());
        status.set_connected(false);
        assert!(!reader.is_connected());
    }
}
