// MIT License - Copyright (c) 2026 The lora-sentinel authors

//! Uplink connectivity supervision.
//!
//! Polls the uplink monitor on a rate-limited schedule and, on a
//! connected-to-disconnected edge, drops the node into setup mode: the
//! local configuration access point comes up and normal packet processing
//! stops until the process is restarted with fresh credentials.

use tracing::{error, info, warn};

use crate::event::{EventSender, NodeEvent};
use crate::peripherals::{AccessPoint, ApConfig, Buzzer, LinkMonitor, SETUP_MODE_BEEP};

pub struct ConnectivitySupervisor {
    poll_interval_ms: u64,
    last_check: u64,
    was_connected: bool,
    in_setup_mode: bool,
    event_tx: EventSender,
}

impl ConnectivitySupervisor {
    pub fn new(poll_interval_ms: u64, event_tx: EventSender) -> Self {
        Self {
            poll_interval_ms,
            last_check: 0,
            was_connected: false,
            in_setup_mode: false,
            event_tx,
        }
    }

    pub fn in_setup_mode(&self) -> bool {
        self.in_setup_mode
    }

    /// Check the uplink if the poll interval elapsed; enter setup mode on
    /// a loss edge. Setup mode is terminal for this process lifetime.
    pub fn poll(
        &mut self,
        link: &mut dyn LinkMonitor,
        ap: &mut dyn AccessPoint,
        buzzer: &mut dyn Buzzer,
        now: u64,
    ) {
        if self.in_setup_mode {
            return;
        }
        if now.saturating_sub(self.last_check) < self.poll_interval_ms && self.last_check != 0 {
            return;
        }
        self.last_check = now;

        let connected = link.is_connected();
        if connected && !self.was_connected {
            info!("uplink connected");
        }
        if !connected && self.was_connected {
            warn!("uplink lost, falling back to setup mode");
            self.enter_setup_mode(ap, buzzer);
        }
        self.was_connected = connected;
    }

    /// Bring up the configuration access point. Called on a loss edge, or
    /// directly at boot when the stored credentials are incomplete.
    pub fn enter_setup_mode(&mut self, ap: &mut dyn AccessPoint, buzzer: &mut dyn Buzzer) {
        let config = ApConfig::setup_defaults();
        let ip = match ap.start(&config) {
            Ok(details) => {
                info!(ssid = config.ssid, ip = %details.ip, "setup access point up");
                details.ip
            }
            Err(e) => {
                // Setup mode is still entered so the node stops pretending
                // the uplink works; the operator sees the failure in logs.
                error!(error = %e, "failed to start setup access point");
                String::new()
            }
        };

        // The node stays in setup mode either way.
        self.in_setup_mode = true;
        buzzer.chirp(&SETUP_MODE_BEEP);
        let _ = self.event_tx.send(NodeEvent::SetupModeEntered {
            ssid: config.ssid,
            passphrase: config.passphrase,
            ip,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, SentinelError};
    use crate::event::event_channel;
    use crate::peripherals::{ApDetails, BeepPattern};

    struct MockLink {
        connected: bool,
    }

    impl LinkMonitor for MockLink {
        fn is_connected(&mut self) -> bool {
            self.connected
        }
    }

    #[derive(Default)]
    struct MockAp {
        starts: usize,
        fail: bool,
    }

    impl AccessPoint for MockAp {
        fn start(&mut self, config: &ApConfig) -> Result<ApDetails> {
            assert_eq!(config.ssid, crate::constants::SETUP_AP_SSID);
            self.starts += 1;
            if self.fail {
                return Err(SentinelError::AccessPoint {
                    reason: "driver rejected channel".to_string(),
                });
            }
            Ok(ApDetails {
                ip: "192.168.4.1".to_string(),
            })
        }
    }

    #[derive(Default)]
    struct MockBuzzer {
        chirps: Vec<BeepPattern>,
    }

    impl Buzzer for MockBuzzer {
        fn set_active(&mut self, _active: bool) {}

        fn chirp(&mut self, pattern: &BeepPattern) {
            self.chirps.push(*pattern);
        }
    }

    fn supervisor() -> (ConnectivitySupervisor, MockAp, MockBuzzer) {
        let (tx, _rx) = event_channel(16);
        (
            ConnectivitySupervisor::new(5_000, tx),
            MockAp::default(),
            MockBuzzer::default(),
        )
    }

    #[test]
    fn test_loss_edge_enters_setup_mode() {
        let (mut sup, mut ap, mut buzzer) = supervisor();
        let mut link = MockLink { connected: true };

        sup.poll(&mut link, &mut ap, &mut buzzer, 1);
        assert!(!sup.in_setup_mode());

        link.connected = false;
        sup.poll(&mut link, &mut ap, &mut buzzer, 6_000);
        assert!(sup.in_setup_mode());
        assert_eq!(ap.starts, 1);
        assert_eq!(buzzer.chirps, vec![SETUP_MODE_BEEP]);
    }

    #[test]
    fn test_poll_rate_limited() {
        let (mut sup, mut ap, mut buzzer) = supervisor();
        let mut link = MockLink { connected: true };

        sup.poll(&mut link, &mut ap, &mut buzzer, 1);
        link.connected = false;
        // Within the interval the loss is not yet observed.
        sup.poll(&mut link, &mut ap, &mut buzzer, 3_000);
        assert!(!sup.in_setup_mode());

        sup.poll(&mut link, &mut ap, &mut buzzer, 5_001);
        assert!(sup.in_setup_mode());
    }

    #[test]
    fn test_never_connected_is_not_a_loss() {
        let (mut sup, mut ap, mut buzzer) = supervisor();
        let mut link = MockLink { connected: false };

        sup.poll(&mut link, &mut ap, &mut buzzer, 1);
        sup.poll(&mut link, &mut ap, &mut buzzer, 10_000);
        assert!(!sup.in_setup_mode());
        assert_eq!(ap.starts, 0);
    }

    #[test]
    fn test_setup_mode_is_terminal() {
        let (mut sup, mut ap, mut buzzer) = supervisor();
        let mut link = MockLink { connected: true };

        sup.poll(&mut link, &mut ap, &mut buzzer, 1);
        link.connected = false;
        sup.poll(&mut link, &mut ap, &mut buzzer, 6_000);
        assert!(sup.in_setup_mode());

        // Uplink flapping back does not leave setup mode or restart the AP.
        link.connected = true;
        sup.poll(&mut link, &mut ap, &mut buzzer, 12_000);
        assert!(sup.in_setup_mode());
        assert_eq!(ap.starts, 1);
    }

    #[test]
    fn test_ap_failure_still_enters_setup_mode() {
        let (mut sup, mut ap, mut buzzer) = supervisor();
        ap.fail = true;
        sup.enter_setup_mode(&mut ap, &mut buzzer);
        assert!(sup.in_setup_mode());
        assert_eq!(buzzer.chirps.len(), 1);
    }
}
