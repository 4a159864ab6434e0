// MIT License - Copyright (c) 2026 The lora-sentinel authors

use crate::constants::{
    ALARM_TOGGLE_COUNT, ALARM_TOGGLE_MS, DEBOUNCE_DELAY_MS, LINK_POLL_INTERVAL_MS,
    LONG_PRESS_DELAY_MS, STATUS_INTERVAL_MS,
};

/// Tunables for the node coordinator.
///
/// Defaults match the deployed peer network; installations normally only
/// override these for bench testing.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Fixed receiver identity. Derived from the host identity when `None`.
    pub receiver_id: Option<String>,
    /// Minimum time between accepted raw button edges
    pub debounce_ms: u64,
    /// Hold duration that promotes a press to a long press
    pub long_press_ms: u64,
    /// Status heartbeat interval
    pub status_interval_ms: u64,
    /// Minimum time between uplink connectivity checks
    pub link_poll_interval_ms: u64,
    /// Buzzer toggle cadence during an alarm
    pub alarm_toggle_ms: u64,
    /// Buzzer toggles per alarm window
    pub alarm_toggle_count: u32,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            receiver_id: None,
            debounce_ms: DEBOUNCE_DELAY_MS,
            long_press_ms: LONG_PRESS_DELAY_MS,
            status_interval_ms: STATUS_INTERVAL_MS,
            link_poll_interval_ms: LINK_POLL_INTERVAL_MS,
            alarm_toggle_ms: ALARM_TOGGLE_MS,
            alarm_toggle_count: ALARM_TOGGLE_COUNT,
        }
    }
}

impl NodeConfig {
    /// Create a new config builder starting from defaults.
    pub fn builder() -> NodeConfigBuilder {
        NodeConfigBuilder::default()
    }
}

/// Builder for NodeConfig.
#[derive(Debug, Clone, Default)]
pub struct NodeConfigBuilder {
    config: NodeConfig,
}

impl NodeConfigBuilder {
    pub fn receiver_id(mut self, id: impl Into<String>) -> Self {
        self.config.receiver_id = Some(id.into());
        self
    }

    pub fn debounce_ms(mut self, ms: u64) -> Self {
        self.config.debounce_ms = ms;
        self
    }

    pub fn long_press_ms(mut self, ms: u64) -> Self {
        self.config.long_press_ms = ms;
        self
    }

    pub fn status_interval_ms(mut self, ms: u64) -> Self {
        self.config.status_interval_ms = ms;
        self
    }

    pub fn link_poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.link_poll_interval_ms = ms;
        self
    }

    pub fn alarm_toggle_ms(mut self, ms: u64) -> Self {
        self.config.alarm_toggle_ms = ms;
        self
    }

    pub fn alarm_toggle_count(mut self, count: u32) -> Self {
        self.config.alarm_toggle_count = count;
        self
    }

    pub fn build(self) -> NodeConfig {
        self.config
    }
}
