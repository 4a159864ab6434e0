// MIT License - Copyright (c) 2026 The lora-sentinel authors

//! The node coordinator.
//!
//! [`Node`] owns the state aggregate and all the collaborators, and wires
//! them together in a fixed per-iteration order: button, connectivity,
//! packet intake or alarm advance, status broadcast. The binary drives
//! [`Node::tick`] on a short cadence and supplies the wall-free millisecond
//! clock; nothing in here reads time on its own.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::alarm::AlarmStateMachine;
use crate::button::{ButtonAction, ButtonDebouncer};
use crate::config::NodeConfig;
use crate::event::{event_channel, EventReceiver, EventSender, NodeEvent};
use crate::ingest::PacketIngest;
use crate::peripherals::{AccessPoint, Buzzer, LinkMonitor, Notifier, CONFIG_RESET_BEEP, RESTART_BEEP};
use crate::protocol::InboundKind;
use crate::state::{derive_receiver_id, NodeState};
use crate::status::StatusBroadcaster;
use crate::storage::ConfigStore;
use crate::supervisor::ConnectivitySupervisor;
use crate::transport::RadioLink;

/// What kind of restart the button requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartKind {
    /// Plain restart, stored configuration untouched.
    Plain,
    /// Stored credentials wiped before restarting.
    FactoryReset,
}

/// Result of one loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    /// Stop iterating and let the process supervisor restart us.
    Restart(RestartKind),
}

/// Everything the coordinator drives but does not implement.
pub struct Peripherals {
    pub radio: Box<dyn RadioLink>,
    pub link: Box<dyn LinkMonitor>,
    pub access_point: Box<dyn AccessPoint>,
    pub buzzer: Box<dyn Buzzer>,
    pub notifier: Box<dyn Notifier>,
    pub store: Box<dyn ConfigStore>,
}

pub struct Node {
    state: NodeState,
    button: Arc<ButtonDebouncer>,
    ingest: Arc<PacketIngest>,
    alarm: AlarmStateMachine,
    broadcaster: StatusBroadcaster,
    supervisor: ConnectivitySupervisor,
    peripherals: Peripherals,
    event_tx: EventSender,
}

impl Node {
    pub fn new(config: &NodeConfig, peripherals: Peripherals) -> Self {
        let (event_tx, _) = event_channel(64);

        let receiver_id = config
            .receiver_id
            .clone()
            .unwrap_or_else(derive_receiver_id);
        info!(%receiver_id, "node coordinator starting");

        let mut state = NodeState::new(receiver_id);
        state.status_interval_ms = config.status_interval_ms;

        Self {
            state,
            button: Arc::new(ButtonDebouncer::new(config.debounce_ms, config.long_press_ms)),
            ingest: Arc::new(PacketIngest::new()),
            alarm: AlarmStateMachine::new(
                config.alarm_toggle_ms,
                config.alarm_toggle_count,
                event_tx.clone(),
            ),
            broadcaster: StatusBroadcaster::new(event_tx.clone()),
            supervisor: ConnectivitySupervisor::new(config.link_poll_interval_ms, event_tx.clone()),
            peripherals,
            event_tx,
        }
    }

    /// Subscribe to the event stream.
    pub fn subscribe(&self) -> EventReceiver {
        self.event_tx.subscribe()
    }

    pub fn state(&self) -> &NodeState {
        &self.state
    }

    /// Edge-side handle for the button watcher.
    pub fn button(&self) -> Arc<ButtonDebouncer> {
        Arc::clone(&self.button)
    }

    /// Edge-side handle for the radio wait thread.
    pub fn ingest(&self) -> Arc<PacketIngest> {
        Arc::clone(&self.ingest)
    }

    pub fn in_setup_mode(&self) -> bool {
        self.supervisor.in_setup_mode()
    }

    /// Go straight to setup mode. Used at boot when the stored credentials
    /// are incomplete.
    pub fn enter_setup_mode(&mut self) {
        self.supervisor.enter_setup_mode(
            self.peripherals.access_point.as_mut(),
            self.peripherals.buzzer.as_mut(),
        );
    }

    /// One loop iteration at uptime `now`.
    pub fn tick(&mut self, now: u64) -> TickOutcome {
        if let Some(action) = self.button.poll(now) {
            match self.handle_button(action) {
                TickOutcome::Continue => {}
                restart => return restart,
            }
        }

        self.supervisor.poll(
            self.peripherals.link.as_mut(),
            self.peripherals.access_point.as_mut(),
            self.peripherals.buzzer.as_mut(),
            now,
        );
        if self.supervisor.in_setup_mode() {
            // Setup mode halts packet processing and status broadcast;
            // only a restart leaves it.
            return TickOutcome::Continue;
        }

        if self.alarm.is_idle() {
            if let Some(event) = self
                .ingest
                .drain(self.peripherals.radio.as_mut(), now)
            {
                match event.kind {
                    InboundKind::Motion {} => {
                        self.alarm.trigger(
                            &mut self.state,
                            &event,
                            self.peripherals.buzzer.as_mut(),
                            now,
                        );
                    }
                }
            }
        } else {
            self.alarm.tick(
                &mut self.state,
                self.peripherals.buzzer.as_mut(),
                self.peripherals.notifier.as_mut(),
                now,
            );
        }

        self.broadcaster
            .maybe_send(&mut self.state, self.peripherals.radio.as_mut(), now);

        debug_assert!(self.state.is_consistent());
        TickOutcome::Continue
    }

    fn handle_button(&mut self, action: ButtonAction) -> TickOutcome {
        match action {
            ButtonAction::ShortPressReleased => {
                info!("restart requested by button");
                self.peripherals.buzzer.chirp(&RESTART_BEEP);
                let _ = self.event_tx.send(NodeEvent::RestartRequested {
                    kind: RestartKind::Plain,
                });
                TickOutcome::Restart(RestartKind::Plain)
            }
            ButtonAction::LongPressTriggered => {
                warn!("factory reset requested by button, wiping stored credentials");
                self.peripherals.buzzer.chirp(&CONFIG_RESET_BEEP);
                if let Err(e) = self.peripherals.store.clear_all() {
                    warn!(error = %e, "failed to clear stored credentials");
                }
                let _ = self.event_tx.send(NodeEvent::RestartRequested {
                    kind: RestartKind::FactoryReset,
                });
                TickOutcome::Restart(RestartKind::FactoryReset)
            }
            ButtonAction::LongPressReleased => {
                debug!("button released after long press");
                TickOutcome::Continue
            }
        }
    }
}
