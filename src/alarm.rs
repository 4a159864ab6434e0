// MIT License - Copyright (c) 2026 The lora-sentinel authors

//! Alarm state machine.
//!
//! A confirmed motion event opens a fixed alarm window during which the
//! buzzer toggles on a deadline schedule; nothing blocks. When the window
//! closes the machine dispatches the external notification, busy-bracketed
//! so the peer sees the node as occupied during the push, then returns the
//! node to ready.

use tracing::{info, warn};

use crate::event::{EventSender, NodeEvent};
use crate::peripherals::{Buzzer, MotionAlert, Notifier};
use crate::protocol::IncomingEvent;
use crate::state::NodeState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Sounding {
        next_toggle_at: u64,
        toggles_done: u32,
        buzzer_on: bool,
    },
}

pub struct AlarmStateMachine {
    toggle_ms: u64,
    toggle_count: u32,
    phase: Phase,
    event_tx: EventSender,
}

impl AlarmStateMachine {
    pub fn new(toggle_ms: u64, toggle_count: u32, event_tx: EventSender) -> Self {
        Self {
            toggle_ms,
            toggle_count,
            phase: Phase::Idle,
            event_tx,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    /// Open the alarm window for a confirmed motion event.
    ///
    /// Callers guarantee the machine is idle; new events are not drained
    /// while an alarm is sounding.
    pub fn trigger(
        &mut self,
        state: &mut NodeState,
        event: &IncomingEvent,
        buzzer: &mut dyn Buzzer,
        now: u64,
    ) {
        state.motion_count += 1;
        state.last_rssi = event.rssi;
        state.last_message = event.payload.clone();
        state.alarm_active = true;
        state.is_ready = false;

        info!(
            count = state.motion_count,
            rssi = event.rssi,
            "motion detected, alarm started"
        );

        buzzer.set_active(true);
        // The initial on counts as the first toggle.
        self.phase = Phase::Sounding {
            next_toggle_at: now + self.toggle_ms,
            toggles_done: 1,
            buzzer_on: true,
        };

        let _ = self.event_tx.send(NodeEvent::MotionDetected {
            count: state.motion_count,
            rssi: event.rssi,
            payload: event.payload.clone(),
        });
        let _ = self.event_tx.send(NodeEvent::AlarmStarted);
        let _ = self.event_tx.send(NodeEvent::DisplayRefresh);
    }

    /// Advance the alarm window. A no-op while idle.
    ///
    /// Toggle deadlines are absolute, so a late iteration catches up on
    /// missed toggles instead of stretching the window.
    pub fn tick(
        &mut self,
        state: &mut NodeState,
        buzzer: &mut dyn Buzzer,
        notifier: &mut dyn Notifier,
        now: u64,
    ) {
        let Phase::Sounding {
            mut next_toggle_at,
            mut toggles_done,
            mut buzzer_on,
        } = self.phase
        else {
            return;
        };

        let mut flipped = false;
        while now >= next_toggle_at && toggles_done < self.toggle_count {
            buzzer_on = !buzzer_on;
            toggles_done += 1;
            next_toggle_at += self.toggle_ms;
            flipped = true;
        }

        if toggles_done >= self.toggle_count {
            self.retire(state, buzzer, notifier, now);
            return;
        }

        if flipped {
            buzzer.set_active(buzzer_on);
        }
        self.phase = Phase::Sounding {
            next_toggle_at,
            toggles_done,
            buzzer_on,
        };
    }

    fn retire(
        &mut self,
        state: &mut NodeState,
        buzzer: &mut dyn Buzzer,
        notifier: &mut dyn Notifier,
        now: u64,
    ) {
        buzzer.set_active(false);
        self.phase = Phase::Idle;

        // Busy-bracket the notification push so a status send racing it
        // reports the node as occupied rather than ready.
        state.is_busy = true;
        state.is_ready = false;
        let alert = MotionAlert {
            count: state.motion_count,
            rssi: state.last_rssi,
            payload: state.last_message.clone(),
            uptime_ms: now,
        };
        if let Err(e) = notifier.notify_motion(&alert) {
            warn!(error = %e, count = alert.count, "motion notification failed");
        }
        state.is_busy = false;

        state.alarm_active = false;
        state.is_ready = true;
        state.status_changed = true;

        info!(count = state.motion_count, "alarm window closed");
        let _ = self.event_tx.send(NodeEvent::AlarmCleared);
        let _ = self.event_tx.send(NodeEvent::DisplayRefresh);
    }
}
