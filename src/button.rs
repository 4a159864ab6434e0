// MIT License - Copyright (c) 2026 The lora-sentinel authors

//! Debounced restart/reset button.
//!
//! Raw edges arrive from an interrupt-style context (a signal handler or a
//! watcher thread) via [`ButtonDebouncer::on_edge`]; the coordinator calls
//! [`ButtonDebouncer::poll`] once per loop iteration and reacts to the
//! classified action. Everything is atomics so the edge side needs only a
//! shared reference.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Classified button activity, at most one per poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    /// Released before the long-press threshold.
    ShortPressReleased,
    /// Held past the long-press threshold. Fires exactly once per press,
    /// while still held when possible, otherwise on release.
    LongPressTriggered,
    /// Released after the long press already fired.
    LongPressReleased,
}

/// Debounces raw edges and classifies presses as short or long.
///
/// The edge path is lock-free: it records the press/release timestamps and
/// leaves all interpretation to `poll`, mirroring how an ISR only stamps
/// state and the main loop does the work.
#[derive(Debug)]
pub struct ButtonDebouncer {
    debounce_ms: u64,
    long_press_ms: u64,
    /// Timestamp of the last accepted edge.
    last_edge_ms: AtomicU64,
    /// Whether the button is currently held down.
    pressed: AtomicBool,
    /// Timestamp of the falling edge that started the current press.
    press_start: AtomicU64,
    /// A release happened that `poll` has not consumed yet.
    pending_release: AtomicBool,
    /// The long-press action already fired for the current press.
    long_fired: AtomicBool,
}

impl ButtonDebouncer {
    pub fn new(debounce_ms: u64, long_press_ms: u64) -> Self {
        Self {
            debounce_ms,
            long_press_ms,
            last_edge_ms: AtomicU64::new(0),
            pressed: AtomicBool::new(false),
            press_start: AtomicU64::new(0),
            pending_release: AtomicBool::new(false),
            long_fired: AtomicBool::new(false),
        }
    }

    /// Record a raw edge. `active` is true for a falling edge (button down).
    ///
    /// Edges arriving within the debounce window of the last accepted edge
    /// are discarded, as are edges that do not change the held state.
    pub fn on_edge(&self, active: bool, now: u64) {
        let last = self.last_edge_ms.load(Ordering::Acquire);
        if now.saturating_sub(last) < self.debounce_ms && last != 0 {
            return;
        }
        if self.pressed.load(Ordering::Acquire) == active {
            return;
        }
        self.last_edge_ms.store(now, Ordering::Release);

        if active {
            self.press_start.store(now, Ordering::Release);
            self.long_fired.store(false, Ordering::Release);
            self.pressed.store(true, Ordering::Release);
        } else {
            self.pressed.store(false, Ordering::Release);
            self.pending_release.store(true, Ordering::Release);
        }
    }

    /// Classify the press in progress, if anything changed since last poll.
    pub fn poll(&self, now: u64) -> Option<ButtonAction> {
        // Promote a still-held press the moment it crosses the threshold.
        if self.pressed.load(Ordering::Acquire) && !self.long_fired.load(Ordering::Acquire) {
            let start = self.press_start.load(Ordering::Acquire);
            if now.saturating_sub(start) >= self.long_press_ms {
                self.long_fired.store(true, Ordering::Release);
                return Some(ButtonAction::LongPressTriggered);
            }
        }

        if self.pending_release.swap(false, Ordering::AcqRel) {
            let start = self.press_start.load(Ordering::Acquire);
            let held = self.last_edge_ms.load(Ordering::Acquire).saturating_sub(start);
            if self.long_fired.load(Ordering::Acquire) {
                return Some(ButtonAction::LongPressReleased);
            }
            if held < self.long_press_ms {
                return Some(ButtonAction::ShortPressReleased);
            }
            // Held past the threshold but released before any poll saw the
            // hold: the long press still fires, exactly once.
            self.long_fired.store(true, Ordering::Release);
            return Some(ButtonAction::LongPressTriggered);
        }

        None
    }
}
