// MIT License - Copyright (c) 2026 The lora-sentinel authors

use std::time::Instant;

/// Monotonic millisecond counter, anchored at construction.
///
/// Every duration in the coordination core is a comparison of `u64`
/// millisecond snapshots taken from one of these; the components never read
/// the clock themselves, which keeps them deterministic under test. The
/// reading doubles as the node uptime reported in status messages.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }

    /// Milliseconds since the clock was created.
    pub fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Format an uptime given in seconds as `12s`, `3m 4s` or `5h 42m`.
pub fn format_uptime(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic() {
        let clock = MonotonicClock::new();
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(b >= a);
    }

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(42), "42s");
        assert_eq!(format_uptime(60), "1m 0s");
        assert_eq!(format_uptime(125), "2m 5s");
        assert_eq!(format_uptime(3600), "1h 0m");
        assert_eq!(format_uptime(7322), "2h 2m");
    }
}
