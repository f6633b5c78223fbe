//! Reload debouncing.

use std::sync::Arc;
use std::time::Duration;

/// Millisecond clock, injectable so tests can drive time by hand.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Current time in epoch milliseconds.
    fn now_ms(&self) -> i64;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Shared clock handle.
pub type SharedClock = Arc<dyn Clock>;

/// Suppresses repeat full reloads inside a fixed window.
///
/// The window starts when a reload is admitted, not when it completes, so a
/// second reload shortly after the first finishes is still suppressed.
/// Pagination requests bypass the throttle entirely.
#[derive(Debug)]
pub struct Throttle {
    window_ms: i64,
    last_admitted: Option<i64>,
}

impl Throttle {
    /// Create a throttle with the given window.
    pub fn new(window: Duration) -> Self {
        Self {
            window_ms: window.as_millis() as i64,
            last_admitted: None,
        }
    }

    /// Admit or suppress an event at `now_ms`. Admitting restarts the window.
    pub fn allow(&mut self, now_ms: i64) -> bool {
        match self.last_admitted {
            Some(last) if now_ms - last < self.window_ms => false,
            _ => {
                self.last_admitted = Some(now_ms);
                true
            }
        }
    }

    /// Forget the last admission so the next event passes.
    pub fn reset(&mut self) {
        self.last_admitted = None;
    }
}
