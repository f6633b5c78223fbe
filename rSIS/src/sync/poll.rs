//! Periodic refresh gate.

use std::time::Duration;

/// Default poll interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Decides when the periodic notification poll should fire.
///
/// Polling pauses while the app is backgrounded; returning to the
/// foreground demands one immediate refresh before the interval resumes.
/// Pure bookkeeping over an injected clock, the caller owns the timer that
/// calls [`should_refresh`](Poller::should_refresh).
#[derive(Debug)]
pub struct Poller {
    interval_ms: i64,
    last_refresh: Option<i64>,
    foreground: bool,
    refresh_on_resume: bool,
}

impl Poller {
    /// Create a poller with the given interval, starting foregrounded.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval_ms: interval.as_millis() as i64,
            last_refresh: None,
            foreground: true,
            refresh_on_resume: false,
        }
    }

    /// Record an app lifecycle transition.
    pub fn set_foreground(&mut self, foreground: bool) {
        if foreground && !self.foreground {
            self.refresh_on_resume = true;
        }
        self.foreground = foreground;
    }

    /// Whether a refresh should fire at `now_ms`. A `true` result marks the
    /// refresh as taken.
    pub fn should_refresh(&mut self, now_ms: i64) -> bool {
        if !self.foreground {
            return false;
        }
        if self.refresh_on_resume {
            self.refresh_on_resume = false;
            self.last_refresh = Some(now_ms);
            return true;
        }
        match self.last_refresh {
            Some(last) if now_ms - last < self.interval_ms => false,
            _ => {
                self.last_refresh = Some(now_ms);
                true
            }
        }
    }
}

impl Default for Poller {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_on_interval() {
        let mut p = Poller::new(Duration::from_secs(30));
        assert!(p.should_refresh(0));
        assert!(!p.should_refresh(29_999));
        assert!(p.should_refresh(30_000));
    }

    #[test]
    fn test_paused_in_background() {
        let mut p = Poller::new(Duration::from_secs(30));
        assert!(p.should_refresh(0));
        p.set_foreground(false);
        assert!(!p.should_refresh(60_000));
        assert!(!p.should_refresh(120_000));
    }

    #[test]
    fn test_immediate_refresh_on_resume() {
        let mut p = Poller::new(Duration::from_secs(30));
        assert!(p.should_refresh(0));
        p.set_foreground(false);
        p.set_foreground(true);
        // Resumed well inside the interval, still refreshes immediately.
        assert!(p.should_refresh(5_000));
        assert!(!p.should_refresh(10_000));
        assert!(p.should_refresh(35_000));
    }
}
