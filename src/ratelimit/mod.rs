//! Fixed-window rate limiting.
//!
//! Two independent windows (minute and day) are tracked per
//! `(key_prefix, client_id)` pair. Fixed windows allow a burst of up to
//! the limit at a window boundary; that is an accepted cost for a
//! protective quota in front of a paid upstream, which does not need
//! billing-grade accuracy.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

const MINUTE_WINDOW: Duration = Duration::from_secs(60);
const DAY_WINDOW: Duration = Duration::from_secs(86_400);

/// Counter-table size above which stale entries are swept.
const SWEEP_THRESHOLD: usize = 4096;

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    Limited { retry_after_secs: u64 },
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

#[derive(Debug, Clone, Copy)]
struct WindowCounter {
    window_start: Instant,
    count: u32,
}

impl WindowCounter {
    fn new(now: Instant) -> Self {
        Self {
            window_start: now,
            count: 0,
        }
    }

    /// Reset the counter if its window has lapsed.
    fn roll(&mut self, now: Instant, window: Duration) {
        if now.duration_since(self.window_start) >= window {
            self.window_start = now;
            self.count = 0;
        }
    }

    /// Seconds until this window resets, rounded up, minimum 1.
    fn retry_after_secs(&self, now: Instant, window: Duration) -> u64 {
        let remaining = window.saturating_sub(now.duration_since(self.window_start));
        let mut secs = remaining.as_secs();
        if remaining.subsec_nanos() > 0 {
            secs += 1;
        }
        secs.max(1)
    }
}

#[derive(Debug, Clone, Copy)]
struct ClientCounters {
    minute: WindowCounter,
    day: WindowCounter,
}

impl ClientCounters {
    fn new(now: Instant) -> Self {
        Self {
            minute: WindowCounter::new(now),
            day: WindowCounter::new(now),
        }
    }
}

/// Dual-window fixed-window limiter, shared across concurrent requests.
#[derive(Debug, Default)]
pub struct FixedWindowLimiter {
    counters: Mutex<HashMap<String, ClientCounters>>,
}

impl FixedWindowLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check and, when allowed, charge one request against both windows.
    ///
    /// A request that would exceed either window is rejected without
    /// touching either counter, so a day-quota rejection never burns a
    /// minute-quota slot. When both windows are exhausted the shorter
    /// (minute) wait wins the retry hint.
    pub fn check(
        &self,
        key_prefix: &str,
        client_id: &str,
        minute_limit: u32,
        day_limit: u32,
    ) -> RateDecision {
        let now = Instant::now();
        let key = format!("{key_prefix}:{client_id}");

        let mut counters = self.counters.lock().unwrap();
        if counters.len() > SWEEP_THRESHOLD {
            sweep(&mut counters, now);
        }

        let entry = counters
            .entry(key)
            .or_insert_with(|| ClientCounters::new(now));
        entry.minute.roll(now, MINUTE_WINDOW);
        entry.day.roll(now, DAY_WINDOW);

        if entry.minute.count >= minute_limit {
            return RateDecision::Limited {
                retry_after_secs: entry.minute.retry_after_secs(now, MINUTE_WINDOW),
            };
        }
        if entry.day.count >= day_limit {
            return RateDecision::Limited {
                retry_after_secs: entry.day.retry_after_secs(now, DAY_WINDOW),
            };
        }

        entry.minute.count += 1;
        entry.day.count += 1;
        RateDecision::Allowed
    }

    /// Number of tracked client counters.
    pub fn tracked_clients(&self) -> usize {
        self.counters.lock().unwrap().len()
    }

    /// Test hook: drop all counters.
    pub fn reset(&self) {
        self.counters.lock().unwrap().clear();
    }
}

/// Drop counters whose day window lapsed more than a full day ago.
fn sweep(counters: &mut HashMap<String, ClientCounters>, now: Instant) {
    counters.retain(|_, entry| now.duration_since(entry.day.window_start) < DAY_WINDOW * 2);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_the_minute_limit() {
        let limiter = FixedWindowLimiter::new();
        for _ in 0..5 {
            assert!(limiter.check("search", "1.2.3.4", 5, 100).is_allowed());
        }
        let decision = limiter.check("search", "1.2.3.4", 5, 100);
        match decision {
            RateDecision::Limited { retry_after_secs } => assert!(retry_after_secs >= 1),
            RateDecision::Allowed => panic!("sixth request should be limited"),
        }
    }

    #[test]
    fn clients_are_independent() {
        let limiter = FixedWindowLimiter::new();
        assert!(limiter.check("search", "1.2.3.4", 1, 100).is_allowed());
        assert!(!limiter.check("search", "1.2.3.4", 1, 100).is_allowed());
        assert!(limiter.check("search", "5.6.7.8", 1, 100).is_allowed());
    }

    #[test]
    fn prefixes_partition_counters() {
        let limiter = FixedWindowLimiter::new();
        assert!(limiter.check("search", "1.2.3.4", 1, 100).is_allowed());
        assert!(limiter.check("shorts", "1.2.3.4", 1, 100).is_allowed());
        assert_eq!(limiter.tracked_clients(), 2);
    }

    #[test]
    fn reset_clears_state() {
        let limiter = FixedWindowLimiter::new();
        assert!(limiter.check("video", "1.2.3.4", 1, 100).is_allowed());
        assert!(!limiter.check("video", "1.2.3.4", 1, 100).is_allowed());
        limiter.reset();
        assert!(limiter.check("video", "1.2.3.4", 1, 100).is_allowed());
    }
}
