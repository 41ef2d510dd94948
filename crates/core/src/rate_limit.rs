//! Rate limiting for search attempts
//!
//! Provides a fixed-window counter: the window restarts once more than
//! `window_ms` has elapsed since it opened, and at most `max_requests`
//! attempts are admitted per window. Bursts that straddle a window boundary
//! may therefore exceed the nominal rate; that tolerance is accepted.
//!
//! # Example
//!
//! ```rust
//! use kinderfrage_core::rate_limit::{FixedWindowLimiter, RateLimitConfig};
//! use std::time::{Duration, Instant};
//!
//! let limiter = FixedWindowLimiter::new(RateLimitConfig::per_second(2));
//! let start = Instant::now();
//!
//! assert!(limiter.allow_at(start));
//! assert!(limiter.allow_at(start + Duration::from_millis(10)));
//! assert!(!limiter.allow_at(start + Duration::from_millis(20)));
//! assert!(limiter.allow_at(start + Duration::from_millis(1001)));
//! ```

use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Rate limiter configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum attempts admitted per window
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,
    /// Window length in milliseconds
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,
}

fn default_max_requests() -> u32 {
    5
}

fn default_window_ms() -> u64 {
    1000
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_ms: default_window_ms(),
        }
    }
}

impl RateLimitConfig {
    /// Per-second rate limit
    #[must_use]
    pub fn per_second(max: u32) -> Self {
        Self {
            max_requests: max,
            window_ms: 1000,
        }
    }

    /// Window length as a `Duration`
    #[must_use]
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
}

#[derive(Debug)]
struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window limiter for a single caller
#[derive(Debug)]
pub struct FixedWindowLimiter {
    config: RateLimitConfig,
    state: Mutex<Option<Window>>,
}

impl FixedWindowLimiter {
    /// Create a new limiter; the first window opens on the first attempt
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            state: Mutex::new(None),
        }
    }

    /// Record one attempt now and report whether it is admitted
    #[must_use]
    pub fn allow(&self) -> bool {
        self.allow_at(Instant::now())
    }

    /// Record one attempt at `now` and report whether it is admitted
    #[must_use]
    pub fn allow_at(&self, now: Instant) -> bool {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let window = state.get_or_insert(Window {
            started: now,
            count: 0,
        });

        if now.saturating_duration_since(window.started) > self.config.window() {
            window.started = now;
            window.count = 0;
        }

        window.count = window.count.saturating_add(1);
        let admitted = window.count <= self.config.max_requests;
        if !admitted {
            tracing::debug!(
                count = window.count,
                max = self.config.max_requests,
                "Search attempt throttled"
            );
        }
        admitted
    }

    /// Attempts counted in the current window (0 before the first attempt)
    #[must_use]
    pub fn current_count(&self) -> u32 {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.as_ref().map_or(0, |w| w.count)
    }

    /// Forget the current window
    pub fn reset(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        *state = None;
    }

    /// Configured limits
    #[must_use]
    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_five_within_window_then_throttled() {
        let limiter = FixedWindowLimiter::new(RateLimitConfig::default());
        let start = Instant::now();

        for offset in [0, 200, 400, 600, 900] {
            assert!(limiter.allow_at(start + ms(offset)));
        }
        assert!(!limiter.allow_at(start + ms(950)));
        assert_eq!(limiter.current_count(), 6);
    }

    #[test]
    fn test_window_resets_after_elapsed() {
        let limiter = FixedWindowLimiter::new(RateLimitConfig::default());
        let start = Instant::now();

        for _ in 0..6 {
            let _ = limiter.allow_at(start);
        }
        assert!(limiter.allow_at(start + ms(1001)));
        assert_eq!(limiter.current_count(), 1);
    }

    #[test]
    fn test_exactly_window_length_does_not_reset() {
        let limiter = FixedWindowLimiter::new(RateLimitConfig::per_second(1));
        let start = Instant::now();

        assert!(limiter.allow_at(start));
        assert!(!limiter.allow_at(start + ms(1000)));
    }

    #[test]
    fn test_burst_across_boundary_is_tolerated() {
        let limiter = FixedWindowLimiter::new(RateLimitConfig::default());
        let start = Instant::now();

        assert!(limiter.allow_at(start));
        for _ in 0..4 {
            assert!(limiter.allow_at(start + ms(990)));
        }
        // Window opened at `start`, so 1001ms later a fresh window admits 5 more
        for _ in 0..5 {
            assert!(limiter.allow_at(start + ms(1001)));
        }
        assert!(!limiter.allow_at(start + ms(1001)));
    }

    #[test]
    fn test_reset() {
        let limiter = FixedWindowLimiter::new(RateLimitConfig::per_second(1));
        let start = Instant::now();

        assert!(limiter.allow_at(start));
        assert!(!limiter.allow_at(start));

        limiter.reset();
        assert_eq!(limiter.current_count(), 0);
        assert!(limiter.allow_at(start));
    }

    #[test]
    fn test_config_window() {
        assert_eq!(RateLimitConfig::default().window(), Duration::from_secs(1));
        assert_eq!(RateLimitConfig::default().max_requests, 5);
    }
}
