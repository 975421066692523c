//! Sliding-window request accounting per session token

use crate::{Result, SdkError};
use std::collections::HashMap;

/// Window length in seconds for per-minute ceilings.
const WINDOW_SECS: f64 = 60.0;

/// Per-token sliding window of use timestamps.
///
/// Windows are pruned lazily: entries older than 60 seconds are dropped each
/// time a token is checked, never by a background task. A token idle for
/// longer than the window therefore always has full headroom again, which is
/// the intended true-sliding-window semantic.
#[derive(Debug, Default)]
pub struct RateLimiter {
    windows: HashMap<String, Vec<f64>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether one more use at `now` would stay under `ceiling`.
    ///
    /// Prunes the token's window as a side effect. Does not record the use;
    /// callers record only after the guarded operation succeeds.
    pub fn check(&mut self, token: &str, ceiling: u32, now: f64) -> Result<()> {
        let window = self.windows.entry(token.to_string()).or_default();
        window.retain(|&stamp| now - stamp < WINDOW_SECS);

        if window.len() >= ceiling as usize {
            return Err(SdkError::RateLimit { limit: ceiling });
        }
        Ok(())
    }

    /// Record a successful use at `now`.
    pub fn record(&mut self, token: &str, now: f64) {
        self.windows.entry(token.to_string()).or_default().push(now);
    }

    /// Drop a token's window entirely (revocation or sweep).
    pub fn remove(&mut self, token: &str) {
        self.windows.remove(token);
    }

    /// Number of tracked uses for a token after pruning at `now`.
    pub fn current_len(&mut self, token: &str, now: f64) -> usize {
        match self.windows.get_mut(token) {
            Some(window) => {
                window.retain(|&stamp| now - stamp < WINDOW_SECS);
                window.len()
            }
            None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ceiling_enforced_within_window() {
        let mut limiter = RateLimiter::new();
        let ceiling = 3;

        for i in 0..ceiling {
            limiter.check("tok", ceiling, i as f64).unwrap();
            limiter.record("tok", i as f64);
        }

        let err = limiter.check("tok", ceiling, 10.0).unwrap_err();
        assert!(matches!(err, SdkError::RateLimit { limit: 3 }));
    }

    #[test]
    fn test_window_slides_after_sixty_seconds() {
        let mut limiter = RateLimiter::new();

        limiter.check("tok", 1, 0.0).unwrap();
        limiter.record("tok", 0.0);

        // Still inside the window of the recorded use.
        assert!(limiter.check("tok", 1, 59.0).is_err());

        // The oldest use ages out exactly at the window boundary.
        limiter.check("tok", 1, 60.0).unwrap();
    }

    #[test]
    fn test_failed_use_is_not_counted() {
        let mut limiter = RateLimiter::new();

        // check() alone must not consume headroom.
        for _ in 0..10 {
            limiter.check("tok", 1, 0.0).unwrap();
        }
        assert_eq!(limiter.current_len("tok", 0.0), 0);
    }

    #[test]
    fn test_tokens_are_independent() {
        let mut limiter = RateLimiter::new();
        limiter.record("a", 0.0);
        limiter.record("a", 1.0);

        assert!(limiter.check("a", 2, 2.0).is_err());
        limiter.check("b", 2, 2.0).unwrap();
    }

    #[test]
    fn test_remove_clears_window() {
        let mut limiter = RateLimiter::new();
        limiter.record("tok", 0.0);
        limiter.remove("tok");
        assert_eq!(limiter.current_len("tok", 1.0), 0);
    }
}
