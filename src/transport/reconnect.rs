//! Reconnect delay policy.
//!
//! A pure schedule: the first few attempts after a drop retry quickly
//! to ride out transient wireless drops, later attempts fall back to
//! the configured interval.

use std::time::Duration;

use crate::core::{FAST_RETRY_ATTEMPTS, FAST_RETRY_DELAY};

/// Delay schedule for a session chain.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    fast_delay: Duration,
    fast_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl ReconnectPolicy {
    /// Policy with the standard fast-recovery tier (3 x 500 ms).
    pub fn new() -> Self {
        Self {
            fast_delay: FAST_RETRY_DELAY,
            fast_attempts: FAST_RETRY_ATTEMPTS,
        }
    }

    /// Delay before the next connection attempt.
    ///
    /// `failed_attempts` counts consecutive failures since the last
    /// successful connection; the caller owns the counter and resets
    /// it to zero whenever a connection succeeds.
    pub fn delay_for(&self, failed_attempts: u32, reconnect_interval: Duration) -> Duration {
        if failed_attempts < self.fast_attempts {
            self.fast_delay
        } else {
            reconnect_interval
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fast_tier_covers_first_three_attempts() {
        let policy = ReconnectPolicy::new();
        let interval = Duration::from_millis(2000);

        for attempt in 0..3 {
            assert_eq!(
                policy.delay_for(attempt, interval),
                Duration::from_millis(500)
            );
        }
    }

    #[test]
    fn test_later_attempts_use_configured_interval() {
        let policy = ReconnectPolicy::new();
        let interval = Duration::from_millis(7500);

        for attempt in 3..8 {
            assert_eq!(policy.delay_for(attempt, interval), interval);
        }
    }

    #[test]
    fn test_counter_reset_reenters_fast_tier() {
        let policy = ReconnectPolicy::new();
        let interval = Duration::from_millis(2000);

        assert_eq!(policy.delay_for(5, interval), interval);
        // After a successful connection the owner resets to zero.
        assert_eq!(policy.delay_for(0, interval), Duration::from_millis(500));
    }
}
