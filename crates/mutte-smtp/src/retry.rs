use std::time::Duration;

/// Exponential backoff schedule for transient delivery failures.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay_ms: u64) -> Self {
        Self {
            // A policy that never attempts delivery is useless
            max_attempts: max_attempts.max(1),
            base_delay: Duration::from_millis(base_delay_ms),
        }
    }

    /// Delay to wait after a failed attempt, 1-based.
    ///
    /// Doubles each time: base, 2x base, 4x base, ...
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, 500)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_doubles_per_attempt() {
        let policy = RetryPolicy::new(3, 500);
        assert_eq!(policy.delay_for(1), Duration::from_millis(500));
        assert_eq!(policy.delay_for(2), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(3), Duration::from_millis(2000));
    }

    #[test]
    fn test_zero_attempts_clamped_to_one() {
        let policy = RetryPolicy::new(0, 500);
        assert_eq!(policy.max_attempts, 1);
    }

    #[test]
    fn test_large_attempt_does_not_overflow() {
        let policy = RetryPolicy::new(64, 500);
        let _ = policy.delay_for(64);
    }
}
