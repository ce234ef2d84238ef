//! Manual "try again" gate for failed queries.
//!
//! A failed load may be retried by the shopper a limited number of times.
//! Once the cap is reached the error is final until the next success.

/// Attempts allowed before the gate closes.
pub const MAX_ATTEMPTS: u32 = 3;

/// Counts manual retries of one failed query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryGate {
    attempts: u32,
}

impl RetryGate {
    #[must_use]
    pub const fn new() -> Self {
        Self { attempts: 0 }
    }

    /// Record an attempt. Returns `false` once the cap has been used up.
    pub const fn try_again(&mut self) -> bool {
        if self.attempts >= MAX_ATTEMPTS {
            return false;
        }
        self.attempts += 1;
        true
    }

    /// Attempts left before the gate closes.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        MAX_ATTEMPTS.saturating_sub(self.attempts)
    }

    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.attempts >= MAX_ATTEMPTS
    }

    /// Re-arm after a successful load.
    pub const fn reset(&mut self) {
        self.attempts = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_exactly_three_attempts() {
        let mut gate = RetryGate::new();
        assert!(gate.try_again());
        assert!(gate.try_again());
        assert_eq!(gate.remaining(), 1);
        assert!(gate.try_again());
        assert!(gate.is_exhausted());
        assert!(!gate.try_again());
        assert!(!gate.try_again());
    }

    #[test]
    fn test_reset_rearms() {
        let mut gate = RetryGate::new();
        while gate.try_again() {}
        gate.reset();
        assert_eq!(gate.remaining(), MAX_ATTEMPTS);
        assert!(gate.try_again());
    }
}
