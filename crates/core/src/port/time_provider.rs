// Time Provider Port (run duration reporting)

use std::sync::atomic::{AtomicI64, Ordering};

/// Clock used to measure how long an invocation took
pub trait TimeProvider: Send + Sync {
    /// Milliseconds since the Unix epoch
    fn now_millis(&self) -> i64;
}

/// Wall clock (production)
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Deterministic clock: every reading advances by `step_ms`
pub struct SteppingTimeProvider {
    next: AtomicI64,
    step_ms: i64,
}

impl SteppingTimeProvider {
    pub fn new(start_ms: i64, step_ms: i64) -> Self {
        Self {
            next: AtomicI64::new(start_ms),
            step_ms,
        }
    }
}

impl TimeProvider for SteppingTimeProvider {
    fn now_millis(&self) -> i64 {
        self.next.fetch_add(self.step_ms, Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stepping_clock() {
        let clock = SteppingTimeProvider::new(1_000, 250);
        assert_eq!(clock.now_millis(), 1_000);
        assert_eq!(clock.now_millis(), 1_250);
    }

    #[test]
    fn test_system_clock_is_after_2020() {
        assert!(SystemTimeProvider.now_millis() > 1_577_836_800_000);
    }
}
