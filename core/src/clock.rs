//! Injectable time source.
//!
//! Both the device actor's `tick()` and the pool's reaper consult a
//! [`Clock`] instead of `Instant::now()` directly, so tests can pin idle
//! thresholds and elapsed-time calculations deterministically (design
//! note: "inject the RNG and a clock source into both the simulator and
//! the reaper").

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// A monotonic nanosecond time source.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Current monotonic time, in nanoseconds, relative to an arbitrary
    /// but fixed epoch for the lifetime of the clock.
    fn now_monotonic_ns(&self) -> u64;
}

/// Wall-clock monotonic time via [`std::time::Instant`].
#[derive(Debug, Clone)]
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_monotonic_ns(&self) -> u64 {
        self.epoch.elapsed().as_nanos() as u64
    }
}

/// A manually-advanced clock for deterministic tests.
#[derive(Debug, Default)]
pub struct TestClock {
    now_ns: AtomicU64,
}

impl TestClock {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set(&self, now_ns: u64) {
        self.now_ns.store(now_ns, Ordering::SeqCst);
    }

    pub fn advance(&self, delta_ns: u64) {
        self.now_ns.fetch_add(delta_ns, Ordering::SeqCst);
    }
}

impl Clock for TestClock {
    fn now_monotonic_ns(&self) -> u64 {
        self.now_ns.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_advances() {
        let clock = TestClock::new();
        assert_eq!(clock.now_monotonic_ns(), 0);
        clock.advance(1_000);
        assert_eq!(clock.now_monotonic_ns(), 1_000);
        clock.set(5_000);
        assert_eq!(clock.now_monotonic_ns(), 5_000);
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now_monotonic_ns();
        let b = clock.now_monotonic_ns();
        assert!(b >= a);
    }
}
