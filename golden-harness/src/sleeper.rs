//! Sleep abstraction for the subject wait loop.
//!
//! The harness polls the child between sleeps so it can notice a deadline
//! or an interrupt; tests swap in a sleeper that records instead of waiting.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Pause between polls of the subject process.
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Trait for pausing the wait loop.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

/// Real sleeper that uses `std::thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealSleeper;

impl RealSleeper {
    pub fn new() -> Self {
        Self
    }
}

impl Sleeper for RealSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Sleeper that yields briefly and counts how often it was asked to sleep.
#[derive(Debug, Default, Clone)]
pub struct MockSleeper {
    calls: Arc<AtomicUsize>,
}

impl MockSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Sleeper for MockSleeper {
    fn sleep(&self, _duration: Duration) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::thread::yield_now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_sleeper_returns_immediately() {
        let sleeper = MockSleeper::new();
        let start = std::time::Instant::now();
        sleeper.sleep(Duration::from_secs(100));
        assert!(start.elapsed() < Duration::from_secs(1));
        assert_eq!(sleeper.calls(), 1);
    }

    #[test]
    fn test_mock_sleeper_clone_shares_count() {
        let sleeper = MockSleeper::new();
        let handle = sleeper.clone();
        handle.sleep(POLL_INTERVAL);
        handle.sleep(POLL_INTERVAL);
        assert_eq!(sleeper.calls(), 2);
    }

    #[test]
    fn test_real_sleeper_waits() {
        let start = std::time::Instant::now();
        RealSleeper::new().sleep(Duration::from_millis(20));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_sleeper_trait_object() {
        let sleeper: Box<dyn Sleeper> = Box::new(MockSleeper::new());
        sleeper.sleep(POLL_INTERVAL);
    }
}
