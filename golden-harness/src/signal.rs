//! Ctrl-C and SIGTERM while the subject runs.
//!
//! The wait loop polls an `InterruptCheck` between `try_wait` calls. When it
//! reports an interrupt the child is killed and reaped, and the run ends with
//! a bail-out instead of a verdict built from partial output.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Polled by the subject wait loop.
pub trait InterruptCheck: Send + Sync {
    fn interrupted(&self) -> bool;
}

/// Raised once by the process signal handler; clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag {
    raised: Arc<AtomicBool>,
}

impl InterruptFlag {
    /// A flag raised by SIGINT or SIGTERM.
    ///
    /// `ctrlc` allows one handler per process. If one is already installed the
    /// returned flag can only be raised by hand.
    pub fn install() -> Self {
        let flag = Self::default();
        let raised = Arc::clone(&flag.raised);
        let _ = ctrlc::set_handler(move || raised.store(true, Ordering::SeqCst));
        flag
    }

    pub fn raise(&self) {
        self.raised.store(true, Ordering::SeqCst);
    }
}

impl InterruptCheck for InterruptFlag {
    fn interrupted(&self) -> bool {
        self.raised.load(Ordering::SeqCst)
    }
}

/// For runs that cannot be interrupted.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoInterrupt;

impl InterruptCheck for NoInterrupt {
    fn interrupted(&self) -> bool {
        false
    }
}
