//! Exit codes for the golden harness.
//!
//! A parent TAP runner treats a non-zero exit as a broken suite, so test
//! failures and most faults exit 0 and are reported in the TAP stream.

use crate::harness::{Fault, Outcome};
use crate::subject::SubjectError;

/// Exit code constants.
pub mod codes {
    /// Run completed; the verdict is in the TAP output.
    pub const SUCCESS: i32 = 0;
    /// Invalid arguments.
    pub const INVALID_ARGS: i32 = 1;
    /// The TAP stream itself could not be written.
    pub const IO_ERROR: i32 = 2;
    /// Interrupted by signal (128 + SIGINT).
    pub const SIGINT: i32 = 130;
}

/// Map a run outcome to an exit code.
pub fn exit_code(outcome: &Outcome) -> i32 {
    match outcome {
        Outcome::Fault(Fault::Subject(SubjectError::Interrupted)) => codes::SIGINT,
        Outcome::Pass | Outcome::Fail { .. } | Outcome::Fault(_) => codes::SUCCESS,
    }
}
