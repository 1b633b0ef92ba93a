//! Golden-file test harness.
//!
//! Checks that a code generator, given the input half of a fixture file,
//! prints exactly the expected half, and reports the result as TAP so a
//! generic runner (`prove --exec golden-run golden`) can drive a whole
//! directory of fixtures.
//!
//! # Fixtures
//!
//! A fixture is a single text file:
//!
//! ```text
//! -- @query select_one() ->1 i64
//! SELECT 1;
//!
//!
//! <expected output, line for line>
//! ```
//!
//! The first two consecutive blank lines end the input. On a mismatch the
//! harness writes `<fixture>.actual`, a complete replacement fixture holding
//! the same input and the real output.
//!
//! # Pipeline
//!
//! 1. [`fixture`] splits the file into input and expectation
//! 2. [`subject`] runs the binary and captures stdout then stderr
//! 3. [`normalize`] strips terminal color codes
//! 4. [`diff`] computes a unified diff against the expectation
//! 5. [`tap`] reports, and [`actual`] writes the candidate on failure

pub mod actual;
pub mod cli;
pub mod diff;
pub mod exit;
pub mod fixture;
pub mod harness;
pub mod logger;
pub mod normalize;
pub mod signal;
pub mod sleeper;
pub mod subject;
pub mod tap;

pub use actual::{actual_path, candidate_fixture, ActualWriter, ArtifactError, WriteMode};
pub use cli::{parse_from, Cli, CliError, HarnessConfig};
pub use diff::{Diff, DiffEngine, DiffLine, Verdict};
pub use fixture::{split, FileSplitter, Fixture, Sections};
pub use harness::{Fault, Harness, Outcome};
pub use logger::{Logger, MockLogger, StderrLogger, Verbosity};
pub use normalize::OutputNormalizer;
pub use signal::{InterruptCheck, InterruptFlag, NoInterrupt};
pub use sleeper::{MockSleeper, RealSleeper, Sleeper};
pub use subject::{
    CapturedOutput, MockSubject, ProcessSubject, Subject, SubjectCommand, SubjectError,
};
pub use tap::TapReporter;
