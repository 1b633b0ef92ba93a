//! CLI argument parsing for the golden harness.
//!
//! One positional argument, the fixture path; everything else has a default
//! or an environment fallback so `prove --exec golden-run golden` works
//! without extra arguments.

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};
use thiserror::Error;

use crate::actual::WriteMode;
use crate::diff::DEFAULT_CONTEXT;
use crate::subject::DEFAULT_SUBJECT_BIN;

const LONG_ABOUT: &str = "\
Runs one golden test and reports it in TAP format.

The fixture is split at the first pair of consecutive blank lines. Everything
before (the blank lines included) is fed to the subject on stdin; everything
after is the expected output, line for line. On a mismatch the real output is
written to <FIXTURE>.actual next to the fixture.

Standalone usage:
  golden-run golden/select.t

Interpreter usage:
  prove --exec golden-run golden";

/// Errors from CLI argument validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CliError {
    #[error("timeout-secs must be at least 1, got {0}")]
    InvalidTimeout(u64),
}

/// Golden-file test harness for code generators.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "golden-run")]
#[command(version, about, long_about = LONG_ABOUT)]
pub struct Cli {
    /// Fixture file: input, two blank lines, expected output.
    pub fixture: PathBuf,

    /// Pre-built subject binary, run as `<binary> --target=debug -`.
    #[arg(long, env = "GOLDEN_SUBJECT_BIN", default_value = DEFAULT_SUBJECT_BIN)]
    pub binary: PathBuf,

    /// Kill the subject and bail out if it runs longer than this.
    #[arg(long, env = "GOLDEN_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// On mismatch, overwrite the fixture instead of writing <FIXTURE>.actual.
    #[arg(long)]
    pub rewrite_output: bool,

    /// Do not colorize diff lines.
    #[arg(long)]
    pub no_color: bool,

    /// Unchanged lines shown around each change.
    #[arg(long, default_value_t = DEFAULT_CONTEXT)]
    pub context: usize,

    /// Diagnostics on stderr (-v, -vv).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Validate the arguments.
    pub fn validate(&self) -> Result<(), CliError> {
        if self.timeout_secs == Some(0) {
            return Err(CliError::InvalidTimeout(0));
        }
        Ok(())
    }

    pub fn to_config(&self) -> HarnessConfig {
        HarnessConfig {
            binary: self.binary.clone(),
            timeout: self.timeout_secs.map(Duration::from_secs),
            write_mode: if self.rewrite_output {
                WriteMode::InPlace
            } else {
                WriteMode::Sibling
            },
            color: !self.no_color,
            context: self.context,
        }
    }
}

/// Resolved settings for one harness run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    pub binary: PathBuf,
    pub timeout: Option<Duration>,
    pub write_mode: WriteMode,
    pub color: bool,
    pub context: usize,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from(DEFAULT_SUBJECT_BIN),
            timeout: None,
            write_mode: WriteMode::Sibling,
            color: true,
            context: DEFAULT_CONTEXT,
        }
    }
}

/// Parse CLI arguments from an iterator.
pub fn parse_from<I, T>(iter: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Cli::try_parse_from(iter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_parse_fixture_only() {
        let cli = parse_from(["golden-run", "golden/select.t"]).expect("parse");
        assert_eq!(cli.fixture, PathBuf::from("golden/select.t"));
        assert!(!cli.rewrite_output);
        assert!(!cli.no_color);
        assert_eq!(cli.context, DEFAULT_CONTEXT);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_defaults_to_config() {
        let cli = parse_from(["golden-run", "a.t"]).expect("parse");
        if std::env::var_os("GOLDEN_SUBJECT_BIN").is_none()
            && std::env::var_os("GOLDEN_TIMEOUT_SECS").is_none()
        {
            assert_eq!(cli.to_config(), HarnessConfig::default());
        }
    }

    #[test]
    fn test_missing_fixture_is_error() {
        let err = parse_from(["golden-run"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_two_fixtures_is_error() {
        let err = parse_from(["golden-run", "a.t", "b.t"]).unwrap_err();
        assert_ne!(err.kind(), ErrorKind::DisplayHelp);
        assert!(err.to_string().contains("b.t"));
    }

    #[test]
    fn test_help_is_not_a_usage_error() {
        let err = parse_from(["golden-run", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_all_options() {
        let cli = parse_from([
            "golden-run",
            "--binary",
            "target/release/querybinder",
            "--timeout-secs",
            "30",
            "--rewrite-output",
            "--no-color",
            "--context",
            "5",
            "-vv",
            "golden/a.t",
        ])
        .expect("parse");

        let config = cli.to_config();
        assert_eq!(config.binary, PathBuf::from("target/release/querybinder"));
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.write_mode, WriteMode::InPlace);
        assert!(!config.color);
        assert_eq!(config.context, 5);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_zero_timeout_validation() {
        let cli = parse_from(["golden-run", "--timeout-secs", "0", "a.t"]).expect("parse");
        assert_eq!(cli.validate(), Err(CliError::InvalidTimeout(0)));
    }

    #[test]
    fn test_positive_timeout_validation() {
        let cli = parse_from(["golden-run", "--timeout-secs", "1", "a.t"]).expect("parse");
        assert_eq!(cli.validate(), Ok(()));
    }
}
