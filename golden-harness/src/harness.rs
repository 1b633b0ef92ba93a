//! One golden test, end to end.
//!
//! Reads the fixture, runs the subject, compares, reports, and writes the
//! candidate fixture on a mismatch. Every failure below a usage error ends up
//! as TAP text; the returned `Outcome` lets callers pick an exit status.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use golden_fs::{Filesystem, FsError};
use thiserror::Error;

use crate::actual::{ActualWriter, ArtifactError};
use crate::cli::HarnessConfig;
use crate::diff::{DiffEngine, Verdict};
use crate::fixture::Fixture;
use crate::logger::Logger;
use crate::normalize::OutputNormalizer;
use crate::subject::{Subject, SubjectError};
use crate::tap::TapReporter;

/// Faults that prevent the harness from delivering a normal verdict.
#[derive(Debug, Error)]
pub enum Fault {
    #[error("cannot read fixture {path}: {source}")]
    Fixture {
        path: String,
        #[source]
        source: FsError,
    },

    #[error(transparent)]
    Subject(#[from] SubjectError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

/// Result of one harness run.
#[derive(Debug)]
pub enum Outcome {
    Pass,
    /// Output did not match; the candidate fixture was written to `artifact`.
    Fail { artifact: PathBuf },
    Fault(Fault),
}

impl Outcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, Outcome::Pass)
    }
}

/// Runs a single fixture against a subject.
pub struct Harness<'a, F: Filesystem, S: Subject, L: Logger> {
    config: &'a HarnessConfig,
    fs: &'a F,
    subject: &'a S,
    logger: &'a L,
    normalizer: OutputNormalizer,
    engine: DiffEngine,
}

impl<'a, F: Filesystem, S: Subject, L: Logger> Harness<'a, F, S, L> {
    pub fn new(config: &'a HarnessConfig, fs: &'a F, subject: &'a S, logger: &'a L) -> Self {
        Self {
            config,
            fs,
            subject,
            logger,
            normalizer: OutputNormalizer::new(),
            engine: DiffEngine::new(config.context),
        }
    }

    /// Run the fixture at `path`, reporting to `reporter`.
    ///
    /// Only failures to write the TAP stream itself are returned as errors.
    pub fn run<W: Write>(
        &self,
        path: &Path,
        reporter: &mut TapReporter<W>,
    ) -> io::Result<Outcome> {
        reporter.plan(1)?;

        let content = match self.fs.read_file(path) {
            Ok(content) => content,
            Err(source) => {
                let fault = Fault::Fixture {
                    path: path.display().to_string(),
                    source,
                };
                return self.bail_out(reporter, fault);
            }
        };

        let fixture = Fixture::parse(path, &content);
        self.logger.step(&format!(
            "{}: {} input lines, {} expected lines{}",
            path.display(),
            fixture.sections.input.len(),
            fixture.sections.expectation.len(),
            if fixture.sections.has_boundary {
                ""
            } else {
                " (no boundary)"
            }
        ));

        let captured = match self.subject.run(&fixture.sections.input_text()) {
            Ok(captured) => captured,
            Err(e) => return self.bail_out(reporter, e.into()),
        };
        match captured.exit_code {
            Some(code) => self.logger.step(&format!("subject exited with status {}", code)),
            None => self.logger.step("subject terminated by signal"),
        }

        let actual = self.normalizer.normalize(captured.lines());
        let golden = fixture.sections.golden_lines();
        let diff = self.engine.diff(&actual, &golden);
        self.logger.detail(&format!(
            "{} output lines, {} expected, {} removed, {} added",
            actual.len(),
            golden.len(),
            diff.removed(),
            diff.added()
        ));

        if diff.verdict() == Verdict::Pass {
            reporter.ok(1)?;
            return Ok(Outcome::Pass);
        }

        reporter.diff(&diff)?;

        let mode = self.config.write_mode;
        match ActualWriter::new(self.fs).write(&fixture, &actual, mode) {
            Ok(artifact) => {
                self.logger
                    .step(&format!("wrote candidate fixture {}", artifact.display()));
                reporter.not_ok(1, &format!("Output written to {}", artifact.display()))?;
                Ok(Outcome::Fail { artifact })
            }
            Err(e) => {
                let target = mode.target(path);
                reporter.not_ok(1, &format!("Could not write {}", target.display()))?;
                self.bail_out(reporter, e.into())
            }
        }
    }

    fn bail_out<W: Write>(
        &self,
        reporter: &mut TapReporter<W>,
        fault: Fault,
    ) -> io::Result<Outcome> {
        self.logger.fault(&fault.to_string());
        reporter.bail_out(&fault.to_string())?;
        Ok(Outcome::Fault(fault))
    }
}
