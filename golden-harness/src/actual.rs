//! Candidate fixture ("actual artifact") writer.
//!
//! On a mismatch the harness writes the fixture's input followed by what the
//! subject really printed. After review the file can be copied over the
//! fixture to accept the new output.

use std::path::{Path, PathBuf};

use golden_fs::{sibling_with_suffix, Filesystem, FsError};
use thiserror::Error;

use crate::fixture::{is_blank, Fixture, Sections, BOUNDARY_BLANK_LINES};

/// Suffix appended to the fixture path for the candidate file.
pub const ACTUAL_SUFFIX: &str = ".actual";

/// Failure to persist the candidate fixture.
#[derive(Debug, Error)]
#[error("failed to write {path}: {source}")]
pub struct ArtifactError {
    pub path: String,
    #[source]
    pub source: FsError,
}

/// Where the candidate fixture goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// `<fixture>.actual`, next to the fixture.
    Sibling,
    /// Over the fixture itself.
    InPlace,
}

impl WriteMode {
    pub fn target(&self, fixture: &Path) -> PathBuf {
        match self {
            WriteMode::Sibling => actual_path(fixture),
            WriteMode::InPlace => fixture.to_path_buf(),
        }
    }
}

/// Path of the candidate file for `fixture`.
pub fn actual_path(fixture: &Path) -> PathBuf {
    sibling_with_suffix(fixture, ACTUAL_SUFFIX)
}

/// Render a candidate fixture: the input verbatim, then one line per output
/// line.
///
/// If the input never reached a boundary, the missing blank lines are added
/// so the candidate splits back into the same input and the new output.
pub fn candidate_fixture<S: AsRef<str>>(sections: &Sections, output: &[S]) -> String {
    let mut text = sections.input_text();

    if !sections.has_boundary && !output.is_empty() {
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        let trailing_blanks = sections
            .input
            .iter()
            .rev()
            .take_while(|line| is_blank(line))
            .count();
        for _ in trailing_blanks..BOUNDARY_BLANK_LINES {
            text.push('\n');
        }
    }

    for line in output {
        text.push_str(line.as_ref());
        text.push('\n');
    }
    text
}

/// Writes candidate fixtures through a `Filesystem`.
pub struct ActualWriter<'a, F: Filesystem> {
    fs: &'a F,
}

impl<'a, F: Filesystem> ActualWriter<'a, F> {
    pub fn new(fs: &'a F) -> Self {
        Self { fs }
    }

    /// Write the candidate and return the path written.
    pub fn write<S: AsRef<str>>(
        &self,
        fixture: &Fixture,
        output: &[S],
        mode: WriteMode,
    ) -> Result<PathBuf, ArtifactError> {
        let path = mode.target(&fixture.path);
        let content = candidate_fixture(&fixture.sections, output);

        let result = match mode {
            WriteMode::Sibling => self.fs.write_file(&path, content.as_bytes()),
            WriteMode::InPlace => self.fs.write_atomic(&path, content.as_bytes()),
        };

        result.map_err(|source| ArtifactError {
            path: path.display().to_string(),
            source,
        })?;
        Ok(path)
    }
}
