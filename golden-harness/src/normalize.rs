//! Output normalization.
//!
//! Fixtures store plain text, so terminal styling emitted by the subject is
//! removed before comparison.

use regex::Regex;

/// `ESC [`, parameters, `m`. The parameters may not contain another escape,
/// so an unterminated sequence never reaches into the next one.
pub const SGR_PATTERN: &str = r"\x1b\[[^m\x1b]*m";

/// Strips "select graphic rendition" escape sequences from captured lines.
#[derive(Debug, Clone)]
pub struct OutputNormalizer {
    pattern: Regex,
}

impl Default for OutputNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputNormalizer {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(SGR_PATTERN).expect("valid regex pattern"),
        }
    }

    /// Remove every styling sequence from one line.
    pub fn strip(&self, line: &str) -> String {
        self.pattern.replace_all(line, "").into_owned()
    }

    /// Normalize every captured line.
    pub fn normalize<I, S>(&self, lines: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        lines
            .into_iter()
            .map(|line| self.strip(line.as_ref()))
            .collect()
    }
}
