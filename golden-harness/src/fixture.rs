//! Fixture splitting.
//!
//! A fixture is one text file holding both the subject's input and the
//! expected output. The first run of two consecutive blank lines ends the
//! input; everything after it is the expectation.

use std::path::{Path, PathBuf};

/// Number of consecutive blank lines that ends the input section.
pub const BOUNDARY_BLANK_LINES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SplitState {
    CollectingInput,
    CollectingExpectation,
}

/// Line-at-a-time splitter state machine.
#[derive(Debug, Clone)]
pub struct FileSplitter {
    state: SplitState,
    blank_run: usize,
    input: Vec<String>,
    expectation: Vec<String>,
}

impl Default for FileSplitter {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSplitter {
    pub fn new() -> Self {
        Self {
            state: SplitState::CollectingInput,
            blank_run: 0,
            input: Vec::new(),
            expectation: Vec::new(),
        }
    }

    /// Feed one raw line, newline included.
    pub fn push_line(&mut self, line: &str) {
        match self.state {
            SplitState::CollectingInput => self.input.push(line.to_string()),
            SplitState::CollectingExpectation => self.expectation.push(line.to_string()),
        }

        if is_blank(line) {
            self.blank_run += 1;
        } else {
            self.blank_run = 0;
        }

        // Switch after appending, so the boundary stays in the input.
        if self.state == SplitState::CollectingInput && self.blank_run >= BOUNDARY_BLANK_LINES {
            self.state = SplitState::CollectingExpectation;
        }
    }

    pub fn finish(self) -> Sections {
        Sections {
            has_boundary: self.state == SplitState::CollectingExpectation,
            input: self.input,
            expectation: self.expectation,
        }
    }
}

/// The two halves of a fixture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sections {
    /// Raw input lines, newlines included.
    pub input: Vec<String>,
    /// Raw expectation lines, newlines included.
    pub expectation: Vec<String>,
    /// Whether a double blank line was found.
    pub has_boundary: bool,
}

impl Sections {
    /// The input section as one block, fed verbatim to the subject.
    pub fn input_text(&self) -> String {
        self.input.concat()
    }

    /// Expected output lines with their line terminators removed.
    pub fn golden_lines(&self) -> Vec<String> {
        self.expectation
            .iter()
            .map(|line| line_content(line).to_string())
            .collect()
    }
}

/// A loaded fixture file.
#[derive(Debug, Clone)]
pub struct Fixture {
    pub path: PathBuf,
    pub sections: Sections,
}

impl Fixture {
    pub fn parse(path: &Path, content: &str) -> Self {
        Self {
            path: path.to_path_buf(),
            sections: split(content),
        }
    }
}

/// Split fixture text into input and expectation sections.
pub fn split(content: &str) -> Sections {
    let mut splitter = FileSplitter::new();
    for line in content.split_inclusive('\n') {
        splitter.push_line(line);
    }
    splitter.finish()
}

pub(crate) fn is_blank(line: &str) -> bool {
    line == "\n" || line == "\r\n"
}

/// A line without its `\n` and any carriage returns before it. Expected and
/// captured lines both go through here, so a promoted candidate compares
/// equal to the output it was written from.
pub(crate) fn line_content(line: &str) -> &str {
    line.strip_suffix('\n')
        .unwrap_or(line)
        .trim_end_matches('\r')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    // ===========================================
    // Boundary detection
    // ===========================================

    #[test]
    fn test_split_basic() {
        let sections = split("SELECT 1;\n\n\nrows: 1\n");
        assert_eq!(sections.input, lines(&["SELECT 1;\n", "\n", "\n"]));
        assert_eq!(sections.expectation, lines(&["rows: 1\n"]));
        assert!(sections.has_boundary);
    }

    #[test]
    fn test_split_empty() {
        let sections = split("");
        assert!(sections.input.is_empty());
        assert!(sections.expectation.is_empty());
        assert!(!sections.has_boundary);
    }

    #[test]
    fn test_split_no_boundary_everything_is_input() {
        let sections = split("a\n\nb\nc");
        assert_eq!(sections.input, lines(&["a\n", "\n", "b\n", "c"]));
        assert!(sections.expectation.is_empty());
        assert!(!sections.has_boundary);
    }

    #[test]
    fn test_blank_run_resets_on_content() {
        let switched = |s: &FileSplitter| s.clone().finish().has_boundary;

        let mut splitter = FileSplitter::new();
        splitter.push_line("\n");
        assert!(!switched(&splitter));
        splitter.push_line("x\n");
        splitter.push_line("\n");
        assert!(!switched(&splitter));
        splitter.push_line("\n");
        assert!(switched(&splitter));

        let sections = splitter.finish();
        assert_eq!(sections.input, lines(&["\n", "x\n", "\n", "\n"]));
    }

    #[test]
    fn test_leading_double_blank_gives_empty_input_content() {
        let sections = split("\n\nout\n");
        assert_eq!(sections.input, lines(&["\n", "\n"]));
        assert_eq!(sections.expectation, lines(&["out\n"]));
    }

    #[test]
    fn test_only_first_boundary_switches() {
        let sections = split("in\n\n\nout1\n\n\nout2\n");
        assert_eq!(sections.input, lines(&["in\n", "\n", "\n"]));
        assert_eq!(
            sections.expectation,
            lines(&["out1\n", "\n", "\n", "out2\n"])
        );
    }

    #[test]
    fn test_three_blank_lines_third_goes_to_expectation() {
        let sections = split("in\n\n\n\nout\n");
        assert_eq!(sections.input.len(), 3);
        assert_eq!(sections.expectation, lines(&["\n", "out\n"]));
    }

    #[test]
    fn test_whitespace_line_is_not_blank() {
        let sections = split("in\n \n\nout\n");
        assert!(!sections.has_boundary);
    }

    #[test]
    fn test_crlf_blank_lines_count() {
        let sections = split("in\r\n\r\n\r\nout\r\n");
        assert!(sections.has_boundary);
        assert_eq!(sections.golden_lines(), lines(&["out"]));
    }

    // ===========================================
    // Section accessors
    // ===========================================

    #[test]
    fn test_input_text_is_verbatim() {
        let sections = split("-- @query q()\nSELECT 1;\n\n\nrows: 1\n");
        assert_eq!(sections.input_text(), "-- @query q()\nSELECT 1;\n\n\n");
    }

    #[test]
    fn test_golden_lines_strip_newline_only() {
        let sections = split("in\n\n\n  indented  \nlast");
        assert_eq!(sections.golden_lines(), lines(&["  indented  ", "last"]));
    }

    #[test]
    fn test_golden_lines_drop_every_trailing_carriage_return() {
        let sections = split("in\n\n\na\r\r\nb\r\n");
        assert_eq!(sections.golden_lines(), lines(&["a", "b"]));
    }

    #[test]
    fn test_fixture_parse_keeps_path() {
        let fixture = Fixture::parse(Path::new("golden/a.t"), "x\n\n\ny\n");
        assert_eq!(fixture.path, PathBuf::from("golden/a.t"));
        assert_eq!(fixture.sections.golden_lines(), lines(&["y"]));
    }
}
