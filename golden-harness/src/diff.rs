//! Line diff between actual and expected output.
//!
//! The edit script comes from `similar`'s linear-space Myers implementation,
//! grouped into hunks the way `diff -u` does: file headers, `@@` range
//! headers, then context, `-` and `+` lines.

use std::fmt;
use std::ops::Range;

use similar::{capture_diff_slices, group_diff_ops, Algorithm, DiffOp, DiffTag};

/// Default number of unchanged lines shown around each change.
pub const DEFAULT_CONTEXT: usize = 3;

/// Label for the left-hand (actual) side.
pub const ACTUAL_LABEL: &str = "actual";

/// Label for the right-hand (golden) side.
pub const GOLDEN_LABEL: &str = "golden";

/// Outcome of comparing actual output against the expectation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail,
}

/// A `@@ -a,b +c,d @@` header. Starts are zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HunkHeader {
    pub old_start: usize,
    pub old_len: usize,
    pub new_start: usize,
    pub new_len: usize,
}

impl fmt::Display for HunkHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "@@ -{} +{} @@",
            format_range(self.old_start, self.old_len),
            format_range(self.new_start, self.new_len)
        )
    }
}

/// One rendered line of a unified diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffLine {
    OldFile(String),
    NewFile(String),
    Hunk(HunkHeader),
    Context(String),
    /// Present only in the actual output.
    Removed(String),
    /// Present only in the expectation.
    Added(String),
}

impl DiffLine {
    pub fn is_change(&self) -> bool {
        matches!(self, DiffLine::Removed(_) | DiffLine::Added(_))
    }
}

impl fmt::Display for DiffLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffLine::OldFile(name) => write!(f, "--- {}", name),
            DiffLine::NewFile(name) => write!(f, "+++ {}", name),
            DiffLine::Hunk(header) => write!(f, "{}", header),
            DiffLine::Context(line) => write!(f, " {}", line),
            DiffLine::Removed(line) => write!(f, "-{}", line),
            DiffLine::Added(line) => write!(f, "+{}", line),
        }
    }
}

/// Unified diff between two line sequences.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diff {
    lines: Vec<DiffLine>,
}

impl Diff {
    pub fn lines(&self) -> &[DiffLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn removed(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| matches!(l, DiffLine::Removed(_)))
            .count()
    }

    pub fn added(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| matches!(l, DiffLine::Added(_)))
            .count()
    }

    pub fn verdict(&self) -> Verdict {
        if self.lines.iter().any(DiffLine::is_change) {
            Verdict::Fail
        } else {
            Verdict::Pass
        }
    }
}

/// Produces unified diffs with a fixed amount of context.
#[derive(Debug, Clone)]
pub struct DiffEngine {
    context: usize,
}

impl Default for DiffEngine {
    fn default() -> Self {
        Self::new(DEFAULT_CONTEXT)
    }
}

impl DiffEngine {
    pub fn new(context: usize) -> Self {
        // Hunk grouping doubles the radius.
        Self {
            context: context.min(usize::MAX / 2),
        }
    }

    /// Diff `actual` (old side) against `golden` (new side).
    pub fn diff<S: AsRef<str>>(&self, actual: &[S], golden: &[S]) -> Diff {
        let old: Vec<&str> = actual.iter().map(AsRef::as_ref).collect();
        let new: Vec<&str> = golden.iter().map(AsRef::as_ref).collect();

        let ops = capture_diff_slices(Algorithm::Myers, &old, &new);
        let hunks: Vec<Vec<DiffOp>> = group_diff_ops(ops, self.context)
            .into_iter()
            .filter(|hunk| hunk.iter().any(|op| op.tag() != DiffTag::Equal))
            .collect();
        if hunks.is_empty() {
            return Diff::default();
        }

        let mut lines = vec![
            DiffLine::OldFile(ACTUAL_LABEL.to_string()),
            DiffLine::NewFile(GOLDEN_LABEL.to_string()),
        ];
        for hunk in &hunks {
            lines.push(DiffLine::Hunk(hunk_header(hunk)));
            render_hunk(hunk, &old, &new, &mut lines);
        }

        Diff { lines }
    }
}

/// Context lines as they come; adjacent delete, insert and replace ops are
/// merged so every removal in a change block precedes its additions.
fn render_hunk(hunk: &[DiffOp], old: &[&str], new: &[&str], lines: &mut Vec<DiffLine>) {
    let mut pending: Option<(Range<usize>, Range<usize>)> = None;

    for op in hunk {
        let (tag, old_range, new_range) = op.as_tag_tuple();
        if tag == DiffTag::Equal {
            flush_change(pending.take(), old, new, lines);
            lines.extend(old[old_range].iter().map(|l| DiffLine::Context(l.to_string())));
        } else {
            pending = Some(match pending {
                Some((o, n)) => (o.start..old_range.end, n.start..new_range.end),
                None => (old_range, new_range),
            });
        }
    }
    flush_change(pending, old, new, lines);
}

fn flush_change(
    change: Option<(Range<usize>, Range<usize>)>,
    old: &[&str],
    new: &[&str],
    lines: &mut Vec<DiffLine>,
) {
    if let Some((removed, added)) = change {
        lines.extend(old[removed].iter().map(|l| DiffLine::Removed(l.to_string())));
        lines.extend(new[added].iter().map(|l| DiffLine::Added(l.to_string())));
    }
}

fn hunk_header(hunk: &[DiffOp]) -> HunkHeader {
    let (old_start, new_start) = hunk
        .first()
        .map(|op| (op.old_range().start, op.new_range().start))
        .unwrap_or_default();
    let (old_end, new_end) = hunk
        .last()
        .map(|op| (op.old_range().end, op.new_range().end))
        .unwrap_or_default();
    HunkHeader {
        old_start,
        old_len: old_end - old_start,
        new_start,
        new_len: new_end - new_start,
    }
}

/// Unified range notation: `start,len`, just `start` when `len == 1`, and
/// the line before the gap when the range is empty.
fn format_range(start: usize, len: usize) -> String {
    match len {
        0 => format!("{},0", start),
        1 => format!("{}", start + 1),
        _ => format!("{},{}", start + 1, len),
    }
}
