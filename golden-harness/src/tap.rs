//! TAP v12 output.
//!
//! The harness reports exactly one test: a plan line, the diff on failure,
//! then `ok 1` or `not ok 1 - <description>`. Faults that prevent a verdict
//! are reported with `Bail out!`. Every line is flushed as it is written so a
//! driving runner sees progress even if the harness is killed.

use std::io::{self, Write};

use crate::diff::Diff;

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const RESET: &str = "\x1b[0m";

/// Writes TAP lines to an output stream.
#[derive(Debug)]
pub struct TapReporter<W: Write> {
    out: W,
    color: bool,
}

impl<W: Write> TapReporter<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    /// `1..<count>`
    pub fn plan(&mut self, count: usize) -> io::Result<()> {
        self.line(&format!("1..{}", count))
    }

    /// Every diff line, removals red and additions green.
    pub fn diff(&mut self, diff: &Diff) -> io::Result<()> {
        for line in diff.lines() {
            let text = line.to_string();
            match self.color_for(&text) {
                Some(color) => self.line(&format!("{}{}{}", color, text, RESET))?,
                None => self.line(&text)?,
            }
        }
        Ok(())
    }

    pub fn ok(&mut self, number: usize) -> io::Result<()> {
        self.line(&format!("ok {}", number))
    }

    pub fn not_ok(&mut self, number: usize, description: &str) -> io::Result<()> {
        self.line(&format!("not ok {} - {}", number, one_line(description)))
    }

    /// Abort the whole run; TAP consumers stop reading after this.
    pub fn bail_out(&mut self, reason: &str) -> io::Result<()> {
        self.line(&format!("Bail out! {}", one_line(reason)))
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn color_for(&self, text: &str) -> Option<&'static str> {
        if !self.color {
            return None;
        }
        if text.starts_with('-') {
            Some(RED)
        } else if text.starts_with('+') {
            Some(GREEN)
        } else {
            None
        }
    }

    fn line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{}", text)?;
        self.out.flush()
    }
}

/// TAP directives are line-based; fold embedded newlines.
fn one_line(text: &str) -> String {
    text.lines().collect::<Vec<_>>().join(" ")
}
