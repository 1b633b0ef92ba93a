//! Diagnostics on stderr.
//!
//! Stdout is reserved for the TAP stream. Everything else is written to
//! stderr as `# ` comment lines, so a runner that merges both streams still
//! parses valid TAP.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// How much the harness reports, from the `-v` count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Faults only.
    Faults,
    /// Each pipeline stage (`-v`).
    Steps,
    /// Sizes and the exact subject command (`-vv`).
    Details,
}

impl From<u8> for Verbosity {
    fn from(count: u8) -> Self {
        match count {
            0 => Verbosity::Faults,
            1 => Verbosity::Steps,
            _ => Verbosity::Details,
        }
    }
}

pub trait Logger: Send + Sync {
    fn log(&self, level: Verbosity, message: &str);

    fn fault(&self, message: &str) {
        self.log(Verbosity::Faults, message);
    }

    fn step(&self, message: &str) {
        self.log(Verbosity::Steps, message);
    }

    fn detail(&self, message: &str) {
        self.log(Verbosity::Details, message);
    }
}

/// Writes every message at or below `shown` to stderr.
#[derive(Debug)]
pub struct StderrLogger {
    shown: Verbosity,
}

impl StderrLogger {
    pub fn new(shown: Verbosity) -> Self {
        Self { shown }
    }
}

impl Logger for StderrLogger {
    fn log(&self, level: Verbosity, message: &str) {
        if level > self.shown {
            return;
        }
        let mut err = io::stderr().lock();
        for line in message.lines() {
            let _ = writeln!(err, "# {}", line);
        }
    }
}

/// Keeps every message, whatever its level.
#[derive(Debug, Clone, Default)]
pub struct MockLogger {
    entries: Arc<Mutex<Vec<(Verbosity, String)>>>,
}

impl MockLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(Verbosity, String)> {
        self.entries.lock().unwrap().clone()
    }

    pub fn contains(&self, text: &str) -> bool {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .any(|(_, message)| message.contains(text))
    }
}

impl Logger for MockLogger {
    fn log(&self, level: Verbosity, message: &str) {
        self.entries
            .lock()
            .unwrap()
            .push((level, message.to_string()));
    }
}
