//! Subject process invocation.
//!
//! Runs the code generator under test with the fixture input on stdin and
//! captures its complete stdout and stderr. Spawn, capture, timeout and
//! interrupt failures are returned as `SubjectError` values so the reporter
//! can bail out cleanly instead of the harness crashing.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fmt;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::RwLock;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::fixture::line_content;
use crate::signal::InterruptCheck;
use crate::sleeper::{Sleeper, POLL_INTERVAL};

/// Subject binary used when none is configured; built ahead of time by cargo.
pub const DEFAULT_SUBJECT_BIN: &str = "target/debug/querybinder";

/// Debug-target codegen, reading the source from stdin.
pub const SUBJECT_ARGS: [&str; 2] = ["--target=debug", "-"];

/// Environment variable enabling panic backtraces in the subject.
pub const BACKTRACE_VAR: &str = "RUST_BACKTRACE";

/// One of the child's standard streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdin,
    Stdout,
    Stderr,
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stream::Stdin => "stdin",
            Stream::Stdout => "stdout",
            Stream::Stderr => "stderr",
        };
        f.write_str(name)
    }
}

/// Errors from running the subject.
#[derive(Debug, Error)]
pub enum SubjectError {
    #[error("failed to spawn {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to capture subject {stream}: {source}")]
    Capture {
        stream: Stream,
        #[source]
        source: io::Error,
    },

    #[error("subject {stream} is not valid UTF-8")]
    Encoding { stream: Stream },

    #[error("failed to wait for subject: {0}")]
    Wait(#[source] io::Error),

    #[error("subject did not exit within {0:?}")]
    Timeout(Duration),

    #[error("interrupted while waiting for subject")]
    Interrupted,
}

/// Everything the subject printed, each stream buffered in full.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code, `None` when terminated by a signal.
    pub exit_code: Option<i32>,
}

impl CapturedOutput {
    pub fn new(stdout: &str, stderr: &str) -> Self {
        Self {
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            exit_code: Some(0),
        }
    }

    /// Stdout lines followed by stderr lines, without terminators.
    pub fn lines(&self) -> Vec<&str> {
        self.stdout
            .split_inclusive('\n')
            .chain(self.stderr.split_inclusive('\n'))
            .map(line_content)
            .collect()
    }
}

/// Trait for running the subject on one input.
pub trait Subject {
    fn run(&self, input: &str) -> Result<CapturedOutput, SubjectError>;
}

/// Program, arguments and environment for one subject invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectCommand {
    binary: PathBuf,
    args: Vec<OsString>,
    env: BTreeMap<String, String>,
}

impl SubjectCommand {
    /// The standard invocation: `<binary> --target=debug -` with backtraces on.
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        let mut env = BTreeMap::new();
        env.insert(BACKTRACE_VAR.to_string(), "1".to_string());
        Self {
            binary: binary.into(),
            args: SUBJECT_ARGS.iter().map(OsString::from).collect(),
            env,
        }
    }

    /// Replace the argument list.
    pub fn with_args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<OsString>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Add or override one variable in the child's environment.
    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    /// Build the `Command`; the environment is set on the child only.
    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.binary);
        command.args(&self.args).envs(&self.env);
        command
    }
}

impl fmt::Display for SubjectCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.env {
            write!(f, "{}={} ", key, value)?;
        }
        write!(f, "{}", self.binary.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Runs the subject as a child process.
#[derive(Debug)]
pub struct ProcessSubject<S: Sleeper, C: InterruptCheck> {
    command: SubjectCommand,
    timeout: Option<Duration>,
    sleeper: S,
    interrupt: C,
}

impl<S: Sleeper, C: InterruptCheck> ProcessSubject<S, C> {
    pub fn new(command: SubjectCommand, sleeper: S, interrupt: C) -> Self {
        Self {
            command,
            timeout: None,
            sleeper,
            interrupt,
        }
    }

    /// Kill the subject if it has not exited after `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn command(&self) -> &SubjectCommand {
        &self.command
    }

    fn wait(&self, child: &mut Child) -> Result<ExitStatus, SubjectError> {
        let started = Instant::now();
        loop {
            // A terminal interrupt reaches the whole process group, so the
            // child may already be dead; its partial output is not a result.
            if self.interrupt.interrupted() {
                kill(child);
                return Err(SubjectError::Interrupted);
            }
            if let Some(status) = child.try_wait().map_err(SubjectError::Wait)? {
                return Ok(status);
            }
            if let Some(limit) = self.timeout {
                if started.elapsed() >= limit {
                    kill(child);
                    return Err(SubjectError::Timeout(limit));
                }
            }
            self.sleeper.sleep(POLL_INTERVAL);
        }
    }
}

impl<S: Sleeper, C: InterruptCheck> Subject for ProcessSubject<S, C> {
    fn run(&self, input: &str) -> Result<CapturedOutput, SubjectError> {
        let mut child = self
            .command
            .to_command()
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| SubjectError::Spawn {
                binary: self.command.binary.display().to_string(),
                source,
            })?;

        // Feed stdin and drain both pipes concurrently so neither side can
        // block on a full pipe buffer.
        let writer = spawn_writer(child.stdin.take(), input.as_bytes().to_vec());
        let stdout = spawn_reader(child.stdout.take());
        let stderr = spawn_reader(child.stderr.take());

        let status = self.wait(&mut child)?;

        match join(writer, Stream::Stdin) {
            Ok(()) => {}
            // The subject may exit without consuming all of its input.
            Err(SubjectError::Capture { source, .. })
                if source.kind() == io::ErrorKind::BrokenPipe => {}
            Err(e) => return Err(e),
        }

        Ok(CapturedOutput {
            stdout: decode(join(stdout, Stream::Stdout)?, Stream::Stdout)?,
            stderr: decode(join(stderr, Stream::Stderr)?, Stream::Stderr)?,
            exit_code: status.code(),
        })
    }
}

/// Scripted subject for tests.
#[derive(Debug)]
pub struct MockSubject {
    response: MockResponse,
    inputs: RwLock<Vec<String>>,
}

#[derive(Debug, Clone)]
enum MockResponse {
    Output(CapturedOutput),
    SpawnFailure(String),
    Timeout(Duration),
    Interrupted,
}

impl MockSubject {
    /// Subject that prints `stdout` and `stderr` and exits 0.
    pub fn output(stdout: &str, stderr: &str) -> Self {
        Self::with_response(MockResponse::Output(CapturedOutput::new(stdout, stderr)))
    }

    /// Subject whose binary cannot be found.
    pub fn missing_binary(binary: &str) -> Self {
        Self::with_response(MockResponse::SpawnFailure(binary.to_string()))
    }

    pub fn timing_out(after: Duration) -> Self {
        Self::with_response(MockResponse::Timeout(after))
    }

    pub fn interrupted() -> Self {
        Self::with_response(MockResponse::Interrupted)
    }

    fn with_response(response: MockResponse) -> Self {
        Self {
            response,
            inputs: RwLock::new(Vec::new()),
        }
    }

    /// Inputs received so far, in call order.
    pub fn inputs(&self) -> Vec<String> {
        self.inputs.read().unwrap().clone()
    }
}

impl Subject for MockSubject {
    fn run(&self, input: &str) -> Result<CapturedOutput, SubjectError> {
        self.inputs.write().unwrap().push(input.to_string());
        match &self.response {
            MockResponse::Output(output) => Ok(output.clone()),
            MockResponse::SpawnFailure(binary) => Err(SubjectError::Spawn {
                binary: binary.clone(),
                source: io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
            }),
            MockResponse::Timeout(after) => Err(SubjectError::Timeout(*after)),
            MockResponse::Interrupted => Err(SubjectError::Interrupted),
        }
    }
}

fn kill(child: &mut Child) {
    // Already exited is fine; reap either way.
    let _ = child.kill();
    let _ = child.wait();
}

fn spawn_writer<W>(pipe: Option<W>, data: Vec<u8>) -> JoinHandle<io::Result<()>>
where
    W: Write + Send + 'static,
{
    thread::spawn(move || {
        if let Some(mut pipe) = pipe {
            pipe.write_all(&data)?;
        }
        Ok(())
    })
}

fn spawn_reader<R>(pipe: Option<R>) -> JoinHandle<io::Result<Vec<u8>>>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buf)?;
        }
        Ok(buf)
    })
}

fn join<T>(handle: JoinHandle<io::Result<T>>, stream: Stream) -> Result<T, SubjectError> {
    let result = handle
        .join()
        .unwrap_or_else(|_| Err(io::Error::new(io::ErrorKind::Other, "pipe thread panicked")));
    result.map_err(|source| SubjectError::Capture { stream, source })
}

fn decode(bytes: Vec<u8>, stream: Stream) -> Result<String, SubjectError> {
    String::from_utf8(bytes).map_err(|_| SubjectError::Encoding { stream })
}
