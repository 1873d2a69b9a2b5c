//! External tool execution.
//!
//! Everything the pipeline does happens by shelling out to external
//! tools, so the seam is here: [`ToolRunner`] is the one trait the
//! orchestration logic speaks, and [`SystemRunner`] is the only
//! implementation that actually spawns processes. Tests inject fakes to
//! exercise the orchestration without any real binaries.
//!
//! Every call is blocking with no timeout: a hung tool hangs the run.

use std::ffi::OsString;
use std::io;
use std::process::{Command, Stdio};

/// How a spawned tool's output streams are wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Inherit the parent's stdout and stderr.
    Inherit,
    /// Discard stdout and stderr (availability probes).
    Discard,
    /// Capture stdout; stderr stays inherited (selection export).
    Capture,
}

/// One external command: argv, environment overrides, and stream wiring.
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Program and arguments; `argv[0]` is the program.
    pub argv: Vec<String>,
    /// Environment variables set on the child on top of the inherited
    /// environment. The parent process environment is never mutated.
    pub env: Vec<(String, OsString)>,
    /// Output stream wiring.
    pub output: OutputMode,
    /// Whether stdin is redirected from the null device.
    pub null_stdin: bool,
}

impl Invocation {
    /// A command with inherited streams and no environment overrides.
    pub fn new(argv: Vec<String>) -> Self {
        Self {
            argv,
            env: Vec::new(),
            output: OutputMode::Inherit,
            null_stdin: false,
        }
    }

    /// Set environment overrides for the child.
    pub fn envs(mut self, vars: impl IntoIterator<Item = (String, OsString)>) -> Self {
        self.env.extend(vars);
        self
    }

    /// Set the output wiring.
    pub fn output(mut self, mode: OutputMode) -> Self {
        self.output = mode;
        self
    }

    /// Redirect stdin from the null device.
    pub fn null_stdin(mut self) -> Self {
        self.null_stdin = true;
        self
    }

    /// The command line as a single display string.
    pub fn display(&self) -> String {
        self.argv.join(" ")
    }
}

/// Exit state and captured stdout of a finished tool.
#[derive(Debug, Clone)]
pub struct Completed {
    /// Exit code; `None` when the child was killed by a signal.
    pub code: Option<i32>,
    /// Captured stdout. Empty unless the invocation asked for
    /// [`OutputMode::Capture`].
    pub stdout: Vec<u8>,
}

impl Completed {
    /// Whether the tool exited zero.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs external commands to completion.
pub trait ToolRunner {
    /// Spawn the command, block until it exits, and report how it went.
    ///
    /// # Errors
    ///
    /// Returns the OS error when the program cannot be spawned at all; a
    /// non-zero exit is NOT an error at this layer (callers decide what a
    /// failing exit means).
    fn run(&self, invocation: &Invocation) -> io::Result<Completed>;
}

/// The production runner: spawns real processes via `std::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> io::Result<Completed> {
        // Echo every command line, like a shell trace.
        tracing::info!("+ {}", invocation.display());

        let (program, args) = invocation
            .argv
            .split_first()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty command line"))?;

        let mut cmd = Command::new(program);
        cmd.args(args);
        for (key, value) in &invocation.env {
            cmd.env(key, value);
        }
        if invocation.null_stdin {
            cmd.stdin(Stdio::null());
        }

        match invocation.output {
            OutputMode::Inherit => {
                let status = cmd.status()?;
                Ok(Completed {
                    code: status.code(),
                    stdout: Vec::new(),
                })
            }
            OutputMode::Discard => {
                cmd.stdout(Stdio::null()).stderr(Stdio::null());
                let status = cmd.status()?;
                Ok(Completed {
                    code: status.code(),
                    stdout: Vec::new(),
                })
            }
            OutputMode::Capture => {
                cmd.stdout(Stdio::piped());
                let child = cmd.spawn()?;
                let output = child.wait_with_output()?;
                Ok(Completed {
                    code: output.status.code(),
                    stdout: output.stdout,
                })
            }
        }
    }
}
