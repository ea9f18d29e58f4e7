//! External process execution with a hard timeout.
//!
//! Every renderer in this crate is an opaque external binary (pygmentize,
//! pandoc, a headless browser, a TeX engine). This module is the single place
//! that spawns them, so spawn failures, non-zero exits and hung renderers all
//! come back as one [`CommandError`] type with the captured output attached.
//!
//! The child is spawned with `kill_on_drop(true)`: when the timeout fires the
//! `wait_with_output` future is dropped and tokio kills the process, so a
//! wedged browser never outlives its attempt.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

/// Why an external command did not succeed.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The binary does not exist (or is not on `PATH`).
    #[error("'{program}' not found; is it installed and on PATH?")]
    NotFound { program: String },

    /// The process ran and exited unsuccessfully.
    #[error("'{program}' exited with {}: {}", exit_label(.code), tail(.stderr, .stdout))]
    NonZeroExit {
        program: String,
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    /// The process was still running when the timeout elapsed and was killed.
    #[error("'{program}' timed out after {secs}s")]
    TimedOut { program: String, secs: u64 },

    /// Spawning or waiting failed for another reason.
    #[error("'{program}' could not be run: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Captured output of a successful run.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub elapsed_ms: u64,
}

/// One external invocation: program, arguments, working directory.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    program: PathBuf,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Program name as shown in logs and errors.
    pub fn program_name(&self) -> String {
        self.program.display().to_string()
    }

    /// Shell-ish rendering for debug logs. Not meant to be re-parsed.
    pub fn display(&self) -> String {
        let mut line = self.program_name();
        for a in &self.args {
            line.push(' ');
            line.push_str(&a.to_string_lossy());
        }
        line
    }
}

/// Run `spec` to completion, failing if it exceeds `timeout`.
pub async fn run(spec: &CommandSpec, timeout: Duration) -> Result<CommandOutput, CommandError> {
    let program = spec.program_name();
    let start = Instant::now();
    debug!(command = %spec.display(), "Running external command");

    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(ref dir) = spec.cwd {
        cmd.current_dir(dir);
    }

    let child = cmd.spawn().map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            CommandError::NotFound {
                program: program.clone(),
            }
        } else {
            CommandError::Io {
                program: program.clone(),
                source: e,
            }
        }
    })?;

    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            return Err(CommandError::Io {
                program,
                source: e,
            })
        }
        Err(_) => {
            warn!(
                program = %program,
                secs = timeout.as_secs(),
                "External command timed out; killed"
            );
            return Err(CommandError::TimedOut {
                program,
                secs: timeout.as_secs(),
            });
        }
    };

    let elapsed_ms = start.elapsed().as_millis() as u64;
    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if !output.status.success() {
        let code = output.status.code();
        warn!(
            program = %program,
            exit_code = code.map(i64::from).unwrap_or(-1),
            elapsed_ms,
            stderr = %stderr.trim(),
            "External command failed"
        );
        return Err(CommandError::NonZeroExit {
            program,
            code,
            stdout,
            stderr,
        });
    }

    debug!(program = %program, elapsed_ms, "External command finished");
    Ok(CommandOutput {
        stdout,
        stderr,
        elapsed_ms,
    })
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {c}"),
        None => "a signal".to_string(),
    }
}

/// Last few lines of whichever stream has content; TeX engines write their
/// errors to stdout, most other tools to stderr.
fn tail(stderr: &str, stdout: &str) -> String {
    let source = if stderr.trim().is_empty() {
        stdout
    } else {
        stderr
    };
    let lines: Vec<&str> = source.trim().lines().collect();
    let start = lines.len().saturating_sub(5);
    lines[start..].join(" | ")
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_stdout_on_success() {
        let spec = CommandSpec::new("sh").args(["-c", "echo hello"]);
        let out = run(&spec, Duration::from_secs(10)).await.expect("sh runs");
        assert_eq!(out.stdout.trim(), "hello");
    }

    #[tokio::test]
    async fn non_zero_exit_carries_output() {
        let spec = CommandSpec::new("sh").args(["-c", "echo broken >&2; exit 3"]);
        let err = run(&spec, Duration::from_secs(10)).await.unwrap_err();
        match err {
            CommandError::NonZeroExit { code, ref stderr, .. } => {
                assert_eq!(code, Some(3));
                assert!(stderr.contains("broken"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_binary_is_not_found() {
        let spec = CommandSpec::new("/definitely/not/a/renderer");
        let err = run(&spec, Duration::from_secs(10)).await.unwrap_err();
        assert!(matches!(err, CommandError::NotFound { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn hung_process_times_out() {
        let spec = CommandSpec::new("sleep").arg("30");
        let start = Instant::now();
        let err = run(&spec, Duration::from_millis(200)).await.unwrap_err();
        assert!(matches!(err, CommandError::TimedOut { .. }), "got {err:?}");
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn runs_in_working_directory() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let spec = CommandSpec::new("sh")
            .args(["-c", "pwd"])
            .current_dir(dir.path());
        let out = run(&spec, Duration::from_secs(10)).await.expect("pwd");
        let reported = std::fs::canonicalize(out.stdout.trim()).expect("canonical");
        let expected = std::fs::canonicalize(dir.path()).expect("canonical");
        assert_eq!(reported, expected);
    }

    #[test]
    fn tail_prefers_stderr() {
        assert_eq!(tail("err", "out"), "err");
        assert_eq!(tail("  \n", "line1\nline2"), "line1 | line2");
    }
}
