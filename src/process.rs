use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::error::AssistantError;

/// Captured result of a finished subprocess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was killed by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    pub fn code(&self) -> i32 {
        self.status.unwrap_or(-1)
    }
}

/// Everything needed to run one external program to completion.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub dir: PathBuf,
    /// Applied on top of the inherited environment.
    pub env: BTreeMap<String, String>,
    pub stdin: Option<Vec<u8>>,
    pub timeout: Duration,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>, dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            dir: dir.into(),
            env: BTreeMap::new(),
            stdin: None,
            timeout: Duration::from_secs(600),
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, env: &BTreeMap<String, String>) -> Self {
        self.env.extend(env.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    pub fn stdin(mut self, input: impl Into<Vec<u8>>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Human-readable command line, used in logs and error messages.
    pub fn display(&self) -> String {
        let program = self
            .program
            .file_stem()
            .unwrap_or_else(|| self.program.as_os_str())
            .to_string_lossy();
        if self.args.is_empty() {
            program.into_owned()
        } else {
            format!("{} {}", program, self.args.join(" "))
        }
    }

    pub async fn run(&self) -> Result<CommandOutput, AssistantError> {
        let command_line = self.display();
        tracing::info!(command = %command_line, dir = %self.dir.display(), "running command");

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .current_dir(&self.dir)
            .envs(&self.env)
            .stdin(if self.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn()?;

        let stdin_pipe = child.stdin.take();
        let input = self.stdin.as_deref().unwrap_or_default();
        let feed = async move {
            if let Some(mut pipe) = stdin_pipe {
                if let Err(e) = pipe.write_all(input).await {
                    tracing::debug!(error = %e, "child closed stdin early");
                }
                // Dropping the pipe closes stdin so the child sees EOF.
            }
        };
        // Stdin is fed while output is collected, both under the timeout.
        let finished = async move {
            let ((), output) = tokio::join!(feed, child.wait_with_output());
            output
        };

        let output = match tokio::time::timeout(self.timeout, finished).await {
            Ok(result) => result?,
            Err(_) => {
                tracing::warn!(command = %command_line, "command timed out");
                return Err(AssistantError::Timeout {
                    command: command_line,
                    seconds: self.timeout.as_secs(),
                });
            }
        };

        let result = CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        tracing::debug!(
            command = %command_line,
            status = ?result.status,
            stdout_len = result.stdout.len(),
            stderr_len = result.stderr.len(),
            "command finished"
        );

        Ok(result)
    }

    /// Like [`Invocation::run`], but a non-zero exit becomes
    /// [`AssistantError::CommandFailed`].
    pub async fn run_checked(&self) -> Result<CommandOutput, AssistantError> {
        let output = self.run().await?;
        if output.success() {
            return Ok(output);
        }

        let stderr = if output.stderr.trim().is_empty() {
            output.stdout.clone()
        } else {
            output.stderr.clone()
        };
        Err(AssistantError::CommandFailed {
            command: self.display(),
            code: output.code(),
            stderr,
        })
    }
}

/// Search `PATH` for an executable called `binary`.
pub fn find_on_path(binary: impl AsRef<OsStr>) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    find_in_search_path(binary.as_ref(), &path)
}

/// Search a `PATH`-style list of directories.
pub fn find_in_search_path(binary: &OsStr, search_path: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(search_path).find_map(|dir| executable_in(&dir, binary))
}

pub(crate) fn executable_in(dir: &Path, binary: &OsStr) -> Option<PathBuf> {
    let candidate = dir.join(binary);
    if candidate.is_file() {
        return Some(candidate);
    }
    if cfg!(windows) {
        let exe = candidate.with_extension("exe");
        if exe.is_file() {
            return Some(exe);
        }
    }
    None
}
