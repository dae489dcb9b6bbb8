//! Subprocess execution for gcloud invocations

use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use log::{debug, warn};
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::time::timeout;

use crate::error::{Result, SwitchError};

/// Captured result of one finished invocation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandOutput {
    /// Exit code; `None` when terminated by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs gcloud with the given arguments
///
/// Implementations must terminate the child and return
/// [`SwitchError::Timeout`] once `limit` elapses.
pub trait CommandRunner: Send + Sync {
    /// Program name used in messages, e.g. `gcloud`
    fn program(&self) -> String;

    fn run(
        &self,
        args: &[String],
        limit: Duration,
    ) -> impl Future<Output = Result<CommandOutput>> + Send;

    /// Human readable command line for logs and error messages
    fn display(&self, args: &[String]) -> String {
        let mut line = self.program();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// Runs gcloud as a real child process
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    program: PathBuf,
}

impl ProcessRunner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program_path(&self) -> &Path {
        &self.program
    }
}

impl CommandRunner for ProcessRunner {
    fn program(&self) -> String {
        self.program.display().to_string()
    }

    async fn run(&self, args: &[String], limit: Duration) -> Result<CommandOutput> {
        let command = self.display(args);
        debug!("Running `{}` (limit {:?})", command, limit);

        let mut child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| SwitchError::Process {
                command: command.clone(),
                code: None,
                stderr: format!("could not start process: {}", e),
            })?;

        let mut stdout_pipe = child
            .stdout
            .take()
            .ok_or_else(|| SwitchError::Io(format!("`{}`: stdout not captured", command)))?;
        let mut stderr_pipe = child
            .stderr
            .take()
            .ok_or_else(|| SwitchError::Io(format!("`{}`: stderr not captured", command)))?;

        let finished = timeout(limit, async {
            let mut stdout = Vec::new();
            let mut stderr = Vec::new();
            let (out, err) = tokio::join!(
                stdout_pipe.read_to_end(&mut stdout),
                stderr_pipe.read_to_end(&mut stderr)
            );
            out?;
            err?;
            let status = child.wait().await?;
            Ok::<_, std::io::Error>((status, stdout, stderr))
        })
        .await;

        match finished {
            Ok(Ok((status, stdout, stderr))) => {
                let output = CommandOutput {
                    code: status.code(),
                    stdout: String::from_utf8_lossy(&stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&stderr).into_owned(),
                };
                debug!("`{}` exited with {:?}", command, output.code);
                Ok(output)
            }
            Ok(Err(e)) => Err(SwitchError::Io(format!("`{}`: {}", command, e))),
            Err(_) => {
                warn!("`{}` exceeded {:?}, terminating", command, limit);
                // kill() also reaps the child
                if let Err(e) = child.kill().await {
                    warn!("Failed to terminate `{}`: {}", command, e);
                }
                Err(SwitchError::Timeout { command, limit })
            }
        }
    }
}


#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Instant;

    fn args(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_captures_stdout_stderr_and_code() {
        let runner = ProcessRunner::new("sh");
        let output = runner
            .run(
                &args(&["-c", "echo out; echo err >&2; exit 3"]),
                Duration::from_secs(5),
            )
            .await
            .unwrap();
        assert_eq!(output.code, Some(3));
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
        assert!(!output.success());
    }

    #[tokio::test]
    async fn test_missing_program_is_process_error() {
        let runner = ProcessRunner::new("/nonexistent/gcloud-binary");
        let err = runner
            .run(&args(&["version"]), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, SwitchError::Process { code: None, .. }));
    }

    #[tokio::test]
    async fn test_timeout_terminates_child() {
        let dir = tempfile::TempDir::new().unwrap();
        let pid_file = dir.path().join("pid");
        let script = format!("echo $$ > {}; exec sleep 30", pid_file.display());
        let runner = ProcessRunner::new("sh");

        let started = Instant::now();
        let err = runner
            .run(&args(&["-c", &script]), Duration::from_millis(500))
            .await
            .unwrap_err();

        assert!(matches!(err, SwitchError::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(10));

        let pid = std::fs::read_to_string(&pid_file).unwrap();
        let status = std::process::Command::new("kill")
            .args(["-0", pid.trim()])
            .stderr(Stdio::null())
            .status()
            .unwrap();
        assert!(!status.success(), "process {} still alive", pid.trim());
    }

    #[test]
    fn test_display_joins_args() {
        let runner = ProcessRunner::new("gcloud");
        assert_eq!(
            runner.display(&args(&["config", "set", "project", "p1"])),
            "gcloud config set project p1"
        );
    }
}
