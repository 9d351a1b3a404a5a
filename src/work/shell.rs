// src/work/shell.rs

//! Shell command work unit.

use std::process::Stdio;

use anyhow::{Context, anyhow};
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tokio::process::{Child, ChildStdout, Command};
use tracing::{debug, info};

use super::{StepFuture, WorkArgs, WorkSteps, WorkUnit, required_arg};

pub const SHELL: &str = "shell";

/// Runs the `cmd` argument through `sh -c` (`cmd /C` on Windows).
///
/// Steps: spawning the process is the first step, each stdout line is one
/// more, and the sequence ends when the process exits. A non-zero exit code
/// fails the step.
#[derive(Debug, Default)]
pub struct ShellWork;

impl WorkUnit for ShellWork {
    fn name(&self) -> &str {
        SHELL
    }

    fn start(&self, args: &WorkArgs) -> Box<dyn WorkSteps> {
        let state = match required_arg(args, "cmd") {
            Ok(cmd) => ShellState::NotStarted(cmd.to_string()),
            Err(err) => ShellState::Invalid(Some(err)),
        };
        Box::new(ShellSteps { state })
    }
}

enum ShellState {
    Invalid(Option<anyhow::Error>),
    NotStarted(String),
    Streaming {
        cmd: String,
        child: Child,
        lines: Option<Lines<BufReader<ChildStdout>>>,
    },
    Done,
}

struct ShellSteps {
    state: ShellState,
}

impl WorkSteps for ShellSteps {
    fn next_step(&mut self) -> StepFuture<'_> {
        Box::pin(async move {
            match std::mem::replace(&mut self.state, ShellState::Done) {
                ShellState::Invalid(err) => err.map(Err),
                ShellState::Done => None,
                ShellState::NotStarted(cmd) => match spawn(&cmd) {
                    Ok(mut child) => {
                        let lines = child.stdout.take().map(|out| BufReader::new(out).lines());
                        self.state = ShellState::Streaming { cmd, child, lines };
                        Some(Ok(()))
                    }
                    Err(err) => Some(Err(err)),
                },
                ShellState::Streaming {
                    cmd,
                    mut child,
                    mut lines,
                } => {
                    if let Some(reader) = lines.as_mut() {
                        match reader.next_line().await {
                            Ok(Some(line)) => {
                                debug!(cmd = %cmd, "stdout: {}", line);
                                self.state = ShellState::Streaming { cmd, child, lines };
                                return Some(Ok(()));
                            }
                            Ok(None) => {}
                            Err(err) => {
                                return Some(Err(anyhow!(err).context(format!(
                                    "reading stdout of `{cmd}`"
                                ))));
                            }
                        }
                    }
                    wait_for_exit(&cmd, &mut child).await.err().map(Err)
                }
            }
        })
    }
}

fn spawn(cmd: &str) -> anyhow::Result<Child> {
    let mut command = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd);
        c
    };

    command
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = command
        .spawn()
        .with_context(|| format!("spawning process for `{cmd}`"))?;

    // Always consume stderr so buffers don't fill; log at debug.
    if let Some(stderr) = child.stderr.take() {
        let cmd = cmd.to_string();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(cmd = %cmd, "stderr: {}", line);
            }
        });
    }

    info!(cmd = %cmd, "started shell process");
    Ok(child)
}

async fn wait_for_exit(cmd: &str, child: &mut Child) -> anyhow::Result<()> {
    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for process of `{cmd}`"))?;

    let code = status.code().unwrap_or(-1);
    info!(cmd = %cmd, exit_code = code, success = status.success(), "shell process exited");

    if status.success() {
        Ok(())
    } else {
        Err(anyhow!("`{cmd}` exited with code {code}"))
    }
}
