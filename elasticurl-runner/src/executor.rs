use elasticurl_core::{HarnessError, Invocation, Result, RunReport, RunnerConfig};
use std::io::Write;
use std::process::Stdio;
use std::time::Instant;
use chrono::Utc;
use tokio::process::Command;
use tokio::time::timeout;
use uuid::Uuid;
use tracing::{debug, error, info, warn};

#[cfg(unix)]
use crate::process::kill_process_group;
use crate::process::{combined_pipe, exit_code, CombinedOutput, DRAIN_GRACE};

/// Runs one command at a time under a fixed timeout
#[derive(Debug, Clone, Default)]
pub struct CommandExecutor {
    config: RunnerConfig,
}

impl CommandExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RunnerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Run `invocation` to completion, printing the command and its combined
    /// output to stdout if it fails or times out.
    pub async fn run_command(&self, invocation: &Invocation) -> Result<RunReport> {
        let mut stdout = std::io::stdout();
        self.run_command_with_output(invocation, &mut stdout).await
    }

    /// Like [`run_command`](Self::run_command), with failure output going to `out`.
    pub async fn run_command_with_output<W: Write>(
        &self,
        invocation: &Invocation,
        out: &mut W,
    ) -> Result<RunReport> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let start_instant = Instant::now();

        if let Ok(config) = serde_json::to_string(&self.config) {
            debug!(run_id = %run_id, config = %config, "Runner configuration");
        }

        let program = which::which(&invocation.program).map_err(|source| {
            HarnessError::BuildToolNotFound {
                program: invocation.program.clone(),
                source,
            }
        })?;

        info!(
            run_id = %run_id,
            command = %invocation,
            timeout_ms = self.config.timeout.as_millis() as u64,
            "Starting command"
        );

        let (reader, stdout, stderr) = combined_pipe()?;

        let mut cmd = Command::new(&program);
        cmd.args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(stderr)
            .kill_on_drop(true);
        if let Some(dir) = &self.config.working_directory {
            cmd.current_dir(dir);
        }
        // Own group, so a timeout can take down everything the child started.
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = cmd.spawn()?;
        // Releases the parent's copies of the pipe's write end.
        drop(cmd);

        let output = CombinedOutput::spawn(reader)?;

        let mut timed_out = false;
        let status = match timeout(self.config.timeout, child.wait()).await {
            Ok(status) => status?,
            Err(_) => {
                timed_out = true;
                warn!(
                    run_id = %run_id,
                    timeout_ms = self.config.timeout.as_millis() as u64,
                    "Command timed out, killing it"
                );
                #[cfg(unix)]
                {
                    if let Some(pid) = child.id() {
                        if let Err(e) = kill_process_group(pid) {
                            warn!(run_id = %run_id, error = %e, "Failed to kill process group");
                        }
                    }
                }
                if let Err(e) = child.kill().await {
                    warn!(run_id = %run_id, error = %e, "Failed to kill timed out command");
                }
                child.wait().await?
            }
        };

        let lines = output.drain(DRAIN_GRACE).await;
        let code = exit_code(&status);
        let duration_ms = start_instant.elapsed().as_millis() as u64;

        if code == 0 && !timed_out {
            info!(
                run_id = %run_id,
                duration_ms,
                output_lines = lines.len(),
                "Command completed"
            );

            return Ok(RunReport {
                id: run_id,
                command: invocation.command_line().to_string(),
                exit_code: code,
                output_lines: lines.len(),
                duration_ms,
                started_at,
                completed_at: Utc::now(),
            });
        }

        writeln!(out, "{}", invocation.command_line())?;
        for line in &lines {
            writeln!(out, "{}", line)?;
        }
        out.flush()?;

        let err = if timed_out {
            HarnessError::Timeout {
                timeout: self.config.timeout,
                command: invocation.command_line().to_string(),
            }
        } else {
            HarnessError::NonZeroExit {
                code,
                command: invocation.command_line().to_string(),
            }
        };

        error!(
            run_id = %run_id,
            exit_code = code,
            timed_out,
            duration_ms,
            error = %err,
            "Command failed"
        );

        Err(err)
    }
}
