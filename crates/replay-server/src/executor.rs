//! Boundary to the external simulator.
//!
//! [`Executor`] turns a program payload into a complete [`Trace`] in one
//! shot. [`ProcessExecutor`] is the production implementation: it spawns the
//! configured simulator binary, feeds the payload on stdin, and decodes a JSON
//! array of states from stdout, all within a bounded time budget.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use replay_core::{ExecutionError, Trace};

/// Default simulator time budget.
pub const DEFAULT_EXEC_TIMEOUT: Duration = Duration::from_secs(5);

/// Produces the full state trace for a program.
///
/// Implementations are invoked exactly once per load and must not retry.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, payload: &str) -> Result<Trace, ExecutionError>;
}

/// Runs a simulator binary as a child process.
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    program: PathBuf,
    args: Vec<String>,
    timeout: Duration,
}

impl ProcessExecutor {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        ProcessExecutor {
            program: program.into(),
            args: Vec::new(),
            timeout: DEFAULT_EXEC_TIMEOUT,
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &std::path::Path {
        &self.program
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl Executor for ProcessExecutor {
    async fn execute(&self, payload: &str) -> Result<Trace, ExecutionError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| {
            ExecutionError::ExecutorFailure(format!(
                "failed to start simulator '{}': {}",
                self.program.display(),
                e
            ))
        })?;

        // Feed stdin from its own task so a chatty child cannot deadlock on a
        // full stdout pipe while we are still writing.
        if let Some(mut stdin) = child.stdin.take() {
            let bytes = payload.as_bytes().to_vec();
            tokio::spawn(async move {
                if let Err(e) = stdin.write_all(&bytes).await {
                    // The child may exit without reading; its status decides.
                    tracing::debug!("simulator stdin closed early: {}", e);
                }
                let _ = stdin.shutdown().await;
            });
        }

        // Dropping the future on timeout drops the child, which kills it.
        let waited = tokio::time::timeout(self.timeout, child.wait_with_output()).await;
        let output = match waited {
            Ok(result) => result.map_err(|e| {
                ExecutionError::ExecutorFailure(format!(
                    "failed to collect simulator output: {}",
                    e
                ))
            })?,
            Err(_) => {
                return Err(ExecutionError::Timeout {
                    after: self.timeout,
                })
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let code = output
                .status
                .code()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string());
            return Err(ExecutionError::ExecutorFailure(format!(
                "exit status {}: {}",
                code, stderr
            )));
        }

        let trace = Trace::decode(&output.stdout)?;
        tracing::debug!(
            "simulator '{}' produced {} state(s)",
            self.program.display(),
            trace.len()
        );
        Ok(trace)
    }
}
