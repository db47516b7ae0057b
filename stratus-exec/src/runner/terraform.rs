use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use super::output::{pump_lines, OutputChannel, OutputSink, StdioSink};
use super::{Invocation, RunnerError, ToolRunner};

const DEFAULT_BINARY: &str = "terraform";

/// Invokes the infrastructure-as-code binary, one subcommand per call,
/// multiplexing its output into the configured sink.
pub struct TerraformRunner {
    binary: String,
    sink: Arc<dyn OutputSink>,
    cancel: CancellationToken,
}

impl TerraformRunner {
    pub fn new() -> Self {
        Self {
            binary: DEFAULT_BINARY.to_string(),
            sink: Arc::new(StdioSink),
            cancel: CancellationToken::new(),
        }
    }

    /// Point the runner at a different binary, e.g. an OpenTofu install.
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn OutputSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Cancelling the token kills any in-flight invocation.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

impl Default for TerraformRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolRunner for TerraformRunner {
    async fn run(&self, invocation: &Invocation) -> Result<(), RunnerError> {
        if self.cancel.is_cancelled() {
            return Err(RunnerError::Cancelled);
        }

        let mut child = Command::new(&self.binary)
            .args(&invocation.args)
            .current_dir(&invocation.dir)
            .env_clear()
            .envs(invocation.environment())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(RunnerError::Spawn)?;

        let stdout = child.stdout.take().ok_or(RunnerError::Pipe("stdout"))?;
        let stderr = child.stderr.take().ok_or(RunnerError::Pipe("stderr"))?;

        let out = tokio::spawn(pump_lines(
            stdout,
            OutputChannel::Stdout,
            invocation.display_name.clone(),
            self.sink.clone(),
        ));
        let err = tokio::spawn(pump_lines(
            stderr,
            OutputChannel::Stderr,
            invocation.display_name.clone(),
            self.sink.clone(),
        ));

        let status = tokio::select! {
            status = child.wait() => status.map_err(RunnerError::Wait)?,
            _ = self.cancel.cancelled() => {
                let _ = child.kill().await;
                let _ = out.await;
                let _ = err.await;
                return Err(RunnerError::Cancelled);
            }
        };

        // Join both readers so every captured line lands before we report.
        let _ = out.await;
        let _ = err.await;

        if status.success() {
            Ok(())
        } else {
            Err(RunnerError::Exit {
                status: status.code().unwrap_or(-1),
            })
        }
    }
}
