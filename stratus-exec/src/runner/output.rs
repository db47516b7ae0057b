use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputChannel {
    Stdout,
    Stderr,
}

/// Destination for captured tool output, one completed line at a time.
#[async_trait]
pub trait OutputSink: Send + Sync {
    async fn line(&self, channel: OutputChannel, task: &str, line: &str);
}

/// Writes `[task] line` to this process's own stdout/stderr.
pub struct StdioSink;

#[async_trait]
impl OutputSink for StdioSink {
    async fn line(&self, channel: OutputChannel, task: &str, line: &str) {
        match channel {
            OutputChannel::Stdout => println!("{}", prefixed(task, line)),
            OutputChannel::Stderr => eprintln!("{}", prefixed(task, line)),
        }
    }
}

pub(crate) fn prefixed(task: &str, line: &str) -> String {
    format!("[{task}] {line}")
}

/// Pump one output stream line by line into the sink. Stops cleanly at
/// end-of-stream; any other read error is reported as an error line and
/// terminates the reader.
pub(crate) async fn pump_lines<R>(
    reader: R,
    channel: OutputChannel,
    task: String,
    sink: Arc<dyn OutputSink>,
) where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim();
                if !line.is_empty() {
                    sink.line(channel, &task, line).await;
                }
            }
            Ok(None) => return,
            Err(e) => {
                sink.line(channel, &task, &format!("Error: {e}")).await;
                return;
            }
        }
    }
}
