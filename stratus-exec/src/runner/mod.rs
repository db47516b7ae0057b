mod output;
mod terraform;

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;

pub use output::{OutputChannel, OutputSink, StdioSink};
pub use terraform::TerraformRunner;

/// One invocation of the external tool: a subcommand run in a task's
/// working directory with an assembled environment.
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Task display name, used to prefix every captured output line.
    pub display_name: String,
    pub args: Vec<String>,
    pub dir: PathBuf,
    /// Plain environment overlay applied on top of the inherited environment.
    pub env: BTreeMap<String, String>,
    /// Tool variables, handed to the tool as `TF_VAR_<key>=<value>`.
    pub variables: BTreeMap<String, String>,
}

impl Invocation {
    /// Inherited process environment, then the overlay, then the prefixed
    /// tool variables. Later entries win when keys collide; inherited
    /// entries that are not valid Unicode are skipped.
    pub fn environment(&self) -> Vec<(String, String)> {
        let mut merged: Vec<(String, String)> = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        merged.extend(self.env.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged.extend(
            self.variables
                .iter()
                .map(|(k, v)| (format!("TF_VAR_{k}"), v.clone())),
        );
        merged
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("could not start process: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("could not attach to process {0}")]
    Pipe(&'static str),
    #[error("error waiting for process: {0}")]
    Wait(#[source] std::io::Error),
    #[error("process exited with status {status}")]
    Exit { status: i32 },
    #[error("invocation cancelled")]
    Cancelled,
}

#[async_trait]
pub trait ToolRunner: Send + Sync {
    /// Run one invocation to completion. A single call is a single attempt;
    /// no retry happens at this layer.
    async fn run(&self, invocation: &Invocation) -> Result<(), RunnerError>;
}
