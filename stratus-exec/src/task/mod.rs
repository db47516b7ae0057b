mod barrier;
mod module;

use std::fmt;

use async_trait::async_trait;

pub use barrier::BarrierTask;
pub use module::ModuleTask;

use crate::runner::RunnerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAction {
    Validate,
    Plan,
    Apply,
    Destroy,
    Finalize,
}

impl TaskAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskAction::Validate => "validate",
            TaskAction::Plan => "plan",
            TaskAction::Apply => "apply",
            TaskAction::Destroy => "destroy",
            TaskAction::Finalize => "finalize",
        }
    }
}

impl fmt::Display for TaskAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// The tool's init/plan check failed.
    #[error("validation of {task} failed: {source}")]
    Validation {
        task: String,
        #[source]
        source: RunnerError,
    },
    /// A plan/apply/destroy subcommand failed.
    #[error("{action} of {task} failed: {source}")]
    Execution {
        task: String,
        action: TaskAction,
        #[source]
        source: RunnerError,
    },
    /// The working directory could not be prepared.
    #[error("could not prepare working directory for {task}: {source}")]
    Workspace {
        task: String,
        #[source]
        source: std::io::Error,
    },
    /// Working-directory cleanup failed; the engine logs this and moves on.
    #[error("cleanup of {task} failed: {source}")]
    Cleanup {
        task: String,
        #[source]
        source: std::io::Error,
    },
}

/// The unit of provisioning action. Steps group tasks; the engine only ever
/// talks to this trait and never inspects concrete variants.
#[async_trait]
pub trait Task: Send + Sync {
    fn id(&self) -> &str;
    fn name(&self) -> &str;

    /// True when this task materialises credentials that other tasks need
    /// while they are being destroyed. The engine re-applies such tasks
    /// before any teardown begins.
    fn supplies_teardown_credentials(&self) -> bool {
        false
    }

    /// Re-point the task at a neutral provider so destroying it does not
    /// require the cluster it was generated against.
    fn detach_provider(&mut self) {}

    async fn validate(&self) -> Result<(), TaskError>;
    async fn plan(&self) -> Result<(), TaskError>;
    async fn apply(&self) -> Result<(), TaskError>;
    async fn destroy(&self) -> Result<(), TaskError>;

    /// Best-effort cleanup. Failures are reported but never change the
    /// outcome of an operation.
    async fn finalize(&self) -> Result<(), TaskError>;
}
