use crate::task::TaskError;

/// Counters for one completed (or aborted) operation. Step-scoped progress
/// is only visible through the emitted events and log lines.
#[derive(Debug, Clone, Default)]
pub struct ExecutionReport {
    pub succeeded_tasks: usize,
    pub failed_tasks: usize,
    pub finalize_failures: usize,
}

impl ExecutionReport {
    pub fn record_success(&mut self) {
        self.succeeded_tasks += 1;
    }

    pub fn record_failure(&mut self) {
        self.failed_tasks += 1;
    }

    pub fn record_finalize_failure(&mut self) {
        self.finalize_failures += 1;
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    /// The first failing task aborts the remaining work of an operation.
    #[error(transparent)]
    Task(#[from] TaskError),
}
