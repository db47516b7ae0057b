use async_trait::async_trait;
use serde_json::json;

use crate::task::TaskAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Plan,
    Apply,
    Destroy,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Plan => "plan",
            Operation::Apply => "apply",
            Operation::Destroy => "destroy",
        }
    }
}

#[derive(Debug, Clone)]
pub enum Event {
    OperationStarted {
        operation: Operation,
    },
    OperationFinished {
        operation: Operation,
        succeeded: bool,
    },
    TaskStarted {
        task: String,
        action: TaskAction,
    },
    TaskSucceeded {
        task: String,
        action: TaskAction,
    },
    TaskFailed {
        task: String,
        action: TaskAction,
        error: String,
    },
    FinalizeFailed {
        task: String,
        error: String,
    },
}

#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, event: Event);
}

/// Emits one JSON line per event to stdout.
pub struct StdoutEventSink;

#[async_trait]
impl EventSink for StdoutEventSink {
    async fn emit(&self, event: Event) {
        let json = match event {
            Event::OperationStarted { operation } => {
                json!({ "type": "operation.started", "operation": operation.as_str() })
            }
            Event::OperationFinished {
                operation,
                succeeded,
            } => {
                json!({ "type": "operation.finished", "operation": operation.as_str(), "succeeded": succeeded })
            }
            Event::TaskStarted { task, action } => {
                json!({ "type": "task.started", "task": task, "action": action.as_str() })
            }
            Event::TaskSucceeded { task, action } => {
                json!({ "type": "task.succeeded", "task": task, "action": action.as_str() })
            }
            Event::TaskFailed {
                task,
                action,
                error,
            } => {
                json!({ "type": "task.failed", "task": task, "action": action.as_str(), "error": error })
            }
            Event::FinalizeFailed { task, error } => {
                json!({ "type": "finalize.failed", "task": task, "error": error })
            }
        };
        println!("{}", serde_json::to_string(&json).unwrap_or_default());
    }
}

pub struct NoOpEventSink;

#[async_trait]
impl EventSink for NoOpEventSink {
    async fn emit(&self, _event: Event) {}
}
