use std::sync::Arc;

use crate::compile::Step;
use crate::task::{Task, TaskAction, TaskError};

use super::events::{Event, EventSink, Operation, StdoutEventSink};
use super::result::{ExecutionError, ExecutionReport};

/// Walks a compiled step sequence for one operation: fail-fast across steps
/// and tasks, with every touched task finalized immediately after its
/// terminal action. The one exception is destroy's credential tasks, whose
/// working directories must outlive the teardown that reads them.
pub struct Engine {
    events: Arc<dyn EventSink>,
}

impl Engine {
    pub fn new() -> Self {
        Self {
            events: Arc::new(StdoutEventSink),
        }
    }

    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Validate and plan every task, in declared order.
    pub async fn plan(&self, steps: &[Step]) -> Result<ExecutionReport, ExecutionError> {
        self.forward(Operation::Plan, steps).await
    }

    /// Validate and apply every task, in declared order.
    pub async fn apply(&self, steps: &[Step]) -> Result<ExecutionReport, ExecutionError> {
        self.forward(Operation::Apply, steps).await
    }

    /// Tear the platform down in two phases. Credential tasks are first
    /// re-applied and detached so dependent destroys can still reach their
    /// clusters; everything else is then destroyed in reverse step order so
    /// resources go before the clusters they live on. The refreshed
    /// credential tasks are retired last, on every exit path: their working
    /// directories hold the credentials the resource destroys read, so
    /// destroying or finalizing them any earlier would strand the resources
    /// they guard.
    pub async fn destroy(&self, steps: &mut [Step]) -> Result<ExecutionReport, ExecutionError> {
        let operation = Operation::Destroy;
        self.events
            .emit(Event::OperationStarted { operation })
            .await;
        let mut report = ExecutionReport::default();
        let mut refreshed = Vec::new();

        let mut outcome = self.teardown(steps, &mut report, &mut refreshed).await;

        for (step_idx, task_idx) in refreshed {
            let task = steps[step_idx].tasks()[task_idx].as_ref();
            let destroyed = self.run_action(task, TaskAction::Destroy).await;
            self.finalize(task, &mut report).await;
            if outcome.is_ok() {
                outcome = self.settle(operation, destroyed, &mut report).await;
            }
        }
        outcome?;

        self.events
            .emit(Event::OperationFinished {
                operation,
                succeeded: true,
            })
            .await;
        Ok(report)
    }

    /// Phase 1 refreshes and detaches every credential task; phase 2 tears
    /// everything else down in reverse step order. `refreshed` collects the
    /// positions of credential tasks whose re-apply succeeded, for the
    /// caller to destroy and finalize once teardown is over.
    async fn teardown(
        &self,
        steps: &mut [Step],
        report: &mut ExecutionReport,
        refreshed: &mut Vec<(usize, usize)>,
    ) -> Result<(), ExecutionError> {
        let operation = Operation::Destroy;

        // A failure while refreshing aborts the whole destroy; tearing
        // resources down without credentials would strand them.
        for (step_idx, step) in steps.iter_mut().enumerate() {
            for (task_idx, task) in step.tasks_mut().iter_mut().enumerate() {
                if !task.supplies_teardown_credentials() {
                    continue;
                }
                match self.refresh_credentials(task.as_mut()).await {
                    Ok(()) => refreshed.push((step_idx, task_idx)),
                    Err(e) => {
                        self.finalize(task.as_ref(), report).await;
                        return self.settle(operation, Err(e), report).await;
                    }
                }
            }
        }

        for step in steps.iter().rev() {
            for task in step.tasks() {
                if task.supplies_teardown_credentials() {
                    continue;
                }
                let outcome = self
                    .validate_then(task.as_ref(), TaskAction::Destroy)
                    .await;
                self.finalize(task.as_ref(), report).await;
                self.settle(operation, outcome, report).await?;
            }
        }
        Ok(())
    }

    async fn forward(
        &self,
        operation: Operation,
        steps: &[Step],
    ) -> Result<ExecutionReport, ExecutionError> {
        self.events
            .emit(Event::OperationStarted { operation })
            .await;
        let mut report = ExecutionReport::default();

        let terminal = match operation {
            Operation::Plan => TaskAction::Plan,
            Operation::Apply => TaskAction::Apply,
            Operation::Destroy => TaskAction::Destroy,
        };

        for step in steps {
            for task in step.tasks() {
                let outcome = self.validate_then(task.as_ref(), terminal).await;
                self.finalize(task.as_ref(), &mut report).await;
                self.settle(operation, outcome, &mut report).await?;
            }
        }

        self.events
            .emit(Event::OperationFinished {
                operation,
                succeeded: true,
            })
            .await;
        Ok(report)
    }

    /// Record one task outcome, emitting the operation failure event and
    /// propagating the error on the first failing task.
    async fn settle(
        &self,
        operation: Operation,
        outcome: Result<(), TaskError>,
        report: &mut ExecutionReport,
    ) -> Result<(), ExecutionError> {
        match outcome {
            Ok(()) => {
                report.record_success();
                Ok(())
            }
            Err(e) => {
                report.record_failure();
                self.events
                    .emit(Event::OperationFinished {
                        operation,
                        succeeded: false,
                    })
                    .await;
                Err(ExecutionError::Task(e))
            }
        }
    }

    async fn validate_then(
        &self,
        task: &dyn Task,
        terminal: TaskAction,
    ) -> Result<(), TaskError> {
        self.run_action(task, TaskAction::Validate).await?;
        self.run_action(task, terminal).await
    }

    async fn refresh_credentials(&self, task: &mut dyn Task) -> Result<(), TaskError> {
        self.run_action(task, TaskAction::Validate).await?;
        self.run_action(task, TaskAction::Apply).await?;
        task.detach_provider();
        Ok(())
    }

    async fn run_action(&self, task: &dyn Task, action: TaskAction) -> Result<(), TaskError> {
        self.events
            .emit(Event::TaskStarted {
                task: task.name().to_string(),
                action,
            })
            .await;

        let result = match action {
            TaskAction::Validate => task.validate().await,
            TaskAction::Plan => task.plan().await,
            TaskAction::Apply => task.apply().await,
            TaskAction::Destroy => task.destroy().await,
            TaskAction::Finalize => task.finalize().await,
        };

        match &result {
            Ok(()) => {
                self.events
                    .emit(Event::TaskSucceeded {
                        task: task.name().to_string(),
                        action,
                    })
                    .await;
            }
            Err(e) => {
                self.events
                    .emit(Event::TaskFailed {
                        task: task.name().to_string(),
                        action,
                        error: e.to_string(),
                    })
                    .await;
            }
        }
        result
    }

    /// Cleanup runs once per touched task, right after its terminal action.
    /// Failures are reported and counted but never escalate.
    async fn finalize(&self, task: &dyn Task, report: &mut ExecutionReport) {
        if let Err(e) = task.finalize().await {
            report.record_finalize_failure();
            self.events
                .emit(Event::FinalizeFailed {
                    task: task.name().to_string(),
                    error: e.to_string(),
                })
                .await;
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
