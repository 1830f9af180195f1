//! Sequential task execution with suspension and per-plan failure isolation.
//!
//! The executor runs a plan's tasks strictly in order against the session's
//! documents. A mutating task's output becomes the next task's input. A
//! request task suspends the plan; the executor then refuses new plans until
//! [`TaskExecutor::resume`] is called with a freshly derived plan. A failed
//! task skips the rest of its plan and leaves the executor idle.

use std::sync::Arc;

use folio_ai::CompletionService;
use tokio::sync::broadcast;

use crate::actions::{self, ActionContext, ActionOutcome, Effect, SuspensionRequest};
use crate::catalog::{ActionKind, Catalog};
use crate::config::EngineConfig;
use crate::document::{DocumentLibrary, DocumentSet, Rasterizer};
use crate::error::{Error, Result};
use crate::events::SessionEvent;
use crate::plan::{Plan, Task, TaskAction};

/// A plan paused at a request task
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSuspension {
    pub request: SuspensionRequest,
    /// Tasks after the request that were not run. Kept only to describe them
    /// in the continuation message; they are never executed from here.
    pub remaining: Vec<Task>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExecutorState {
    Idle,
    Running,
    Suspended(PendingSuspension),
}

/// How a plan run ended
#[derive(Debug, Clone, PartialEq)]
pub enum RunStatus {
    Completed,
    Suspended(SuspensionRequest),
    Aborted { action: String, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub status: RunStatus,
    /// Tasks that finished successfully
    pub tasks_run: usize,
}

pub struct TaskExecutor {
    library: Arc<dyn DocumentLibrary>,
    rasterizer: Arc<dyn Rasterizer>,
    service: Arc<dyn CompletionService>,
    catalog: Catalog,
    config: EngineConfig,
    event_tx: broadcast::Sender<SessionEvent>,
    state: ExecutorState,
}

impl TaskExecutor {
    pub fn new(
        library: Arc<dyn DocumentLibrary>,
        rasterizer: Arc<dyn Rasterizer>,
        service: Arc<dyn CompletionService>,
        config: EngineConfig,
        event_tx: broadcast::Sender<SessionEvent>,
    ) -> Self {
        Self {
            library,
            rasterizer,
            service,
            catalog: Catalog::new(),
            config,
            event_tx,
            state: ExecutorState::Idle,
        }
    }

    pub fn state(&self) -> &ExecutorState {
        &self.state
    }

    pub fn pending(&self) -> Option<&PendingSuspension> {
        match &self.state {
            ExecutorState::Suspended(pending) => Some(pending),
            _ => None,
        }
    }

    pub fn is_suspended(&self) -> bool {
        matches!(self.state, ExecutorState::Suspended(_))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Run a new plan. Refused while a suspension is pending.
    pub async fn run(&mut self, plan: &Plan, documents: &mut DocumentSet) -> Result<RunReport> {
        if self.is_suspended() {
            return Err(Error::AwaitingInput);
        }
        Ok(self.execute(plan, documents).await)
    }

    /// Continue after the operator supplied the requested input, with the plan
    /// derived from the continuation message.
    pub async fn resume(&mut self, plan: &Plan, documents: &mut DocumentSet) -> Result<RunReport> {
        if !self.is_suspended() {
            return Err(Error::NotSuspended);
        }
        tracing::debug!("Resuming with a plan of {} tasks", plan.tasks.len());
        Ok(self.execute(plan, documents).await)
    }

    /// Drop any pending suspension and return to idle
    pub fn reset(&mut self) {
        self.state = ExecutorState::Idle;
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.event_tx.send(event);
    }

    async fn execute(&mut self, plan: &Plan, documents: &mut DocumentSet) -> RunReport {
        self.state = ExecutorState::Running;
        tracing::info!("Running plan with {} tasks", plan.tasks.len());
        self.emit(SessionEvent::PlanStart {
            task_count: plan.tasks.len(),
        });

        let mut tasks_run = 0;
        for (index, task) in plan.tasks.iter().enumerate() {
            let action = task.action.as_str().to_string();
            self.emit(SessionEvent::TaskStart {
                index,
                action: action.clone(),
            });
            tracing::debug!("Task {}: {} {:?}", index, action, task.parameters);

            let outcome = match self.prepare(task) {
                Ok(kind) => {
                    let cx = ActionContext {
                        library: self.library.as_ref(),
                        rasterizer: self.rasterizer.as_ref(),
                        service: self.service.as_ref(),
                        config: &self.config,
                        documents,
                    };
                    actions::run(kind, &task.parameters, &cx).await
                }
                Err(e) => ActionOutcome::Failed(e.to_string()),
            };

            match outcome {
                ActionOutcome::Continue(effect) => {
                    self.apply(&action, effect, documents);
                }
                ActionOutcome::Terminal(payload) => {
                    self.emit(SessionEvent::Display {
                        action: action.clone(),
                        payload,
                    });
                }
                ActionOutcome::Suspend(request) => {
                    tracing::info!("Plan suspended at task {} ({}): {}", index, action, request.reason);
                    self.emit(SessionEvent::Suspended {
                        request: request.clone(),
                    });
                    self.state = ExecutorState::Suspended(PendingSuspension {
                        request: request.clone(),
                        remaining: plan.tasks[index + 1..].to_vec(),
                    });
                    return RunReport {
                        status: RunStatus::Suspended(request),
                        tasks_run,
                    };
                }
                ActionOutcome::Failed(reason) => {
                    tracing::warn!("Task {} ({}) failed: {}", index, action, reason);
                    self.emit(SessionEvent::TaskFailed {
                        index,
                        action: action.clone(),
                        message: reason.clone(),
                    });
                    self.state = ExecutorState::Idle;
                    self.emit(SessionEvent::Ready);
                    return RunReport {
                        status: RunStatus::Aborted { action, reason },
                        tasks_run,
                    };
                }
            }

            tasks_run += 1;
            self.emit(SessionEvent::TaskEnd { index, action });
        }

        tracing::info!("Plan completed ({} tasks)", tasks_run);
        self.state = ExecutorState::Idle;
        self.emit(SessionEvent::PlanCompleted { tasks_run });
        self.emit(SessionEvent::Ready);
        RunReport {
            status: RunStatus::Completed,
            tasks_run,
        }
    }

    /// Resolve the task's action and validate its parameters
    fn prepare(&self, task: &Task) -> Result<ActionKind> {
        if let Some(defect) = task.defect() {
            return Err(Error::validation(task.action.as_str(), defect));
        }
        let kind = match &task.action {
            TaskAction::Known(kind) => *kind,
            TaskAction::Unknown(name) => {
                return Err(Error::validation(name.as_str(), "unknown action"));
            }
        };
        self.catalog.validate(kind, &task.parameters)?;
        Ok(kind)
    }

    fn apply(&self, action: &str, effect: Effect, documents: &mut DocumentSet) {
        match effect {
            Effect::Replace(bytes) => {
                documents.replace_primary(bytes);
            }
            Effect::Reprotect { bytes, password } => {
                documents.replace_primary_protected(bytes, password);
            }
            Effect::Consolidate(document) => {
                documents.replace_all(document);
                self.emit(SessionEvent::DocumentsChanged {
                    names: documents.names(),
                });
            }
            Effect::Archive(archive) => {
                self.emit(SessionEvent::ArchiveReady {
                    action: action.to_string(),
                    archive,
                });
            }
        }
    }
}
