//! Workflow observability state.
//!
//! The state machine is pure data published through a `tokio::sync::watch`
//! channel; rendering is somebody else's problem. Percent and stage label
//! exist only for observers and never affect control flow. Within one
//! operation the percent is monotone non-decreasing; it resets to 0 when a
//! new operation starts.

use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowPhase {
    Idle,
    Validating,
    Compressing,
    Submitting,
    Succeeded,
    Failed,
}

impl WorkflowPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, WorkflowPhase::Succeeded | WorkflowPhase::Failed)
    }
}

/// One observable snapshot of an in-flight operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowState {
    pub phase: WorkflowPhase,
    pub percent: u8,
    pub stage: String,
}

impl WorkflowState {
    pub fn idle() -> Self {
        Self {
            phase: WorkflowPhase::Idle,
            percent: 0,
            stage: String::new(),
        }
    }
}

/// Publishes state snapshots, enforcing the progress invariants: percent is
/// clamped to [0,100] and never regresses within one operation.
#[derive(Debug)]
pub(crate) struct ProgressTracker {
    tx: watch::Sender<WorkflowState>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(WorkflowState::idle());
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<WorkflowState> {
        self.tx.subscribe()
    }

    /// Start a new operation: back to Idle, percent 0.
    pub fn reset(&self) {
        self.tx.send_replace(WorkflowState::idle());
    }

    /// Publish a new snapshot. Percent never decreases within an operation.
    pub fn report(&self, phase: WorkflowPhase, percent: u8, stage: &str) {
        self.tx.send_modify(|state| {
            state.phase = phase;
            state.percent = percent.min(100).max(state.percent);
            state.stage = stage.to_string();
        });
    }

    /// Terminal failure: phase flips to Failed, percent stays where it was.
    pub fn fail(&self, message: &str) {
        self.tx.send_modify(|state| {
            state.phase = WorkflowPhase::Failed;
            state.stage = message.to_string();
        });
    }

    pub fn current(&self) -> WorkflowState {
        self.tx.borrow().clone()
    }
}
