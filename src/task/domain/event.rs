//! Transition events emitted by the lifecycle engine.

use super::{CognitiveLoad, TaskId, TaskState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of a transition event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionEventKind {
    /// The task moved between states.
    StateChanged,
    /// The task was completed and deserves a celebration.
    Celebration,
}

/// Record describing a state change, for the caller to log and broadcast.
///
/// Events are not persisted by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionEvent {
    /// Task the event belongs to.
    pub task_id: TaskId,
    /// Event kind.
    pub kind: TransitionEventKind,
    /// State before the transition.
    pub from: TaskState,
    /// State after the transition.
    pub to: TaskState,
    /// Caller-supplied transition time.
    pub occurred_at: DateTime<Utc>,
    /// Cognitive load in effect once the transition applied.
    pub cognitive_load: CognitiveLoad,
}

impl TransitionEvent {
    /// Returns `true` for celebration events.
    #[must_use]
    pub const fn is_celebration(&self) -> bool {
        matches!(self.kind, TransitionEventKind::Celebration)
    }
}
