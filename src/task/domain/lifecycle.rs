//! Pure decision logic for task state transitions.
//!
//! The engine owns no storage and performs no I/O. It receives a task
//! snapshot and a caller-supplied `now`, and either rejects the request or
//! returns the updated snapshot together with the events the caller must
//! persist and dispatch as one unit.

use super::{
    CognitiveLoad, Task, TaskState, TransitionError, TransitionEvent, TransitionEventKind,
};
use chrono::{DateTime, Duration, Utc};

/// Requested state change, optionally carrying a cognitive load update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRequest {
    target: TaskState,
    cognitive_load: Option<i32>,
}

impl TransitionRequest {
    /// Creates a request for `target`.
    #[must_use]
    pub const fn new(target: TaskState) -> Self {
        Self {
            target,
            cognitive_load: None,
        }
    }

    /// Updates the cognitive load together with the transition.
    #[must_use]
    pub const fn with_cognitive_load(mut self, cognitive_load: i32) -> Self {
        self.cognitive_load = Some(cognitive_load);
        self
    }

    /// Returns the requested target state.
    #[must_use]
    pub const fn target(&self) -> TaskState {
        self.target
    }

    /// Returns the raw cognitive load update, if any.
    #[must_use]
    pub const fn cognitive_load(&self) -> Option<i32> {
        self.cognitive_load
    }
}

impl From<TaskState> for TransitionRequest {
    fn from(target: TaskState) -> Self {
        Self::new(target)
    }
}

/// Successful transition: the updated task and its ordered events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionOutcome {
    task: Task,
    events: Vec<TransitionEvent>,
}

impl TransitionOutcome {
    /// Returns the updated task snapshot.
    #[must_use]
    pub const fn task(&self) -> &Task {
        &self.task
    }

    /// Returns the events in dispatch order.
    #[must_use]
    pub fn events(&self) -> &[TransitionEvent] {
        &self.events
    }

    /// Splits the outcome into task and events.
    #[must_use]
    pub fn into_parts(self) -> (Task, Vec<TransitionEvent>) {
        (self.task, self.events)
    }
}

/// Stateless task lifecycle engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskLifecycleEngine {
    auto_archive_after: Duration,
}

impl Default for TaskLifecycleEngine {
    fn default() -> Self {
        Self::new(Self::DEFAULT_AUTO_ARCHIVE_AFTER)
    }
}

impl TaskLifecycleEngine {
    /// Age after which completed tasks are archived by the sweep.
    pub const DEFAULT_AUTO_ARCHIVE_AFTER: Duration = Duration::days(30);

    /// Creates an engine archiving completed tasks after `auto_archive_after`.
    #[must_use]
    pub const fn new(auto_archive_after: Duration) -> Self {
        Self { auto_archive_after }
    }

    /// Returns the configured auto-archive age.
    #[must_use]
    pub const fn auto_archive_after(&self) -> Duration {
        self.auto_archive_after
    }

    /// Decides whether `task` may move as requested.
    ///
    /// The cognitive load update is validated before the state change is
    /// considered. On success the returned task carries `updated_at = now`
    /// and, for archival, `archived_at = now`. Exactly one
    /// [`TransitionEventKind::StateChanged`] event is produced, followed by a
    /// [`TransitionEventKind::Celebration`] when the task reaches
    /// [`TaskState::Done`].
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::InvalidCognitiveLoad`] for a load outside
    /// `1..=10`, [`TransitionError::NoOpTransition`] when the target equals
    /// the current state, [`TransitionError::TerminalStateViolation`] for any
    /// move out of [`TaskState::Archived`], and
    /// [`TransitionError::IllegalTransition`] for edges missing from the
    /// transition table.
    pub fn request_transition(
        &self,
        task: &Task,
        requested: impl Into<TransitionRequest>,
        now: DateTime<Utc>,
    ) -> Result<TransitionOutcome, TransitionError> {
        let request = requested.into();
        let cognitive_load = request
            .cognitive_load()
            .map(|raw| {
                CognitiveLoad::new(raw).map_err(|_| TransitionError::InvalidCognitiveLoad(raw))
            })
            .transpose()?;

        let from = task.state();
        let to = request.target();
        if from == to {
            return Err(TransitionError::NoOpTransition { state: from });
        }
        if from.is_terminal() {
            return Err(TransitionError::TerminalStateViolation { to });
        }
        if !from.can_transition_to(to) {
            return Err(TransitionError::IllegalTransition { from, to });
        }

        let updated = task.transitioned(to, cognitive_load, now);
        let state_changed = TransitionEvent {
            task_id: updated.id(),
            kind: TransitionEventKind::StateChanged,
            from,
            to,
            occurred_at: now,
            cognitive_load: updated.cognitive_load(),
        };
        let mut events = vec![state_changed];
        if to == TaskState::Done {
            events.push(TransitionEvent {
                kind: TransitionEventKind::Celebration,
                ..state_changed
            });
        }

        Ok(TransitionOutcome {
            task: updated,
            events,
        })
    }

    /// Archives `task` when it has been done for at least the configured age.
    ///
    /// Returns `None` when no transition is due.
    #[must_use]
    pub fn check_auto_archive(&self, task: &Task, now: DateTime<Utc>) -> Option<TransitionOutcome> {
        if task.state() != TaskState::Done {
            return None;
        }
        if now.signed_duration_since(task.updated_at()) < self.auto_archive_after {
            return None;
        }
        self.request_transition(task, TaskState::Archived, now).ok()
    }
}
