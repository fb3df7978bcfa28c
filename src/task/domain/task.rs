//! Task aggregate root.

use super::{
    CognitiveLoad, Minutes, TaskDomainError, TaskId, TaskState, TaskTitle, TaskVersion, UserId,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Task aggregate root.
///
/// `archived_at` is set if and only if the task is [`TaskState::Archived`].
/// State only changes through the lifecycle engine. Deserialization goes
/// through [`PersistedTaskData`] so the same checks apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PersistedTaskData")]
pub struct Task {
    id: TaskId,
    owner: UserId,
    title: TaskTitle,
    description: Option<String>,
    state: TaskState,
    cognitive_load: CognitiveLoad,
    estimated_minutes: Option<Minutes>,
    actual_minutes: Option<Minutes>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    archived_at: Option<DateTime<Utc>>,
    version: TaskVersion,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted owner.
    pub owner: UserId,
    /// Persisted title.
    pub title: TaskTitle,
    /// Persisted description, if any.
    pub description: Option<String>,
    /// Persisted lifecycle state.
    pub state: TaskState,
    /// Persisted cognitive load rating.
    pub cognitive_load: CognitiveLoad,
    /// Persisted time estimate.
    pub estimated_minutes: Option<Minutes>,
    /// Persisted time actually spent.
    pub actual_minutes: Option<Minutes>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest mutation timestamp.
    pub updated_at: DateTime<Utc>,
    /// Persisted archive timestamp.
    pub archived_at: Option<DateTime<Utc>>,
    /// Persisted concurrency version.
    pub version: TaskVersion,
}

/// Partial update of the non-lifecycle task fields.
///
/// `None` leaves a field untouched. Nested options clear the field when set
/// to `Some(None)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDetailsUpdate {
    /// Replacement title.
    pub title: Option<TaskTitle>,
    /// Replacement or cleared description.
    pub description: Option<Option<String>>,
    /// Replacement cognitive load.
    pub cognitive_load: Option<CognitiveLoad>,
    /// Replacement or cleared estimate.
    pub estimated_minutes: Option<Option<Minutes>>,
    /// Replacement or cleared actual time spent.
    pub actual_minutes: Option<Option<Minutes>>,
}

impl TaskDetailsUpdate {
    /// Returns `true` when no field would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.cognitive_load.is_none()
            && self.estimated_minutes.is_none()
            && self.actual_minutes.is_none()
    }
}

impl Task {
    /// Captures a new task in the inbox with default cognitive load.
    #[must_use]
    pub fn capture(owner: UserId, title: TaskTitle, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TaskId::new(),
            owner,
            title,
            description: None,
            state: TaskState::Inbox,
            cognitive_load: CognitiveLoad::default(),
            estimated_minutes: None,
            actual_minutes: None,
            created_at: timestamp,
            updated_at: timestamp,
            archived_at: None,
            version: TaskVersion::INITIAL,
        }
    }

    /// Sets the description on a freshly captured task.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the cognitive load on a freshly captured task.
    #[must_use]
    pub const fn with_cognitive_load(mut self, cognitive_load: CognitiveLoad) -> Self {
        self.cognitive_load = cognitive_load;
        self
    }

    /// Sets the time estimate on a freshly captured task.
    #[must_use]
    pub const fn with_estimated_minutes(mut self, minutes: Minutes) -> Self {
        self.estimated_minutes = Some(minutes);
        self
    }

    /// Reconstructs a task from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::ArchiveTimestampMismatch`] when the archive
    /// timestamp is present without the archived state or vice versa.
    pub fn from_persisted(data: PersistedTaskData) -> Result<Self, TaskDomainError> {
        let is_archived = data.state == TaskState::Archived;
        if is_archived != data.archived_at.is_some() {
            return Err(TaskDomainError::ArchiveTimestampMismatch(data.id));
        }

        Ok(Self {
            id: data.id,
            owner: data.owner,
            title: data.title,
            description: data.description,
            state: data.state,
            cognitive_load: data.cognitive_load,
            estimated_minutes: data.estimated_minutes,
            actual_minutes: data.actual_minutes,
            created_at: data.created_at,
            updated_at: data.updated_at,
            archived_at: data.archived_at,
            version: data.version,
        })
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning user.
    #[must_use]
    pub const fn owner(&self) -> UserId {
        self.owner
    }

    /// Returns the task title.
    #[must_use]
    pub const fn title(&self) -> &TaskTitle {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the task lifecycle state.
    #[must_use]
    pub const fn state(&self) -> TaskState {
        self.state
    }

    /// Returns the cognitive load rating.
    #[must_use]
    pub const fn cognitive_load(&self) -> CognitiveLoad {
        self.cognitive_load
    }

    /// Returns the time estimate.
    #[must_use]
    pub const fn estimated_minutes(&self) -> Option<Minutes> {
        self.estimated_minutes
    }

    /// Returns the time actually spent.
    #[must_use]
    pub const fn actual_minutes(&self) -> Option<Minutes> {
        self.actual_minutes
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest mutation timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the archive timestamp, present only for archived tasks.
    #[must_use]
    pub const fn archived_at(&self) -> Option<DateTime<Utc>> {
        self.archived_at
    }

    /// Returns the concurrency version of this snapshot.
    #[must_use]
    pub const fn version(&self) -> TaskVersion {
        self.version
    }

    /// Applies a partial update to the non-lifecycle fields, touches
    /// `updated_at` and bumps the version.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::ArchivedTaskImmutable`] when the task is
    /// archived; the task is left unchanged.
    pub fn apply_details(
        &mut self,
        update: TaskDetailsUpdate,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        if self.state.is_terminal() {
            return Err(TaskDomainError::ArchivedTaskImmutable(self.id));
        }
        let TaskDetailsUpdate {
            title,
            description,
            cognitive_load,
            estimated_minutes,
            actual_minutes,
        } = update;

        if let Some(new_title) = title {
            self.title = new_title;
        }
        if let Some(new_description) = description {
            self.description = new_description;
        }
        if let Some(new_load) = cognitive_load {
            self.cognitive_load = new_load;
        }
        if let Some(new_estimate) = estimated_minutes {
            self.estimated_minutes = new_estimate;
        }
        if let Some(new_actual) = actual_minutes {
            self.actual_minutes = new_actual;
        }
        self.updated_at = clock.utc();
        self.version = self.version.next();
        Ok(())
    }

    /// Returns a copy of this task moved into `target` at `now`.
    ///
    /// Callers must have validated the edge already.
    pub(super) fn transitioned(
        &self,
        target: TaskState,
        cognitive_load: Option<CognitiveLoad>,
        now: DateTime<Utc>,
    ) -> Self {
        let archived_at = if target == TaskState::Archived {
            Some(now)
        } else {
            self.archived_at
        };

        Self {
            state: target,
            cognitive_load: cognitive_load.unwrap_or(self.cognitive_load),
            updated_at: now,
            archived_at,
            version: self.version.next(),
            ..self.clone()
        }
    }
}

impl TryFrom<PersistedTaskData> for Task {
    type Error = TaskDomainError;

    fn try_from(data: PersistedTaskData) -> Result<Self, Self::Error> {
        Self::from_persisted(data)
    }
}
