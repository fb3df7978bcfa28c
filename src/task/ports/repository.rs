//! Repository port for task persistence and lookup.

use crate::task::domain::{Task, TaskId, TaskPage, TaskState, TaskVersion, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
///
/// Implementations serialize every change per task through
/// [`TaskRepository::update_if_version`], so at most one mutation computed
/// from a given snapshot can commit.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the task ID already
    /// exists.
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Persists `task` only if the stored version still equals `expected`,
    /// the version of the snapshot `task` was derived from.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist
    /// and [`TaskRepositoryError::VersionConflict`] when another mutation
    /// committed first.
    async fn update_if_version(
        &self,
        task: &Task,
        expected: TaskVersion,
    ) -> TaskRepositoryResult<()>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Returns all tasks currently in `state`.
    async fn find_by_state(&self, state: TaskState) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns one page of the tasks owned by `owner`, newest first.
    async fn find_by_owner(&self, owner: UserId, page: TaskPage)
    -> TaskRepositoryResult<Vec<Task>>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The stored task changed since the snapshot was read.
    #[error("task {task_id} is at version {actual} ({stored_state}), expected version {expected}")]
    VersionConflict {
        /// Task whose update was rejected.
        task_id: TaskId,
        /// Version the caller read.
        expected: TaskVersion,
        /// Version currently stored.
        actual: TaskVersion,
        /// State currently stored.
        stored_state: TaskState,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
