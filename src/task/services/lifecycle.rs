//! Service layer for task capture, detail updates, and state transitions.

use crate::task::{
    domain::{
        CognitiveLoad, Minutes, ParseTaskStateError, Task, TaskDetailsUpdate, TaskDomainError,
        TaskId, TaskLifecycleEngine, TaskPage, TaskState, TaskTitle, TransitionError,
        TransitionOutcome, TransitionRequest, UserId,
    },
    ports::{TaskRepository, TaskRepositoryError, TransitionEventPublisher},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Request payload for quick task capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureTaskRequest {
    owner: UserId,
    title: String,
    description: Option<String>,
    cognitive_load: Option<i32>,
    estimated_minutes: Option<u32>,
}

impl CaptureTaskRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(owner: UserId, title: impl Into<String>) -> Self {
        Self {
            owner,
            title: title.into(),
            description: None,
            cognitive_load: None,
            estimated_minutes: None,
        }
    }

    /// Sets the task description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the cognitive load rating.
    #[must_use]
    pub const fn with_cognitive_load(mut self, cognitive_load: i32) -> Self {
        self.cognitive_load = Some(cognitive_load);
        self
    }

    /// Sets the time estimate in minutes.
    #[must_use]
    pub const fn with_estimated_minutes(mut self, minutes: u32) -> Self {
        self.estimated_minutes = Some(minutes);
        self
    }
}

/// Request payload for a partial update of task details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTaskDetailsRequest {
    task_id: TaskId,
    title: Option<String>,
    description: Option<Option<String>>,
    cognitive_load: Option<i32>,
    estimated_minutes: Option<Option<u32>>,
    actual_minutes: Option<Option<u32>>,
}

impl UpdateTaskDetailsRequest {
    /// Creates an update touching no fields yet.
    #[must_use]
    pub const fn new(task_id: TaskId) -> Self {
        Self {
            task_id,
            title: None,
            description: None,
            cognitive_load: None,
            estimated_minutes: None,
            actual_minutes: None,
        }
    }

    /// Replaces the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Replaces the description; `None` clears it.
    #[must_use]
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    /// Replaces the cognitive load rating.
    #[must_use]
    pub const fn with_cognitive_load(mut self, cognitive_load: i32) -> Self {
        self.cognitive_load = Some(cognitive_load);
        self
    }

    /// Replaces the estimate; `None` clears it.
    #[must_use]
    pub const fn with_estimated_minutes(mut self, minutes: Option<u32>) -> Self {
        self.estimated_minutes = Some(minutes);
        self
    }

    /// Replaces the time actually spent; `None` clears it.
    #[must_use]
    pub const fn with_actual_minutes(mut self, minutes: Option<u32>) -> Self {
        self.actual_minutes = Some(minutes);
        self
    }
}

/// Request payload for transitioning task state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionTaskRequest {
    task_id: TaskId,
    target_state: String,
    cognitive_load: Option<i32>,
}

impl TransitionTaskRequest {
    /// Creates a transition request.
    #[must_use]
    pub fn new(task_id: TaskId, target_state: impl Into<String>) -> Self {
        Self {
            task_id,
            target_state: target_state.into(),
            cognitive_load: None,
        }
    }

    /// Updates the cognitive load together with the transition.
    #[must_use]
    pub const fn with_cognitive_load(mut self, cognitive_load: i32) -> Self {
        self.cognitive_load = Some(cognitive_load);
        self
    }
}

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// The engine rejected the transition.
    #[error(transparent)]
    Transition(#[from] TransitionError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
    /// The requested target state string is unknown.
    #[error(transparent)]
    InvalidState(#[from] ParseTaskStateError),
    /// No task exists with the given identifier.
    #[error("task {0} not found")]
    NotFound(TaskId),
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Task lifecycle orchestration service.
///
/// Persists every mutation with a compare-and-swap on the task version, then
/// dispatches transition events. Publishing happens after the commit, so a
/// failing publisher never undoes a transition.
#[derive(Clone)]
pub struct TaskLifecycleService<R, P, C>
where
    R: TaskRepository,
    P: TransitionEventPublisher,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    publisher: Arc<P>,
    clock: Arc<C>,
    engine: TaskLifecycleEngine,
}

impl<R, P, C> TaskLifecycleService<R, P, C>
where
    R: TaskRepository,
    P: TransitionEventPublisher,
    C: Clock + Send + Sync,
{
    /// Creates a new task lifecycle service with the default engine.
    #[must_use]
    pub fn new(repository: Arc<R>, publisher: Arc<P>, clock: Arc<C>) -> Self {
        Self::with_engine(repository, publisher, clock, TaskLifecycleEngine::default())
    }

    /// Creates a service using `engine`.
    #[must_use]
    pub const fn with_engine(
        repository: Arc<R>,
        publisher: Arc<P>,
        clock: Arc<C>,
        engine: TaskLifecycleEngine,
    ) -> Self {
        Self {
            repository,
            publisher,
            clock,
            engine,
        }
    }

    async fn find_task_or_error(&self, task_id: TaskId) -> TaskLifecycleResult<Task> {
        self.repository
            .find_by_id(task_id)
            .await?
            .ok_or(TaskLifecycleError::NotFound(task_id))
    }

    /// Captures a new task in the inbox.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] when the title, cognitive load
    /// or estimate is invalid, or [`TaskLifecycleError::Repository`] when
    /// persistence fails.
    pub async fn capture_task(&self, request: CaptureTaskRequest) -> TaskLifecycleResult<Task> {
        let title = TaskTitle::new(request.title)?;
        let mut task = Task::capture(request.owner, title, &*self.clock);
        if let Some(description) = request.description {
            task = task.with_description(description);
        }
        if let Some(raw_load) = request.cognitive_load {
            task = task.with_cognitive_load(CognitiveLoad::new(raw_load)?);
        }
        if let Some(minutes) = request.estimated_minutes {
            task = task.with_estimated_minutes(Minutes::new(minutes)?);
        }

        self.repository.store(&task).await?;
        tracing::debug!(task_id = %task.id(), owner = %task.owner(), "task captured");
        Ok(task)
    }

    /// Retrieves a task by identifier.
    ///
    /// Returns `Ok(None)` when no such task exists.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when lookup fails.
    pub async fn find_by_id(&self, task_id: TaskId) -> TaskLifecycleResult<Option<Task>> {
        Ok(self.repository.find_by_id(task_id).await?)
    }

    /// Lists one page of the tasks of `owner`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when lookup fails.
    pub async fn list_for_owner(
        &self,
        owner: UserId,
        page: TaskPage,
    ) -> TaskLifecycleResult<Vec<Task>> {
        Ok(self.repository.find_by_owner(owner, page).await?)
    }

    /// Applies a partial update to the task details.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for unknown tasks,
    /// [`TaskLifecycleError::Domain`] for invalid values or archived tasks,
    /// or [`TaskLifecycleError::Repository`] when persistence fails,
    /// including a version conflict with a concurrent mutation.
    pub async fn update_details(
        &self,
        request: UpdateTaskDetailsRequest,
    ) -> TaskLifecycleResult<Task> {
        let update = TaskDetailsUpdate {
            title: request.title.map(TaskTitle::new).transpose()?,
            description: request.description,
            cognitive_load: request.cognitive_load.map(CognitiveLoad::new).transpose()?,
            estimated_minutes: validate_minutes(request.estimated_minutes)?,
            actual_minutes: validate_minutes(request.actual_minutes)?,
        };

        let mut task = self.find_task_or_error(request.task_id).await?;
        let observed_version = task.version();
        task.apply_details(update, &*self.clock)?;
        self.repository
            .update_if_version(&task, observed_version)
            .await?;
        tracing::debug!(task_id = %task.id(), version = %task.version(), "task details updated");
        Ok(task)
    }

    /// Transitions a task to a new lifecycle state.
    ///
    /// Events are published after the new state is committed; publishing
    /// failures are logged and do not fail the call.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::InvalidState`] for unknown state
    /// strings, [`TaskLifecycleError::NotFound`] for unknown tasks,
    /// [`TaskLifecycleError::Transition`] when the engine rejects the
    /// request, or [`TaskLifecycleError::Repository`] when persistence fails.
    pub async fn transition_task(
        &self,
        request: TransitionTaskRequest,
    ) -> TaskLifecycleResult<TransitionOutcome> {
        let target = TaskState::try_from(request.target_state.as_str())?;
        let mut engine_request = TransitionRequest::new(target);
        if let Some(raw_load) = request.cognitive_load {
            engine_request = engine_request.with_cognitive_load(raw_load);
        }

        let task = self.find_task_or_error(request.task_id).await?;
        let outcome = self
            .engine
            .request_transition(&task, engine_request, self.clock.utc())?;
        self.repository
            .update_if_version(outcome.task(), task.version())
            .await?;
        tracing::debug!(
            task_id = %task.id(),
            from = %task.state(),
            to = %target,
            "task transitioned"
        );

        publish_events(&*self.publisher, &outcome).await;
        Ok(outcome)
    }
}

/// Validates a nested minutes update, keeping "leave" and "clear" apart.
fn validate_minutes(
    raw: Option<Option<u32>>,
) -> Result<Option<Option<Minutes>>, TaskDomainError> {
    raw.map(|value| value.map(Minutes::new).transpose())
        .transpose()
}

/// Dispatches the events of a committed transition, logging failures.
pub(super) async fn publish_events(
    publisher: &impl TransitionEventPublisher,
    outcome: &TransitionOutcome,
) {
    let task = outcome.task();
    if let Err(err) = publisher.publish(task.owner(), outcome.events()).await {
        tracing::warn!(
            task_id = %task.id(),
            error = %err,
            "failed to publish transition events"
        );
    }
}
