//! `PostgreSQL` integration tests for task storage, compare-and-swap, and
//! listing queries.

use chrono::Duration;
use mockable::Clock;
use polaris::task::{
    adapters::{memory::InMemoryActivityLog, postgres::PostgresTaskRepository},
    domain::{
        Minutes, Task, TaskLifecycleEngine, TaskPage, TaskState, TaskTitle, TaskVersion,
        TransitionEventKind, UserId,
    },
    ports::{TaskRepository, TaskRepositoryError},
    services::{
        CaptureTaskRequest, TaskLifecycleError, TaskLifecycleService, TransitionTaskRequest,
        UpdateTaskDetailsRequest,
    },
};
use rstest::{fixture, rstest};
use std::sync::Arc;
use tokio::runtime::Runtime;

use crate::postgres::cluster::TemporaryDatabase;
use crate::postgres::helpers::{
    BoxError, PostgresCluster, SteppingClock, postgres_cluster, setup_repository, test_runtime,
};

type PgService = TaskLifecycleService<PostgresTaskRepository, InMemoryActivityLog, SteppingClock>;

struct TaskTestContext {
    runtime: Runtime,
    repository: Arc<PostgresTaskRepository>,
    activity: Arc<InMemoryActivityLog>,
    clock: Arc<SteppingClock>,
    service: PgService,
    owner: UserId,
    // Dropped last so the pool releases its connections first.
    _temp_db: TemporaryDatabase,
}

impl TaskTestContext {
    fn capture(&self, request: CaptureTaskRequest) -> Result<Task, BoxError> {
        Ok(self.runtime.block_on(self.service.capture_task(request))?)
    }

    fn stored(&self, task: &Task) -> Result<Task, BoxError> {
        self.runtime
            .block_on(self.repository.find_by_id(task.id()))?
            .ok_or_else(|| format!("task {} missing", task.id()).into())
    }
}

#[fixture]
fn context(postgres_cluster: PostgresCluster) -> Result<TaskTestContext, BoxError> {
    let (temp_db, repository) = setup_repository(postgres_cluster)?;
    let repository = Arc::new(repository);
    let activity = Arc::new(InMemoryActivityLog::new());
    let clock = Arc::new(SteppingClock::new());
    let service = TaskLifecycleService::new(
        Arc::clone(&repository),
        Arc::clone(&activity),
        Arc::clone(&clock),
    );
    Ok(TaskTestContext {
        runtime: test_runtime()?,
        repository,
        activity,
        clock,
        service,
        owner: UserId::new(),
        _temp_db: temp_db,
    })
}

#[rstest]
fn postgres_store_and_find_round_trips_every_field(
    context: Result<TaskTestContext, BoxError>,
) -> Result<(), BoxError> {
    let ctx = context?;
    let created = ctx.capture(
        CaptureTaskRequest::new(ctx.owner, "Book flights")
            .with_description("Window seat")
            .with_cognitive_load(7)
            .with_estimated_minutes(Minutes::MAX),
    )?;

    let fetched = ctx.stored(&created)?;

    assert_eq!(fetched, created);
    assert_eq!(fetched.version(), TaskVersion::INITIAL);
    assert_eq!(
        fetched.estimated_minutes().map(Minutes::value),
        Some(Minutes::MAX)
    );
    Ok(())
}

#[rstest]
fn postgres_duplicate_store_is_rejected(
    context: Result<TaskTestContext, BoxError>,
) -> Result<(), BoxError> {
    let ctx = context?;
    let created = ctx.capture(CaptureTaskRequest::new(ctx.owner, "Call the bank"))?;

    let duplicate = ctx.runtime.block_on(ctx.repository.store(&created));

    assert!(matches!(
        duplicate,
        Err(TaskRepositoryError::DuplicateTask(id)) if id == created.id()
    ));
    Ok(())
}

#[rstest]
fn postgres_transition_commits_and_bumps_version(
    context: Result<TaskTestContext, BoxError>,
) -> Result<(), BoxError> {
    let ctx = context?;
    let created = ctx.capture(CaptureTaskRequest::new(ctx.owner, "File expenses"))?;
    ctx.clock.advance(Duration::hours(2));

    for target in ["active", "done", "archived"] {
        ctx.runtime.block_on(
            ctx.service
                .transition_task(TransitionTaskRequest::new(created.id(), target)),
        )?;
    }
    let stored = ctx.stored(&created)?;

    assert_eq!(stored.state(), TaskState::Archived);
    assert_eq!(stored.archived_at(), Some(ctx.clock.utc()));
    assert_eq!(stored.version().value(), 3);
    let celebrations = ctx
        .activity
        .entries_for_task(created.id())
        .iter()
        .filter(|entry| entry.event.kind == TransitionEventKind::Celebration)
        .count();
    assert_eq!(celebrations, 1);
    Ok(())
}

#[rstest]
fn postgres_stale_snapshot_conflicts_and_keeps_detail_edit(
    context: Result<TaskTestContext, BoxError>,
) -> Result<(), BoxError> {
    let ctx = context?;
    let created = ctx.capture(CaptureTaskRequest::new(ctx.owner, "Old title"))?;
    let snapshot = ctx.stored(&created)?;
    let edited = ctx.runtime.block_on(
        ctx.service
            .update_details(UpdateTaskDetailsRequest::new(created.id()).with_title("New title")),
    )?;

    let outcome = TaskLifecycleEngine::default().request_transition(
        &snapshot,
        TaskState::Active,
        ctx.clock.utc(),
    )?;
    let result = ctx
        .runtime
        .block_on(ctx.repository.update_if_version(outcome.task(), snapshot.version()));

    assert!(matches!(
        result,
        Err(TaskRepositoryError::VersionConflict {
            expected,
            actual,
            stored_state: TaskState::Inbox,
            ..
        }) if expected == snapshot.version() && actual == edited.version()
    ));
    let stored = ctx.stored(&created)?;
    assert_eq!(stored.title().as_str(), "New title");
    assert_eq!(stored.state(), TaskState::Inbox);
    Ok(())
}

#[rstest]
fn postgres_cas_on_missing_task_reports_not_found(
    context: Result<TaskTestContext, BoxError>,
) -> Result<(), BoxError> {
    let ctx = context?;
    let title = TaskTitle::new("Never stored")?;
    let ghost = Task::capture(ctx.owner, title, &*ctx.clock);

    let result = ctx
        .runtime
        .block_on(ctx.repository.update_if_version(&ghost, ghost.version()));

    assert!(matches!(result, Err(TaskRepositoryError::NotFound(id)) if id == ghost.id()));
    Ok(())
}

#[rstest]
fn postgres_detail_update_clears_nullable_columns(
    context: Result<TaskTestContext, BoxError>,
) -> Result<(), BoxError> {
    let ctx = context?;
    let created = ctx.capture(
        CaptureTaskRequest::new(ctx.owner, "Plan garden")
            .with_description("Tomatoes")
            .with_estimated_minutes(45),
    )?;

    ctx.runtime.block_on(
        ctx.service.update_details(
            UpdateTaskDetailsRequest::new(created.id())
                .with_description(None)
                .with_estimated_minutes(None)
                .with_actual_minutes(Some(30)),
        ),
    )?;
    let stored = ctx.stored(&created)?;

    assert_eq!(stored.description(), None);
    assert_eq!(stored.estimated_minutes(), None);
    assert_eq!(stored.actual_minutes().map(Minutes::value), Some(30));
    assert_eq!(stored.version(), created.version().next());
    Ok(())
}

#[rstest]
fn postgres_archived_task_rejects_detail_update(
    context: Result<TaskTestContext, BoxError>,
) -> Result<(), BoxError> {
    let ctx = context?;
    let created = ctx.capture(CaptureTaskRequest::new(ctx.owner, "Abandoned idea"))?;
    ctx.runtime.block_on(
        ctx.service
            .transition_task(TransitionTaskRequest::new(created.id(), "archived")),
    )?;

    let result = ctx.runtime.block_on(
        ctx.service
            .update_details(UpdateTaskDetailsRequest::new(created.id()).with_title("Revived")),
    );

    assert!(matches!(result, Err(TaskLifecycleError::Domain(_))));
    assert_eq!(ctx.stored(&created)?.title().as_str(), "Abandoned idea");
    Ok(())
}

#[rstest]
fn postgres_find_by_state_returns_matching_tasks_oldest_first(
    context: Result<TaskTestContext, BoxError>,
) -> Result<(), BoxError> {
    let ctx = context?;
    let mut done_ids = Vec::new();
    for title in ["Laundry", "Dishes", "Vacuum"] {
        let task = ctx.capture(CaptureTaskRequest::new(ctx.owner, title))?;
        ctx.clock.advance(Duration::minutes(1));
        if title != "Dishes" {
            for target in ["active", "done"] {
                ctx.runtime.block_on(
                    ctx.service
                        .transition_task(TransitionTaskRequest::new(task.id(), target)),
                )?;
            }
            done_ids.push(task.id());
        }
    }

    let done = ctx
        .runtime
        .block_on(ctx.repository.find_by_state(TaskState::Done))?;
    let inbox = ctx
        .runtime
        .block_on(ctx.repository.find_by_state(TaskState::Inbox))?;

    assert_eq!(done.iter().map(Task::id).collect::<Vec<_>>(), done_ids);
    assert_eq!(inbox.len(), 1);
    Ok(())
}

#[rstest]
fn postgres_find_by_owner_pages_newest_first(
    context: Result<TaskTestContext, BoxError>,
) -> Result<(), BoxError> {
    let ctx = context?;
    let mut captured = Vec::new();
    for index in 0..5 {
        let task = ctx.capture(CaptureTaskRequest::new(ctx.owner, format!("Errand {index}")))?;
        captured.push(task.id());
        ctx.clock.advance(Duration::minutes(1));
    }
    ctx.capture(CaptureTaskRequest::new(UserId::new(), "Not mine"))?;
    captured.reverse();

    let list = |offset, limit| -> Result<Vec<_>, BoxError> {
        let page = TaskPage::new(offset, limit)?;
        let tasks = ctx
            .runtime
            .block_on(ctx.repository.find_by_owner(ctx.owner, page))?;
        Ok(tasks.iter().map(Task::id).collect())
    };

    assert_eq!(list(0, TaskPage::MAX_LIMIT)?, captured);
    assert_eq!(Some(list(0, 2)?.as_slice()), captured.get(0..2));
    assert_eq!(Some(list(2, 2)?.as_slice()), captured.get(2..4));
    assert_eq!(Some(list(4, 2)?.as_slice()), captured.get(4..5));
    assert!(list(5, 2)?.is_empty());
    assert!(list(0, 0)?.is_empty());
    Ok(())
}
