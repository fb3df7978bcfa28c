//! `PostgreSQL` repository implementation for task lifecycle storage.

use super::{
    models::{NewTaskRow, TaskChangeset, TaskRow},
    schema::tasks,
};
use crate::task::{
    domain::{
        CognitiveLoad, Minutes, PersistedTaskData, Task, TaskId, TaskPage, TaskState, TaskTitle,
        TaskVersion, UserId,
    },
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed task repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: TaskPgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let new_row = to_new_row(task);

        self.run_blocking(move |connection| {
            diesel::insert_into(tasks::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TaskRepositoryError::DuplicateTask(task_id)
                    }
                    _ => TaskRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update_if_version(
        &self,
        task: &Task,
        expected: TaskVersion,
    ) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let changeset = to_changeset(task);

        self.run_blocking(move |connection| {
            let updated_rows = diesel::update(
                tasks::table
                    .filter(tasks::id.eq(task_id.into_inner()))
                    .filter(tasks::version.eq(expected.value())),
            )
            .set(&changeset)
            .execute(connection)
            .map_err(TaskRepositoryError::persistence)?;

            if updated_rows > 0 {
                return Ok(());
            }

            // Zero rows: the task is either missing or moved on.
            let stored = tasks::table
                .filter(tasks::id.eq(task_id.into_inner()))
                .select((tasks::state, tasks::version))
                .first::<(String, i64)>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;

            let Some((raw_state, raw_version)) = stored else {
                return Err(TaskRepositoryError::NotFound(task_id));
            };
            let stored_state =
                TaskState::try_from(raw_state.as_str()).map_err(TaskRepositoryError::persistence)?;
            let actual =
                TaskVersion::try_from(raw_version).map_err(TaskRepositoryError::persistence)?;
            Err(TaskRepositoryError::VersionConflict {
                task_id,
                expected,
                actual,
                stored_state,
            })
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn find_by_state(&self, state: TaskState) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::state.eq(state.as_str()))
                .order((tasks::created_at.asc(), tasks::id.asc()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn find_by_owner(
        &self,
        owner: UserId,
        page: TaskPage,
    ) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::owner_id.eq(owner.into_inner()))
                .order((tasks::created_at.desc(), tasks::id.desc()))
                .offset(i64::from(page.offset()))
                .limit(i64::from(page.limit()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }
}

fn minutes_from_column(minutes: Option<i32>) -> TaskRepositoryResult<Option<Minutes>> {
    minutes
        .map(Minutes::try_from)
        .transpose()
        .map_err(TaskRepositoryError::persistence)
}

fn to_new_row(task: &Task) -> NewTaskRow {
    NewTaskRow {
        id: task.id().into_inner(),
        owner_id: task.owner().into_inner(),
        title: task.title().as_str().to_owned(),
        description: task.description().map(str::to_owned),
        state: task.state().as_str().to_owned(),
        cognitive_load: i32::from(task.cognitive_load()),
        estimated_minutes: task.estimated_minutes().map(i32::from),
        actual_minutes: task.actual_minutes().map(i32::from),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
        archived_at: task.archived_at(),
        version: task.version().value(),
    }
}

fn to_changeset(task: &Task) -> TaskChangeset {
    TaskChangeset {
        title: task.title().as_str().to_owned(),
        description: task.description().map(str::to_owned),
        state: task.state().as_str().to_owned(),
        cognitive_load: i32::from(task.cognitive_load()),
        estimated_minutes: task.estimated_minutes().map(i32::from),
        actual_minutes: task.actual_minutes().map(i32::from),
        updated_at: task.updated_at(),
        archived_at: task.archived_at(),
        version: task.version().value(),
    }
}

fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let TaskRow {
        id,
        owner_id,
        title: persisted_title,
        description,
        state: persisted_state,
        cognitive_load: persisted_load,
        estimated_minutes,
        actual_minutes,
        created_at,
        updated_at,
        archived_at,
        version: persisted_version,
    } = row;

    let title = TaskTitle::new(persisted_title).map_err(TaskRepositoryError::persistence)?;
    let state =
        TaskState::try_from(persisted_state.as_str()).map_err(TaskRepositoryError::persistence)?;
    let cognitive_load =
        CognitiveLoad::new(persisted_load).map_err(TaskRepositoryError::persistence)?;
    let version =
        TaskVersion::try_from(persisted_version).map_err(TaskRepositoryError::persistence)?;

    let data = PersistedTaskData {
        id: TaskId::from_uuid(id),
        owner: UserId::from_uuid(owner_id),
        title,
        description,
        state,
        cognitive_load,
        estimated_minutes: minutes_from_column(estimated_minutes)?,
        actual_minutes: minutes_from_column(actual_minutes)?,
        created_at,
        updated_at,
        archived_at,
        version,
    };
    Task::from_persisted(data).map_err(TaskRepositoryError::persistence)
}
