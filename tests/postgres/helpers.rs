//! Shared test helpers for `PostgreSQL` integration tests.

pub use super::cluster::{BoxError, PostgresCluster, TemporaryDatabase, postgres_cluster};
use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use mockable::Clock;
use polaris::task::adapters::postgres::{PostgresTaskRepository, TaskPgPool};
use std::sync::Mutex;
use tokio::runtime::Runtime;
use uuid::Uuid;

/// SQL creating the task table.
pub const CREATE_TASKS_SQL: &str =
    include_str!("../../migrations/2025-10-01-000000_create_tasks/up.sql");

/// Template database name for the pre-migrated schema.
pub const TEMPLATE_DB: &str = "polaris_test_template";

/// Builds the runtime used to drive async repository calls from sync tests.
///
/// # Errors
///
/// Returns an error if the runtime cannot be built.
pub fn test_runtime() -> Result<Runtime, BoxError> {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .map_err(|err| Box::new(err) as BoxError)
}

/// Ensures the template database exists with the schema applied.
///
/// # Errors
///
/// Returns an error if template creation or migration fails.
pub fn ensure_template(cluster: PostgresCluster) -> Result<(), BoxError> {
    cluster.ensure_template_exists(TEMPLATE_DB, apply_migrations)
}

fn apply_migrations(url: &str) -> Result<(), BoxError> {
    let mut conn = PgConnection::establish(url).map_err(|err| Box::new(err) as BoxError)?;
    conn.batch_execute(CREATE_TASKS_SQL)
        .map_err(|err| Box::new(err) as BoxError)?;
    Ok(())
}

/// Creates a fresh database from the template and a repository over it.
///
/// # Errors
///
/// Returns an error if database creation or pool setup fails.
pub fn setup_repository(
    cluster: PostgresCluster,
) -> Result<(TemporaryDatabase, PostgresTaskRepository), BoxError> {
    ensure_template(cluster)?;
    let temp_db =
        cluster.temporary_database_from_template(&format!("task_{}", Uuid::new_v4()), TEMPLATE_DB)?;

    let manager = ConnectionManager::<PgConnection>::new(temp_db.url());
    let pool: TaskPgPool = Pool::builder()
        .max_size(2)
        .build(manager)
        .map_err(|err| Box::new(err) as BoxError)?;
    Ok((temp_db, PostgresTaskRepository::new(pool)))
}

/// Clock returning a controllable instant with whole-second precision, so
/// timestamps survive the microsecond resolution of `timestamptz`.
#[derive(Debug)]
pub struct SteppingClock {
    now: Mutex<DateTime<Utc>>,
}

impl SteppingClock {
    /// Starts the clock at a fixed instant.
    pub fn new() -> Self {
        let start = Utc
            .with_ymd_and_hms(2025, 10, 3, 9, 0, 0)
            .single()
            .unwrap_or_else(Utc::now);
        Self {
            now: Mutex::new(start),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self
            .now
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for SteppingClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self
            .now
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
