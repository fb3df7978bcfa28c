//! Diesel row models for task persistence.

use super::schema::tasks;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Owning user identifier.
    pub owner_id: uuid::Uuid,
    /// Task title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Lifecycle state.
    pub state: String,
    /// Cognitive load rating.
    pub cognitive_load: i32,
    /// Optional time estimate in minutes.
    pub estimated_minutes: Option<i32>,
    /// Optional time spent in minutes.
    pub actual_minutes: Option<i32>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
    /// Archive timestamp.
    pub archived_at: Option<DateTime<Utc>>,
    /// Concurrency version.
    pub version: i64,
}

/// Insert model for task records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Owning user identifier.
    pub owner_id: uuid::Uuid,
    /// Task title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Lifecycle state.
    pub state: String,
    /// Cognitive load rating.
    pub cognitive_load: i32,
    /// Optional time estimate in minutes.
    pub estimated_minutes: Option<i32>,
    /// Optional time spent in minutes.
    pub actual_minutes: Option<i32>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
    /// Archive timestamp.
    pub archived_at: Option<DateTime<Utc>>,
    /// Concurrency version.
    pub version: i64,
}

/// Changeset for mutable task columns.
///
/// `None` values are written as `NULL` so cleared fields persist.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
pub struct TaskChangeset {
    /// Task title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Lifecycle state.
    pub state: String,
    /// Cognitive load rating.
    pub cognitive_load: i32,
    /// Optional time estimate in minutes.
    pub estimated_minutes: Option<i32>,
    /// Optional time spent in minutes.
    pub actual_minutes: Option<i32>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
    /// Archive timestamp.
    pub archived_at: Option<DateTime<Utc>>,
    /// Concurrency version.
    pub version: i64,
}
