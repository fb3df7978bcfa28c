//! Error types for task domain validation, parsing, and state transitions.

use super::{TaskId, TaskState};
use thiserror::Error;

/// Errors returned while constructing domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The task title exceeds the maximum length.
    #[error("task title is {0} characters long, expected at most 255")]
    TitleTooLong(usize),

    /// The cognitive load rating is outside `1..=10`.
    #[error("invalid cognitive load {0}, expected a value between 1 and 10")]
    InvalidCognitiveLoad(i32),

    /// A duration in minutes is negative or exceeds the supported range.
    #[error("invalid minutes {0}, expected a value between 0 and 2147483647")]
    InvalidMinutes(i64),

    /// A stored task version is negative.
    #[error("invalid task version {0}")]
    InvalidVersion(i64),

    /// A page asks for more tasks than one query may return.
    #[error("page limit {0} exceeds the maximum of 500")]
    PageLimitTooLarge(u32),

    /// Archived tasks are read-only.
    #[error("task {0} is archived and cannot be edited")]
    ArchivedTaskImmutable(TaskId),

    /// Persisted data carries an archive timestamp inconsistent with its
    /// state.
    #[error("task {0} has an archive timestamp inconsistent with its state")]
    ArchiveTimestampMismatch(TaskId),
}

/// Error returned while parsing task states from persistence or requests.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task state: {0}")]
pub struct ParseTaskStateError(pub String);

/// Rejections produced by the lifecycle engine.
///
/// Every variant is a deterministic caller-input problem: repeating an
/// identical request yields the identical error.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum TransitionError {
    /// The requested edge is not in the transition table.
    #[error("illegal task state transition from {from} to {to}")]
    IllegalTransition {
        /// State the task is currently in.
        from: TaskState,
        /// Requested target state.
        to: TaskState,
    },

    /// The requested target equals the current state.
    #[error("task is already {state}")]
    NoOpTransition {
        /// The unchanged state.
        state: TaskState,
    },

    /// A transition out of the terminal archived state was requested.
    #[error("archived tasks cannot transition to {to}")]
    TerminalStateViolation {
        /// Requested target state.
        to: TaskState,
    },

    /// A cognitive load update supplied with the request is out of range.
    #[error("invalid cognitive load {0}, expected a value between 1 and 10")]
    InvalidCognitiveLoad(i32),
}
