//! Identifier and validated scalar types for the task domain.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a task record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Creates a new random task identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a task identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<Uuid> for TaskId {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the user owning a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new random user identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a user identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Non-empty task title.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskTitle(String);

impl TaskTitle {
    /// Longest title accepted, matching the persisted column width.
    pub const MAX_CHARS: usize = 255;

    /// Creates a validated title, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] when the trimmed value is empty
    /// or [`TaskDomainError::TitleTooLong`] when it exceeds
    /// [`Self::MAX_CHARS`] characters.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyTitle);
        }
        let length = trimmed.chars().count();
        if length > Self::MAX_CHARS {
            return Err(TaskDomainError::TitleTooLong(length));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the title as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TaskTitle {
    type Error = TaskDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TaskTitle> for String {
    fn from(title: TaskTitle) -> Self {
        title.0
    }
}

impl AsRef<str> for TaskTitle {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TaskTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Subjective mental effort rating in the inclusive range 1 to 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct CognitiveLoad(u8);

impl CognitiveLoad {
    /// Lowest accepted rating.
    pub const MIN: u8 = 1;
    /// Highest accepted rating.
    pub const MAX: u8 = 10;
    /// Rating assigned when the user gives none.
    pub const DEFAULT: Self = Self(5);

    /// Creates a validated cognitive load rating.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidCognitiveLoad`] when the value lies
    /// outside `1..=10`.
    pub fn new(value: i32) -> Result<Self, TaskDomainError> {
        u8::try_from(value)
            .ok()
            .filter(|rating| (Self::MIN..=Self::MAX).contains(rating))
            .map(Self)
            .ok_or(TaskDomainError::InvalidCognitiveLoad(value))
    }

    /// Returns the numeric rating.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl Default for CognitiveLoad {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<i32> for CognitiveLoad {
    type Error = TaskDomainError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CognitiveLoad> for i32 {
    fn from(load: CognitiveLoad) -> Self {
        Self::from(load.0)
    }
}

impl fmt::Display for CognitiveLoad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Non-negative duration in whole minutes.
///
/// The range matches a signed 32-bit column so every adapter accepts the
/// same values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Minutes(i32);

impl Minutes {
    /// Largest accepted number of minutes.
    pub const MAX: u32 = i32::MAX.unsigned_abs();

    /// Creates a validated duration.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidMinutes`] when `value` exceeds
    /// [`Self::MAX`].
    pub fn new(value: u32) -> Result<Self, TaskDomainError> {
        i32::try_from(value)
            .map(Self)
            .map_err(|_| TaskDomainError::InvalidMinutes(i64::from(value)))
    }

    /// Returns the number of minutes.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0.unsigned_abs()
    }
}

impl TryFrom<i32> for Minutes {
    type Error = TaskDomainError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        if value < 0 {
            return Err(TaskDomainError::InvalidMinutes(i64::from(value)));
        }
        Ok(Self(value))
    }
}

impl TryFrom<i64> for Minutes {
    type Error = TaskDomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        i32::try_from(value)
            .map_err(|_| TaskDomainError::InvalidMinutes(value))
            .and_then(Self::try_from)
    }
}

impl From<Minutes> for i32 {
    fn from(minutes: Minutes) -> Self {
        minutes.0
    }
}

impl From<Minutes> for i64 {
    fn from(minutes: Minutes) -> Self {
        Self::from(minutes.0)
    }
}

impl fmt::Display for Minutes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Optimistic concurrency version of a stored task.
///
/// Every committed mutation stores the next version, so a writer holding an
/// older snapshot can be detected even when the state is unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct TaskVersion(i64);

impl TaskVersion {
    /// Version of a freshly captured task.
    pub const INITIAL: Self = Self(0);

    /// Returns the version following this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Returns the numeric version.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for TaskVersion {
    type Error = TaskDomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value < 0 {
            return Err(TaskDomainError::InvalidVersion(value));
        }
        Ok(Self(value))
    }
}

impl From<TaskVersion> for i64 {
    fn from(version: TaskVersion) -> Self {
        version.0
    }
}

impl fmt::Display for TaskVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
