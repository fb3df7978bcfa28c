//! Offset paging for task listings.

use super::TaskDomainError;

/// Window over a newest-first task listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskPage {
    offset: u32,
    limit: u32,
}

impl TaskPage {
    /// Number of tasks returned when the caller gives no limit.
    pub const DEFAULT_LIMIT: u32 = 100;
    /// Largest limit a single page may request.
    pub const MAX_LIMIT: u32 = 500;

    /// Creates a page skipping `offset` tasks and returning at most `limit`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::PageLimitTooLarge`] when `limit` exceeds
    /// [`Self::MAX_LIMIT`].
    pub const fn new(offset: u32, limit: u32) -> Result<Self, TaskDomainError> {
        if limit > Self::MAX_LIMIT {
            return Err(TaskDomainError::PageLimitTooLarge(limit));
        }
        Ok(Self { offset, limit })
    }

    /// Returns the number of tasks skipped.
    #[must_use]
    pub const fn offset(self) -> u32 {
        self.offset
    }

    /// Returns the maximum number of tasks returned.
    #[must_use]
    pub const fn limit(self) -> u32 {
        self.limit
    }
}

impl Default for TaskPage {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}
