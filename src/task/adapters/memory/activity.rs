//! Append-only in-memory activity log.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};

use crate::task::{
    domain::{TaskId, TransitionEvent, UserId},
    ports::{EventPublishResult, TransitionEventPublisher},
};

/// One recorded transition event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    /// User the task belongs to.
    pub owner: UserId,
    /// Recorded event.
    pub event: TransitionEvent,
}

/// Thread-safe in-memory activity log.
#[derive(Debug, Clone, Default)]
pub struct InMemoryActivityLog {
    entries: Arc<RwLock<Vec<ActivityEntry>>>,
}

impl InMemoryActivityLog {
    /// Creates an empty activity log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every entry in recording order.
    #[must_use]
    pub fn entries(&self) -> Vec<ActivityEntry> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the entries recorded for `task_id` in recording order.
    #[must_use]
    pub fn entries_for_task(&self, task_id: TaskId) -> Vec<ActivityEntry> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|entry| entry.event.task_id == task_id)
            .copied()
            .collect()
    }
}

#[async_trait]
impl TransitionEventPublisher for InMemoryActivityLog {
    async fn publish(&self, owner: UserId, events: &[TransitionEvent]) -> EventPublishResult<()> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(events.iter().map(|event| ActivityEntry {
                owner,
                event: *event,
            }));
        Ok(())
    }
}
