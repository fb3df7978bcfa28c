//! Publisher port delivering transition events to activity logs and live
//! sessions.

use crate::task::domain::{TransitionEvent, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for event publishing.
pub type EventPublishResult<T> = Result<T, EventPublishError>;

/// Destination for transition events.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransitionEventPublisher: Send + Sync {
    /// Dispatches `events`, in order, on behalf of `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`EventPublishError`] when the destination rejects the events.
    async fn publish(&self, owner: UserId, events: &[TransitionEvent]) -> EventPublishResult<()>;
}

/// Errors returned by event publishers.
#[derive(Debug, Clone, Error)]
pub enum EventPublishError {
    /// The destination is unavailable.
    #[error("event destination unavailable: {0}")]
    Unavailable(String),

    /// Destination-specific failure.
    #[error("event publishing failed: {0}")]
    Backend(Arc<dyn std::error::Error + Send + Sync>),
}

impl EventPublishError {
    /// Wraps a destination failure.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Arc::new(err))
    }
}
