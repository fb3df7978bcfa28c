//! Port contracts for task lifecycle management.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod publisher;
pub mod repository;

pub use publisher::{EventPublishError, EventPublishResult, TransitionEventPublisher};
pub use repository::{TaskRepository, TaskRepositoryError, TaskRepositoryResult};
