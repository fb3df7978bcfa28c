//! Domain model for task lifecycle management.
//!
//! The task domain models quick capture, validated detail updates, and the
//! lifecycle engine deciding state transitions. All infrastructure concerns
//! stay outside of the domain boundary.

mod error;
mod event;
mod ids;
mod lifecycle;
mod page;
mod state;
mod task;

pub use error::{ParseTaskStateError, TaskDomainError, TransitionError};
pub use event::{TransitionEvent, TransitionEventKind};
pub use ids::{CognitiveLoad, Minutes, TaskId, TaskTitle, TaskVersion, UserId};
pub use lifecycle::{TaskLifecycleEngine, TransitionOutcome, TransitionRequest};
pub use page::TaskPage;
pub use state::TaskState;
pub use task::{PersistedTaskData, Task, TaskDetailsUpdate};
