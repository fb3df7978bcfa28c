//! Application services for task lifecycle orchestration.

mod lifecycle;
mod sweep;

pub use lifecycle::{
    CaptureTaskRequest, TaskLifecycleError, TaskLifecycleResult, TaskLifecycleService,
    TransitionTaskRequest, UpdateTaskDetailsRequest,
};
pub use sweep::{AutoArchiveSweeper, SweepReport};
