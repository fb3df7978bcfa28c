//! In-memory adapter implementations.
//!
//! These adapters provide simple, thread-safe implementations suitable for
//! tests and single-process deployments without database dependencies.

mod activity;
mod session;
mod task;

pub use activity::{ActivityEntry, InMemoryActivityLog};
pub use session::{SessionHandle, SessionId, SessionRegistry};
pub use task::InMemoryTaskRepository;
