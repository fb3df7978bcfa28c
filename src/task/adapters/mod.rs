//! Adapter implementations of the task ports.
//!
//! - [`memory`]: in-memory repository, live session fan-out, activity log
//! - [`postgres`]: Diesel-backed `PostgreSQL` repository
//! - [`broadcast`]: publisher combinator

pub mod broadcast;
pub mod memory;
pub mod postgres;

pub use broadcast::BroadcastPublisher;
