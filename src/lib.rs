//! Polaris: ADHD-friendly task management.
//!
//! This crate provides the task lifecycle core of Polaris: quick capture,
//! a validated state machine taking tasks from the inbox to the archive, and
//! the side effects each transition produces for activity logs and live
//! sessions.
//!
//! # Architecture
//!
//! Polaris follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, sessions, etc.)
//!
//! # Modules
//!
//! - [`task`]: Task capture, lifecycle transitions, and auto-archival

pub mod task;
