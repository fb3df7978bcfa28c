//! Task lifecycle management for Polaris.
//!
//! Tasks are captured into the inbox and move through triage, active work,
//! blocking, completion, and archival. The [`domain::TaskLifecycleEngine`]
//! decides every state change as a pure function of the task snapshot, the
//! request, and the current time; services persist its results with a
//! per-task compare-and-swap and dispatch the resulting events. The module
//! follows hexagonal architecture:
//!
//! - Domain types and the engine in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]
//! - Runtime settings in [`config`]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
