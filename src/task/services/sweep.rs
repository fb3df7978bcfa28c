//! Periodic auto-archive sweep over completed tasks.

use super::lifecycle::publish_events;
use crate::task::{
    config::LifecycleConfig,
    domain::{TaskLifecycleEngine, TaskState},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult, TransitionEventPublisher},
};
use mockable::Clock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Counters describing one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Completed tasks inspected.
    pub examined: usize,
    /// Tasks moved to the archive.
    pub archived: usize,
    /// Tasks skipped because another update committed first.
    pub conflicts: usize,
}

/// Drives [`TaskLifecycleEngine::check_auto_archive`] over every completed
/// task.
///
/// Each task is committed with a compare-and-swap on its observed version,
/// so a sweep racing a user action never overwrites it.
#[derive(Clone)]
pub struct AutoArchiveSweeper<R, P, C>
where
    R: TaskRepository,
    P: TransitionEventPublisher,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    publisher: Arc<P>,
    clock: Arc<C>,
    engine: TaskLifecycleEngine,
    interval: Duration,
}

impl<R, P, C> AutoArchiveSweeper<R, P, C>
where
    R: TaskRepository,
    P: TransitionEventPublisher,
    C: Clock + Send + Sync,
{
    /// Creates a sweeper using the engine and interval from `config`.
    #[must_use]
    pub const fn new(
        repository: Arc<R>,
        publisher: Arc<P>,
        clock: Arc<C>,
        config: &LifecycleConfig,
    ) -> Self {
        Self {
            repository,
            publisher,
            clock,
            engine: config.engine(),
            interval: config.sweep_interval(),
        }
    }

    /// Archives every completed task that is due.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError`] when loading or persisting fails for a
    /// reason other than a version conflict.
    pub async fn sweep_once(&self) -> TaskRepositoryResult<SweepReport> {
        let now = self.clock.utc();
        let done_tasks = self.repository.find_by_state(TaskState::Done).await?;
        let mut report = SweepReport {
            examined: done_tasks.len(),
            ..SweepReport::default()
        };

        for task in &done_tasks {
            let Some(outcome) = self.engine.check_auto_archive(task, now) else {
                continue;
            };
            match self
                .repository
                .update_if_version(outcome.task(), task.version())
                .await
            {
                Ok(()) => {
                    report.archived += 1;
                    publish_events(&*self.publisher, &outcome).await;
                }
                Err(TaskRepositoryError::VersionConflict { stored_state, .. }) => {
                    report.conflicts += 1;
                    tracing::warn!(
                        task_id = %task.id(),
                        %stored_state,
                        "skipped auto-archive after concurrent update"
                    );
                }
                Err(err) => return Err(err),
            }
        }

        tracing::info!(
            examined = report.examined,
            archived = report.archived,
            conflicts = report.conflicts,
            "auto-archive sweep finished"
        );
        Ok(report)
    }

    /// Sweeps on the configured interval until `shutdown` reads `true` or its
    /// sender is dropped.
    ///
    /// Failed sweeps are logged and retried on the next tick.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(err) = self.sweep_once().await {
                        tracing::warn!(error = %err, "auto-archive sweep failed");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
        tracing::debug!("auto-archive sweeper stopped");
    }
}
