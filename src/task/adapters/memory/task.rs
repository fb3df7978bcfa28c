//! In-memory repository for task lifecycle tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{Task, TaskId, TaskPage, TaskState, TaskVersion, UserId},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_poisoned(err: &impl std::fmt::Display) -> TaskRepositoryError {
    TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

/// Collects tasks matching `predicate`, oldest first.
fn collect_sorted(state: &InMemoryTaskState, predicate: impl Fn(&Task) -> bool) -> Vec<Task> {
    let mut tasks: Vec<Task> = state
        .tasks
        .values()
        .filter(|task| predicate(task))
        .cloned()
        .collect();
    tasks.sort_by_key(|task| (task.created_at(), task.id().into_inner()));
    tasks
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| lock_poisoned(&err))?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn update_if_version(
        &self,
        task: &Task,
        expected: TaskVersion,
    ) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| lock_poisoned(&err))?;
        let stored = state
            .tasks
            .get_mut(&task.id())
            .ok_or(TaskRepositoryError::NotFound(task.id()))?;
        if stored.version() != expected {
            return Err(TaskRepositoryError::VersionConflict {
                task_id: task.id(),
                expected,
                actual: stored.version(),
                stored_state: stored.state(),
            });
        }
        *stored = task.clone();
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.state.read().map_err(|err| lock_poisoned(&err))?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn find_by_state(&self, task_state: TaskState) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.state.read().map_err(|err| lock_poisoned(&err))?;
        Ok(collect_sorted(&state, |task| task.state() == task_state))
    }

    async fn find_by_owner(
        &self,
        owner: UserId,
        page: TaskPage,
    ) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.state.read().map_err(|err| lock_poisoned(&err))?;
        let mut owned = collect_sorted(&state, |task| task.owner() == owner);
        owned.reverse();
        Ok(owned
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(page.limit()).unwrap_or(usize::MAX))
            .collect())
    }
}
