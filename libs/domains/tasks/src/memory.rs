//! In-memory implementation of TaskRepository
//!
//! Backs handler and service tests without a MongoDB instance. Records are
//! kept in insertion order so paging behaves like the production store.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::TaskResult;
use crate::models::{CreateTask, Task, TaskFilter, UpdateTask};
use crate::repository::TaskRepository;

/// In-memory TaskRepository over an insertion-ordered vector
#[derive(Default)]
pub struct InMemoryTaskRepository {
    tasks: RwLock<Vec<Task>>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn matches(task: &Task, filter: &TaskFilter) -> bool {
        if let Some(importance) = filter.importance {
            if task.importance != importance {
                return false;
            }
        }
        if let Some(status) = filter.status {
            if task.status != status {
                return false;
            }
        }
        true
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn create(&self, input: CreateTask) -> TaskResult<Task> {
        let task = Task::new(input);
        self.tasks.write().await.push(task.clone());
        Ok(task)
    }

    async fn get_by_id(&self, id: Uuid) -> TaskResult<Option<Task>> {
        let tasks = self.tasks.read().await;
        Ok(tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn list(&self, filter: TaskFilter) -> TaskResult<Vec<Task>> {
        let tasks = self.tasks.read().await;
        Ok(tasks
            .iter()
            .filter(|t| Self::matches(t, &filter))
            .skip(filter.skip as usize)
            .take(filter.limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn count(&self, filter: TaskFilter) -> TaskResult<u64> {
        let tasks = self.tasks.read().await;
        Ok(tasks.iter().filter(|t| Self::matches(t, &filter)).count() as u64)
    }

    async fn replace(&self, id: Uuid, input: CreateTask) -> TaskResult<Option<Task>> {
        let mut tasks = self.tasks.write().await;
        let Some(existing) = tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };

        let replacement = existing.replace_with(input);
        *existing = replacement.clone();
        Ok(Some(replacement))
    }

    async fn update(&self, id: Uuid, input: UpdateTask) -> TaskResult<Option<Task>> {
        let mut tasks = self.tasks.write().await;
        let Some(existing) = tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };

        existing.apply_update(input);
        Ok(Some(existing.clone()))
    }

    async fn delete(&self, id: Uuid) -> TaskResult<bool> {
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        Ok(tasks.len() < before)
    }
}
