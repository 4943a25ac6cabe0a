//! Task Service - Business logic layer

use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{TaskError, TaskResult};
use crate::models::{
    CreateTask, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, Task, TaskFilter, TaskPage, UpdateTask,
};
use crate::repository::TaskRepository;

/// Task service providing the six lifecycle operations.
///
/// The service validates inputs, normalizes pagination, and performs the
/// explicit existence checks that turn store no-ops into `NotFound`. It is
/// stateless aside from its repository handle, so one instance serves all
/// concurrent requests.
pub struct TaskService<R: TaskRepository> {
    repository: Arc<R>,
}

impl<R: TaskRepository> TaskService<R> {
    /// Create a new TaskService with the given repository
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create a new task with validation
    #[instrument(skip(self, input), fields(task_title = %input.title))]
    pub async fn create_task(&self, input: CreateTask) -> TaskResult<Task> {
        // Validate before any store call
        input
            .validate()
            .map_err(|e| TaskError::Validation(e.to_string()))?;

        let task = self.repository.create(input).await?;

        tracing::info!(task_id = %task.id, "Task created successfully");
        Ok(task)
    }

    /// List tasks matching the filter, returning one page plus the
    /// filtered total.
    ///
    /// The limit is normalized here so every transport gets the bound:
    /// values above [`MAX_PAGE_SIZE`] are clamped and non-positive values
    /// (which Mongo would read as "unbounded") fall back to
    /// [`DEFAULT_PAGE_SIZE`]. The count and the page fetch run concurrently
    /// since the total does not depend on the page window.
    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip))]
    pub async fn list_tasks(&self, filter: TaskFilter) -> TaskResult<TaskPage> {
        let limit = if filter.limit <= 0 {
            DEFAULT_PAGE_SIZE
        } else {
            filter.limit.min(MAX_PAGE_SIZE)
        };
        let filter = TaskFilter { limit, ..filter };

        let (total, tasks) = tokio::try_join!(
            self.repository.count(filter.clone()),
            self.repository.list(filter.clone()),
        )?;

        tracing::info!(total, page_len = tasks.len(), "Tasks listed");
        Ok(TaskPage {
            tasks,
            total,
            limit: filter.limit,
            skip: filter.skip,
        })
    }

    /// Get a task by ID
    #[instrument(skip(self), fields(task_id = %id))]
    pub async fn get_task(&self, id: Uuid) -> TaskResult<Task> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(TaskError::NotFound(id))
    }

    /// Replace the whole task at `id` with a new full record.
    ///
    /// Confirms existence first so an absent id is a distinguishable
    /// `NotFound` before any mutation is attempted. Never upserts.
    #[instrument(skip(self, input), fields(task_id = %id))]
    pub async fn replace_task(&self, id: Uuid, input: CreateTask) -> TaskResult<Task> {
        input
            .validate()
            .map_err(|e| TaskError::Validation(e.to_string()))?;

        self.get_task(id).await?;

        // A concurrent delete can still remove the record between the
        // check and the replace; that caller legitimately sees NotFound.
        let task = self
            .repository
            .replace(id, input)
            .await?
            .ok_or(TaskError::NotFound(id))?;

        tracing::info!(task_id = %id, "Task replaced successfully");
        Ok(task)
    }

    /// Merge the supplied fields into the task at `id`.
    #[instrument(skip(self, input), fields(task_id = %id))]
    pub async fn update_task(&self, id: Uuid, input: UpdateTask) -> TaskResult<Task> {
        input
            .validate()
            .map_err(|e| TaskError::Validation(e.to_string()))?;

        self.get_task(id).await?;

        let task = self
            .repository
            .update(id, input)
            .await?
            .ok_or(TaskError::NotFound(id))?;

        tracing::info!(task_id = %id, "Task updated successfully");
        Ok(task)
    }

    /// Delete the task at `id`
    #[instrument(skip(self), fields(task_id = %id))]
    pub async fn delete_task(&self, id: Uuid) -> TaskResult<()> {
        self.get_task(id).await?;

        let deleted = self.repository.delete(id).await?;
        if !deleted {
            return Err(TaskError::NotFound(id));
        }

        tracing::info!(task_id = %id, "Task deleted successfully");
        Ok(())
    }
}

impl<R: TaskRepository> Clone for TaskService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}
