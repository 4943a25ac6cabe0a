use async_trait::async_trait;
use uuid::Uuid;

use crate::error::TaskResult;
use crate::models::{CreateTask, Task, TaskFilter, UpdateTask};

/// Repository trait for Task persistence
///
/// This trait defines the data access interface for tasks.
/// Implementations can use different storage backends (MongoDB, an
/// in-memory map for tests, etc.). No method upserts: `replace` and
/// `update` return `None` when the id has no record, and the caller
/// decides what absence means.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Persist a new task, assigning its id
    async fn create(&self, input: CreateTask) -> TaskResult<Task>;

    /// Get a task by ID
    async fn get_by_id(&self, id: Uuid) -> TaskResult<Option<Task>>;

    /// List tasks matching the filter, bounded by its `limit`/`skip` window
    async fn list(&self, filter: TaskFilter) -> TaskResult<Vec<Task>>;

    /// Count tasks matching the filter, ignoring the pagination window
    async fn count(&self, filter: TaskFilter) -> TaskResult<u64>;

    /// Replace the whole record at `id`, keeping only id and creation time.
    /// Returns `None` if no record exists.
    async fn replace(&self, id: Uuid, input: CreateTask) -> TaskResult<Option<Task>>;

    /// Merge the supplied fields into the record at `id`.
    /// Returns `None` if no record exists.
    async fn update(&self, id: Uuid, input: UpdateTask) -> TaskResult<Option<Task>>;

    /// Delete the record at `id`. Returns whether a record was removed.
    async fn delete(&self, id: Uuid) -> TaskResult<bool>;
}
