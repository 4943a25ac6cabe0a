//! MongoDB implementation of TaskRepository

use async_trait::async_trait;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Bson, doc, to_bson},
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::TaskResult;
use crate::models::{CreateTask, Task, TaskFilter, UpdateTask};
use crate::repository::TaskRepository;

/// MongoDB implementation of the TaskRepository
pub struct MongoTaskRepository {
    collection: Collection<Task>,
}

impl MongoTaskRepository {
    /// Create a new MongoTaskRepository
    ///
    /// # Arguments
    /// * `db` - MongoDB database instance
    ///
    /// # Example
    /// ```ignore
    /// let client = Client::with_uri_str("mongodb://localhost:27017").await?;
    /// let db = client.database("mydb");
    /// let repo = MongoTaskRepository::new(db);
    /// ```
    pub fn new(db: Database) -> Self {
        let collection = db.collection::<Task>("tasks");
        Self { collection }
    }

    /// Create a new MongoTaskRepository with a custom collection name
    pub fn with_collection(db: Database, collection_name: &str) -> Self {
        let collection = db.collection::<Task>(collection_name);
        Self { collection }
    }

    /// Create the indexes the list filters rely on. Called once at startup.
    pub async fn init_indexes(&self) -> TaskResult<()> {
        let indexes = vec![
            IndexModel::builder().keys(doc! { "status": 1 }).build(),
            IndexModel::builder().keys(doc! { "importance": 1 }).build(),
            IndexModel::builder().keys(doc! { "created_at": 1 }).build(),
        ];

        self.collection.create_indexes(indexes).await?;

        tracing::info!("Task collection indexes initialized");
        Ok(())
    }

    fn id_filter(id: Uuid) -> mongodb::bson::Document {
        doc! { "_id": to_bson(&id).unwrap_or(Bson::Null) }
    }

    /// Build a MongoDB filter document from TaskFilter.
    ///
    /// Only fields actually present contribute; an empty filter matches
    /// everything. The paging window is applied separately in `list`.
    fn build_filter(filter: &TaskFilter) -> mongodb::bson::Document {
        let mut doc = doc! {};

        if let Some(ref importance) = filter.importance {
            doc.insert("importance", importance.to_string());
        }

        if let Some(ref status) = filter.status {
            doc.insert("status", status.to_string());
        }

        doc
    }
}

#[async_trait]
impl TaskRepository for MongoTaskRepository {
    #[instrument(skip(self, input), fields(task_title = %input.title))]
    async fn create(&self, input: CreateTask) -> TaskResult<Task> {
        let task = Task::new(input);

        self.collection.insert_one(&task).await?;

        Ok(task)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> TaskResult<Option<Task>> {
        let task = self.collection.find_one(Self::id_filter(id)).await?;
        Ok(task)
    }

    #[instrument(skip(self, filter))]
    async fn list(&self, filter: TaskFilter) -> TaskResult<Vec<Task>> {
        use futures_util::TryStreamExt;

        let mongo_filter = Self::build_filter(&filter);

        // Stable insertion order: created_at ascending (ids are v7, so
        // creation time tracks insertion).
        let options = mongodb::options::FindOptions::builder()
            .limit(filter.limit)
            .skip(filter.skip)
            .sort(doc! { "created_at": 1 })
            .build();

        let cursor = self
            .collection
            .find(mongo_filter)
            .with_options(options)
            .await?;
        let tasks: Vec<Task> = cursor.try_collect().await?;

        Ok(tasks)
    }

    #[instrument(skip(self, filter))]
    async fn count(&self, filter: TaskFilter) -> TaskResult<u64> {
        let mongo_filter = Self::build_filter(&filter);
        let count = self.collection.count_documents(mongo_filter).await?;
        Ok(count)
    }

    #[instrument(skip(self, input))]
    async fn replace(&self, id: Uuid, input: CreateTask) -> TaskResult<Option<Task>> {
        let filter = Self::id_filter(id);

        // Fetch first to keep the original created_at; replace_one without
        // upsert so an id deleted in between stays absent.
        let Some(existing) = self.collection.find_one(filter.clone()).await? else {
            return Ok(None);
        };

        let replacement = existing.replace_with(input);
        let result = self.collection.replace_one(filter, &replacement).await?;

        if result.matched_count == 0 {
            return Ok(None);
        }

        Ok(Some(replacement))
    }

    #[instrument(skip(self, input))]
    async fn update(&self, id: Uuid, input: UpdateTask) -> TaskResult<Option<Task>> {
        let filter = Self::id_filter(id);

        let Some(existing) = self.collection.find_one(filter.clone()).await? else {
            return Ok(None);
        };

        let mut updated = existing;
        updated.apply_update(input);

        let result = self.collection.replace_one(filter, &updated).await?;

        if result.matched_count == 0 {
            return Ok(None);
        }

        Ok(Some(updated))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> TaskResult<bool> {
        let result = self.collection.delete_one(Self::id_filter(id)).await?;
        Ok(result.deleted_count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TaskImportance, TaskStatus};

    #[test]
    fn test_build_filter_empty() {
        let filter = TaskFilter::default();
        let doc = MongoTaskRepository::build_filter(&filter);
        assert!(doc.is_empty());
    }

    #[test]
    fn test_build_filter_with_status() {
        let filter = TaskFilter {
            status: Some(TaskStatus::Done),
            ..Default::default()
        };
        let doc = MongoTaskRepository::build_filter(&filter);
        assert_eq!(doc.get_str("status").unwrap(), "done");
        assert!(!doc.contains_key("importance"));
    }

    #[test]
    fn test_build_filter_with_both_fields() {
        let filter = TaskFilter {
            importance: Some(TaskImportance::High),
            status: Some(TaskStatus::InProgress),
            ..Default::default()
        };
        let doc = MongoTaskRepository::build_filter(&filter);
        assert_eq!(doc.get_str("importance").unwrap(), "high");
        assert_eq!(doc.get_str("status").unwrap(), "in_progress");
    }

    #[test]
    fn test_build_filter_ignores_paging_window() {
        let filter = TaskFilter {
            limit: 5,
            skip: 10,
            ..Default::default()
        };
        let doc = MongoTaskRepository::build_filter(&filter);
        assert!(doc.is_empty());
    }
}
