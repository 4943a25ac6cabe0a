//! MongoDB repository integration tests
//!
//! These tests start a MongoDB container via testcontainers and exercise
//! the repository against a real instance. They are ignored by default
//! because they need a running Docker daemon:
//!
//! ```sh
//! cargo test -p domain_tasks -- --ignored
//! ```

use domain_tasks::{
    CreateTask, MongoTaskRepository, TaskFilter, TaskImportance, TaskRepository, TaskStatus,
    UpdateTask,
};
use test_utils::{TestDataBuilder, TestMongo};
use uuid::Uuid;

fn input(title: &str, status: TaskStatus) -> CreateTask {
    CreateTask {
        title: title.to_string(),
        description: Some("integration fixture".to_string()),
        importance: TaskImportance::Medium,
        status,
    }
}

async fn repository(test_name: &str) -> (TestMongo, MongoTaskRepository) {
    let mongo = TestMongo::new().await;
    let builder = TestDataBuilder::from_test_name(test_name);
    let db = mongo.database(&builder.name("tasks", "db"));

    let repo = MongoTaskRepository::new(db);
    repo.init_indexes().await.expect("index creation failed");
    (mongo, repo)
}

#[tokio::test]
#[ignore]
async fn test_create_and_get_round_trip() {
    let (_mongo, repo) = repository("create_and_get").await;

    let created = repo
        .create(input("round trip", TaskStatus::Pending))
        .await
        .unwrap();
    let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();

    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.title, "round trip");
    assert_eq!(fetched.status, TaskStatus::Pending);
}

#[tokio::test]
#[ignore]
async fn test_list_and_count_respect_filter_and_window() {
    let (_mongo, repo) = repository("list_and_count").await;

    for i in 0..5 {
        repo.create(input(&format!("done {i}"), TaskStatus::Done))
            .await
            .unwrap();
    }
    repo.create(input("pending", TaskStatus::Pending))
        .await
        .unwrap();

    let filter = TaskFilter {
        status: Some(TaskStatus::Done),
        limit: 2,
        skip: 1,
        ..Default::default()
    };

    let page = repo.list(filter.clone()).await.unwrap();
    let total = repo.count(filter).await.unwrap();

    assert_eq!(page.len(), 2);
    assert_eq!(total, 5);
    // Insertion order: skipping the first matching record lands on "done 1"
    assert_eq!(page[0].title, "done 1");
}

#[tokio::test]
#[ignore]
async fn test_replace_is_strict_and_full() {
    let (_mongo, repo) = repository("replace_strict").await;

    let absent = repo
        .replace(Uuid::now_v7(), input("ghost", TaskStatus::Pending))
        .await
        .unwrap();
    assert!(absent.is_none());

    let created = repo
        .create(input("before", TaskStatus::Pending))
        .await
        .unwrap();
    let replaced = repo
        .replace(
            created.id,
            CreateTask {
                title: "after".to_string(),
                description: None,
                importance: TaskImportance::High,
                status: TaskStatus::Done,
            },
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(replaced.id, created.id);
    assert_eq!(replaced.created_at, created.created_at);
    assert_eq!(replaced.description, None);

    let stored = repo.get_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "after");
    assert_eq!(stored.description, None);
}

#[tokio::test]
#[ignore]
async fn test_update_merges_and_delete_removes() {
    let (_mongo, repo) = repository("update_and_delete").await;

    let created = repo
        .create(input("merge target", TaskStatus::Pending))
        .await
        .unwrap();

    let updated = repo
        .update(
            created.id,
            UpdateTask {
                status: Some(TaskStatus::InProgress),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.status, TaskStatus::InProgress);
    assert_eq!(updated.title, "merge target");
    assert_eq!(updated.description, Some("integration fixture".to_string()));

    assert!(repo.delete(created.id).await.unwrap());
    assert!(!repo.delete(created.id).await.unwrap());
    assert!(repo.get_by_id(created.id).await.unwrap().is_none());
}
