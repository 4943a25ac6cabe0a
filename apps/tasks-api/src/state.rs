//! Application state management.
//!
//! The state is cloned for each handler (inexpensive Arc clones) and gives
//! access to the configuration, the MongoDB client for readiness probes,
//! and the task service.

use domain_tasks::{MongoTaskRepository, TaskService};
use mongodb::Client;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: crate::config::Config,
    /// MongoDB client (cloneable, shares underlying connection pool)
    pub mongo_client: Client,
    /// Task domain service over the MongoDB repository
    pub task_service: TaskService<MongoTaskRepository>,
}
