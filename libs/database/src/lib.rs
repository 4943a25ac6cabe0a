//! Database library providing the MongoDB connector and utilities
//!
//! Connection management, startup retry, and health checks for services
//! persisting to MongoDB.
//!
//! # Features
//!
//! - `mongodb` (default) - MongoDB support
//! - `config` - Configuration support with `core_config::FromEnv`
//!
//! # Examples
//!
//! ```ignore
//! use database::mongodb;
//!
//! let client = mongodb::connect("mongodb://localhost:27017").await?;
//! let db = client.database("mydb");
//! let collection = db.collection::<Document>("tasks");
//! ```
//!
//! With retry at startup:
//!
//! ```ignore
//! use database::common::RetryConfig;
//! use database::mongodb::connect_from_config_with_retry;
//!
//! let retry = RetryConfig::new().with_max_retries(5);
//! let client = connect_from_config_with_retry(&config, Some(retry)).await?;
//! ```

pub mod common;

#[cfg(feature = "mongodb")]
pub mod mongodb;

pub use common::{DatabaseError, DatabaseResult};
