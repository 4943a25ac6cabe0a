use mongodb::{Client, options::ClientOptions};
use std::time::Duration;
use tracing::info;

use super::MongoConfig;
use crate::common::{RetryConfig, retry, retry_with_backoff};

/// Error type for MongoDB connection handling
#[derive(Debug, thiserror::Error)]
pub enum MongoError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
}

async fn connect_with_options(url: &str, config: Option<&MongoConfig>) -> Result<Client, MongoError> {
    info!("Attempting to connect to MongoDB at {}", url);

    let mut options = ClientOptions::parse(url).await?;

    match config {
        Some(config) => {
            options.max_pool_size = Some(config.max_pool_size);
            options.min_pool_size = Some(config.min_pool_size);
            options.connect_timeout = Some(Duration::from_secs(config.connect_timeout_secs));
            options.server_selection_timeout =
                Some(Duration::from_secs(config.server_selection_timeout_secs));
            if let Some(ref app_name) = config.app_name {
                options.app_name = Some(app_name.clone());
            }
        }
        None => {
            options.max_pool_size = Some(100);
            options.min_pool_size = Some(5);
            options.connect_timeout = Some(Duration::from_secs(10));
            options.server_selection_timeout = Some(Duration::from_secs(30));
        }
    }

    let client = Client::with_options(options)?;

    // Verify connectivity with a lightweight listing before handing the
    // client out; the driver itself connects lazily.
    client
        .list_database_names()
        .await
        .map_err(|e| MongoError::ConnectionFailed(e.to_string()))?;

    info!("Successfully connected to MongoDB");
    Ok(client)
}

/// Connect to MongoDB and return a verified Client
///
/// ```ignore
/// use database::mongodb::connect;
///
/// let client = connect("mongodb://localhost:27017").await?;
/// let db = client.database("tasks");
/// ```
pub async fn connect(url: &str) -> Result<Client, MongoError> {
    connect_with_options(url, None).await
}

/// Connect using a [`MongoConfig`]
///
/// Applies the config's pool sizes, timeouts, and app name.
///
/// ```ignore
/// use core_config::FromEnv;
/// use database::mongodb::{MongoConfig, connect_from_config};
///
/// let config = MongoConfig::from_env()?;
/// let client = connect_from_config(&config).await?;
/// ```
pub async fn connect_from_config(config: &MongoConfig) -> Result<Client, MongoError> {
    connect_with_options(&config.url, Some(config)).await
}

/// Connect with automatic retry on failure
///
/// Uses exponential backoff with jitter. Useful for transient network
/// issues during startup.
pub async fn connect_with_retry(
    url: &str,
    retry_config: Option<RetryConfig>,
) -> Result<Client, MongoError> {
    let url_owned = url.to_string();

    match retry_config {
        Some(config) => retry_with_backoff(|| connect(&url_owned), config).await,
        None => retry(|| connect(&url_owned)).await,
    }
}

/// Connect from a [`MongoConfig`] with automatic retry on failure
///
/// ```ignore
/// use database::common::RetryConfig;
/// use database::mongodb::{MongoConfig, connect_from_config_with_retry};
///
/// let retry_config = RetryConfig::new().with_max_retries(5);
/// let client = connect_from_config_with_retry(&config, Some(retry_config)).await?;
/// ```
pub async fn connect_from_config_with_retry(
    config: &MongoConfig,
    retry_config: Option<RetryConfig>,
) -> Result<Client, MongoError> {
    let config_clone = config.clone();

    match retry_config {
        Some(retry_cfg) => {
            retry_with_backoff(|| connect_from_config(&config_clone), retry_cfg).await
        }
        None => retry(|| connect_from_config(&config_clone)).await,
    }
}
