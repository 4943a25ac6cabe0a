use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Default page size when `limit` is absent or unusable.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Upper bound on page size. Larger requests are clamped, never rejected.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Task importance
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TaskImportance {
    Low,
    #[default]
    Medium,
    High,
}

/// Task status
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TaskStatus {
    /// Task has not been started
    #[default]
    Pending,
    /// Task is being worked on
    InProgress,
    /// Task is finished
    Done,
}

/// Task entity - represents a task stored in MongoDB
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Task {
    /// Unique identifier (stored as _id in MongoDB)
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    /// Task title
    pub title: String,
    /// Optional free-form description
    pub description: Option<String>,
    /// Importance level
    pub importance: TaskImportance,
    /// Current status
    pub status: TaskStatus,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// DTO for creating a task. Also the full-record body for replace, since a
/// replace overwrites every field: anything absent here becomes absent on
/// the stored record.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateTask {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub importance: TaskImportance,
    #[serde(default)]
    pub status: TaskStatus,
}

/// DTO for partially updating a task. Only fields present in the request
/// are merged; `description` distinguishes "absent" (keep) from `null`
/// (clear).
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateTask {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, nullable)]
    pub description: Option<Option<String>>,
    pub importance: Option<TaskImportance>,
    pub status: Option<TaskStatus>,
}

/// Query parameters for listing tasks.
///
/// `limit` and `skip` never cause a rejection: non-numeric or negative
/// values fall back to their defaults, and a `limit` above
/// [`MAX_PAGE_SIZE`] is clamped by the service.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema, IntoParams)]
pub struct TaskFilter {
    /// Filter by importance
    pub importance: Option<TaskImportance>,
    /// Filter by status
    pub status: Option<TaskStatus>,
    /// Maximum number of results (default 20, clamped to 100)
    #[serde(default = "default_limit", deserialize_with = "lenient_limit")]
    pub limit: i64,
    /// Number of results to skip (default 0)
    #[serde(default, deserialize_with = "lenient_skip")]
    pub skip: u64,
}

/// One page of tasks plus the filtered total, echoing the effective
/// pagination window (`hasMore = skip + tasks.len() < total`).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TaskPage {
    pub tasks: Vec<Task>,
    pub total: u64,
    pub limit: i64,
    pub skip: u64,
}

fn default_limit() -> i64 {
    DEFAULT_PAGE_SIZE
}

// Derived Default would zero the limit, and limit 0 means "unbounded" to
// the driver.
impl Default for TaskFilter {
    fn default() -> Self {
        Self {
            importance: None,
            status: None,
            limit: DEFAULT_PAGE_SIZE,
            skip: 0,
        }
    }
}

/// Deserialize a field so that an explicit `null` becomes `Some(None)`
/// while an absent field stays `None` (via `#[serde(default)]`).
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Visitor that coerces any representation to an integer, substituting the
/// default for values below `min` or values that do not parse.
struct LenientNumber {
    default: i64,
    min: i64,
}

impl LenientNumber {
    fn coerce(&self, value: i64) -> i64 {
        if value < self.min { self.default } else { value }
    }
}

impl<'de> Visitor<'de> for LenientNumber {
    type Value = i64;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an integer, a numeric string, or nothing")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> {
        Ok(self.coerce(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
        Ok(self.coerce(i64::try_from(v).unwrap_or(i64::MAX)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<i64, E> {
        if v.is_finite() {
            Ok(self.coerce(v as i64))
        } else {
            Ok(self.default)
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<i64, E> {
        Ok(v.trim()
            .parse::<i64>()
            .map_or(self.default, |parsed| self.coerce(parsed)))
    }

    fn visit_unit<E: de::Error>(self) -> Result<i64, E> {
        Ok(self.default)
    }

    fn visit_none<E: de::Error>(self) -> Result<i64, E> {
        Ok(self.default)
    }
}

fn lenient_limit<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    // Zero is below min: a zero limit would mean "unbounded" downstream.
    deserializer.deserialize_any(LenientNumber {
        default: DEFAULT_PAGE_SIZE,
        min: 1,
    })
}

fn lenient_skip<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer
        .deserialize_any(LenientNumber { default: 0, min: 0 })
        .map(|v| v as u64)
}

impl Task {
    /// Create a new task from the CreateTask DTO, assigning a fresh id
    pub fn new(input: CreateTask) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            title: input.title,
            description: input.description,
            importance: input.importance,
            status: input.status,
            created_at: now,
            updated_at: now,
        }
    }

    /// Build the full record that replaces this one. Every field comes from
    /// the input; only the id and creation time survive.
    pub fn replace_with(&self, input: CreateTask) -> Self {
        Self {
            id: self.id,
            title: input.title,
            description: input.description,
            importance: input.importance,
            status: input.status,
            created_at: self.created_at,
            updated_at: Utc::now(),
        }
    }

    /// Merge the fields present in the UpdateTask DTO into this task
    pub fn apply_update(&mut self, update: UpdateTask) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(importance) = update.importance {
            self.importance = importance;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        self.updated_at = Utc::now();
    }
}
