//! Comment domain model.
//!
//! Comments are append-only: there is no edit or delete operation.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A comment on a report request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct Comment {
    pub id: Uuid,
    pub request_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
