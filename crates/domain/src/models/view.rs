//! Request view tracking model.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Last time a user opened a request. One row per (request, user) pair,
/// upserted on view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct RequestView {
    pub id: Uuid,
    pub request_id: Uuid,
    pub user_id: Uuid,
    pub viewed_at: DateTime<Utc>,
}
