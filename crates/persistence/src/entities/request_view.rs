//! Request view entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::RequestView;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the request_views table.
#[derive(Debug, Clone, FromRow)]
pub struct RequestViewEntity {
    pub id: Uuid,
    pub request_id: Uuid,
    pub user_id: Uuid,
    pub viewed_at: DateTime<Utc>,
}

impl From<RequestViewEntity> for RequestView {
    fn from(entity: RequestViewEntity) -> Self {
        RequestView {
            id: entity.id,
            request_id: entity.request_id,
            user_id: entity.user_id,
            viewed_at: entity.viewed_at,
        }
    }
}
