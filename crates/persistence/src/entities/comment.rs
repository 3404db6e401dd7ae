//! Comment entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::Comment;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the comments table.
#[derive(Debug, Clone, FromRow)]
pub struct CommentEntity {
    pub id: Uuid,
    pub request_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<CommentEntity> for Comment {
    fn from(entity: CommentEntity) -> Self {
        Comment {
            id: entity.id,
            request_id: entity.request_id,
            author_id: entity.author_id,
            content: entity.content,
            created_at: entity.created_at,
        }
    }
}
