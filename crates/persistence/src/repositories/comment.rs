//! Comment repository for database operations.

use domain::models::Comment;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::CommentEntity;
use crate::metrics::QueryTimer;

/// Repository for comment database operations. Comments are append-only.
#[derive(Clone)]
pub struct CommentRepository {
    pool: PgPool,
}

impl CommentRepository {
    /// Creates a new CommentRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append a comment to a request.
    pub async fn insert(
        &self,
        request_id: Uuid,
        author_id: Uuid,
        content: &str,
    ) -> Result<Comment, sqlx::Error> {
        let timer = QueryTimer::new("insert_comment");
        let entity = sqlx::query_as::<_, CommentEntity>(
            r#"
            INSERT INTO comments (request_id, author_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, request_id, author_id, content, created_at
            "#,
        )
        .bind(request_id)
        .bind(author_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        entity.map(Comment::from)
    }

    /// List comments on a request, oldest first.
    pub async fn list_for_request(&self, request_id: Uuid) -> Result<Vec<Comment>, sqlx::Error> {
        let timer = QueryTimer::new("list_comments_for_request");
        let entities = sqlx::query_as::<_, CommentEntity>(
            r#"
            SELECT id, request_id, author_id, content, created_at
            FROM comments
            WHERE request_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(request_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        Ok(entities?.into_iter().map(Comment::from).collect())
    }

    /// Count comments on a request written by other users after the given
    /// point in time. A null cutoff counts every foreign comment.
    pub async fn count_unread(
        &self,
        request_id: Uuid,
        user_id: Uuid,
        since: Option<chrono::DateTime<chrono::Utc>>,
    ) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_unread_comments");
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM comments
            WHERE request_id = $1
              AND author_id <> $2
              AND ($3::timestamptz IS NULL OR created_at > $3)
            "#,
        )
        .bind(request_id)
        .bind(user_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await?;
        timer.record();
        Ok(count)
    }
}
