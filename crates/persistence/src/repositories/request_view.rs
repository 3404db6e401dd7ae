//! Request view repository for database operations.

use domain::models::RequestView;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::RequestViewEntity;
use crate::metrics::QueryTimer;

/// Repository for request view markers. One row per (request, user) pair.
#[derive(Clone)]
pub struct RequestViewRepository {
    pool: PgPool,
}

impl RequestViewRepository {
    /// Creates a new RequestViewRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Mark a request as viewed now, creating or refreshing the marker.
    pub async fn upsert(
        &self,
        request_id: Uuid,
        user_id: Uuid,
    ) -> Result<RequestView, sqlx::Error> {
        let timer = QueryTimer::new("upsert_request_view");
        let entity = sqlx::query_as::<_, RequestViewEntity>(
            r#"
            INSERT INTO request_views (request_id, user_id, viewed_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (request_id, user_id)
            DO UPDATE SET viewed_at = NOW()
            RETURNING id, request_id, user_id, viewed_at
            "#,
        )
        .bind(request_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        entity.map(RequestView::from)
    }

    /// Find the view marker for a (request, user) pair.
    pub async fn find(
        &self,
        request_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<RequestView>, sqlx::Error> {
        let timer = QueryTimer::new("find_request_view");
        let entity = sqlx::query_as::<_, RequestViewEntity>(
            r#"
            SELECT id, request_id, user_id, viewed_at
            FROM request_views
            WHERE request_id = $1 AND user_id = $2
            "#,
        )
        .bind(request_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(entity?.map(RequestView::from))
    }
}
