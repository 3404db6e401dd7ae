//! Notification log repository for database operations.

use chrono::{DateTime, Utc};
use domain::models::{DeliveryOutcome, NotificationKind, NotificationLogEntry};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{DeliveryOutcomeDb, NotificationKindDb, NotificationLogEntity};
use crate::metrics::QueryTimer;

const NOTIFICATION_COLUMNS: &str = "id, user_id, request_id, kind, message, outcome, sent_at, \
     error_message, created_at";

/// Repository for notification log database operations.
#[derive(Clone)]
pub struct NotificationLogRepository {
    pool: PgPool,
}

impl NotificationLogRepository {
    /// Creates a new NotificationLogRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record one delivery attempt.
    #[allow(clippy::too_many_arguments)]
    pub async fn insert(
        &self,
        user_id: Uuid,
        request_id: Uuid,
        kind: NotificationKind,
        message: &str,
        outcome: DeliveryOutcome,
        sent_at: Option<DateTime<Utc>>,
        error_message: Option<&str>,
    ) -> Result<NotificationLogEntry, sqlx::Error> {
        let timer = QueryTimer::new("insert_notification_log");
        let entity = sqlx::query_as::<_, NotificationLogEntity>(&format!(
            r#"
            INSERT INTO notification_logs (
                user_id, request_id, kind, message, outcome, sent_at, error_message
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            NOTIFICATION_COLUMNS
        ))
        .bind(user_id)
        .bind(request_id)
        .bind(NotificationKindDb::from(kind))
        .bind(message)
        .bind(DeliveryOutcomeDb::from(outcome))
        .bind(sent_at)
        .bind(error_message)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        entity.map(NotificationLogEntry::from)
    }

    /// List delivery attempts for a request, newest first.
    pub async fn list_for_request(
        &self,
        request_id: Uuid,
    ) -> Result<Vec<NotificationLogEntry>, sqlx::Error> {
        let timer = QueryTimer::new("list_notifications_for_request");
        let entities = sqlx::query_as::<_, NotificationLogEntity>(&format!(
            r#"
            SELECT {}
            FROM notification_logs
            WHERE request_id = $1
            ORDER BY created_at DESC
            "#,
            NOTIFICATION_COLUMNS
        ))
        .bind(request_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        Ok(entities?.into_iter().map(NotificationLogEntry::from).collect())
    }
}
