//! Audit log repository for database operations.

use domain::models::{AuditEntry, RecordAuditInput};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::AuditLogEntity;
use crate::metrics::QueryTimer;

const AUDIT_COLUMNS: &str = "id, actor_id, action, resource_type, resource_id, details, \
     ip_address, user_agent, created_at";

/// Repository for audit log database operations. Entries are append-only.
#[derive(Clone)]
pub struct AuditLogRepository {
    pool: PgPool,
}

impl AuditLogRepository {
    /// Creates a new AuditLogRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append an audit entry.
    pub async fn insert(&self, input: RecordAuditInput) -> Result<AuditEntry, sqlx::Error> {
        let details_json = match &input.details {
            Some(details) => Some(
                serde_json::to_value(details)
                    .map_err(|e| sqlx::Error::Encode(Box::new(e)))?,
            ),
            None => None,
        };

        let timer = QueryTimer::new("insert_audit_entry");
        let entity = sqlx::query_as::<_, AuditLogEntity>(&format!(
            r#"
            INSERT INTO audit_logs (
                actor_id, action, resource_type, resource_id, details,
                ip_address, user_agent
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            AUDIT_COLUMNS
        ))
        .bind(input.actor_id)
        .bind(input.action.to_string())
        .bind(input.resource_type.to_string())
        .bind(&input.resource_id)
        .bind(details_json)
        .bind(&input.context.ip_address)
        .bind(&input.context.user_agent)
        .fetch_one(&self.pool)
        .await?;
        timer.record();

        AuditEntry::try_from(entity).map_err(|e| sqlx::Error::Decode(e.into()))
    }

    /// Append an audit entry asynchronously (fire and forget).
    /// Uses tokio::spawn to avoid blocking the operation being audited.
    pub fn insert_async(&self, input: RecordAuditInput) {
        let pool = self.pool.clone();
        tokio::spawn(async move {
            let repo = AuditLogRepository::new(pool);
            if let Err(e) = repo.insert(input).await {
                tracing::error!("Failed to insert audit entry: {}", e);
            }
        });
    }

    /// List audit entries with pagination, newest first. Returns the page and
    /// the total count.
    pub async fn list(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<(Vec<AuditEntry>, i64), sqlx::Error> {
        let per_page = per_page.clamp(1, 100);
        let offset = crate::repositories::page_offset(page, per_page);

        let timer = QueryTimer::new("list_audit_entries");
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM audit_logs")
            .fetch_one(&self.pool)
            .await?;

        let entities = sqlx::query_as::<_, AuditLogEntity>(&format!(
            r#"
            SELECT {}
            FROM audit_logs
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
            AUDIT_COLUMNS
        ))
        .bind(per_page as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        timer.record();

        let entries = entities
            .into_iter()
            .map(|entity| AuditEntry::try_from(entity).map_err(|e| sqlx::Error::Decode(e.into())))
            .collect::<Result<Vec<_>, _>>()?;

        Ok((entries, total))
    }

    /// Timeline of entries for one resource, newest first.
    pub async fn timeline(&self, resource_id: &str) -> Result<Vec<AuditEntry>, sqlx::Error> {
        let timer = QueryTimer::new("audit_timeline");
        let entities = sqlx::query_as::<_, AuditLogEntity>(&format!(
            r#"
            SELECT {}
            FROM audit_logs
            WHERE resource_id = $1
            ORDER BY created_at DESC
            "#,
            AUDIT_COLUMNS
        ))
        .bind(resource_id)
        .fetch_all(&self.pool)
        .await?;
        timer.record();

        entities
            .into_iter()
            .map(|entity| AuditEntry::try_from(entity).map_err(|e| sqlx::Error::Decode(e.into())))
            .collect()
    }

    /// Timeline of entries made by or about one user, newest first.
    pub async fn for_actor(&self, actor_id: Uuid) -> Result<Vec<AuditEntry>, sqlx::Error> {
        let timer = QueryTimer::new("audit_for_actor");
        let entities = sqlx::query_as::<_, AuditLogEntity>(&format!(
            r#"
            SELECT {}
            FROM audit_logs
            WHERE actor_id = $1
            ORDER BY created_at DESC
            "#,
            AUDIT_COLUMNS
        ))
        .bind(actor_id)
        .fetch_all(&self.pool)
        .await?;
        timer.record();

        entities
            .into_iter()
            .map(|entity| AuditEntry::try_from(entity).map_err(|e| sqlx::Error::Decode(e.into())))
            .collect()
    }
}
