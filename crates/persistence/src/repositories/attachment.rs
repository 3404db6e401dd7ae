//! Attachment repository for database operations.

use domain::models::{Attachment, AttachmentKind, AttachmentListItem};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{AttachmentEntity, AttachmentKindDb, AttachmentWithUploaderEntity};
use crate::metrics::QueryTimer;

const ATTACHMENT_COLUMNS: &str = "id, request_id, comment_id, uploader_id, kind, filename, \
     stored_filename, file_type, file_size, created_at";

/// Repository for attachment database operations.
#[derive(Clone)]
pub struct AttachmentRepository {
    pool: PgPool,
}

impl AttachmentRepository {
    /// Creates a new AttachmentRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert an attachment record.
    #[allow(clippy::too_many_arguments)]
    pub async fn insert(
        &self,
        request_id: Uuid,
        comment_id: Option<Uuid>,
        uploader_id: Uuid,
        kind: AttachmentKind,
        filename: &str,
        stored_filename: &str,
        file_type: &str,
        file_size: i64,
    ) -> Result<Attachment, sqlx::Error> {
        let timer = QueryTimer::new("insert_attachment");
        let entity = sqlx::query_as::<_, AttachmentEntity>(&format!(
            r#"
            INSERT INTO attachments (
                request_id, comment_id, uploader_id, kind, filename,
                stored_filename, file_type, file_size
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            ATTACHMENT_COLUMNS
        ))
        .bind(request_id)
        .bind(comment_id)
        .bind(uploader_id)
        .bind(AttachmentKindDb::from(kind))
        .bind(filename)
        .bind(stored_filename)
        .bind(file_type)
        .bind(file_size)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        entity.map(Attachment::from)
    }

    /// Find an attachment by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Attachment>, sqlx::Error> {
        let timer = QueryTimer::new("find_attachment_by_id");
        let entity = sqlx::query_as::<_, AttachmentEntity>(&format!(
            "SELECT {} FROM attachments WHERE id = $1",
            ATTACHMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(entity?.map(Attachment::from))
    }

    /// List attachments on a request with uploader names, newest first.
    pub async fn list_for_request(
        &self,
        request_id: Uuid,
    ) -> Result<Vec<AttachmentListItem>, sqlx::Error> {
        let timer = QueryTimer::new("list_attachments_for_request");
        let entities = sqlx::query_as::<_, AttachmentWithUploaderEntity>(
            r#"
            SELECT
                a.id, a.request_id, a.comment_id, a.uploader_id,
                u.name AS uploader_name,
                a.kind, a.filename, a.stored_filename, a.file_type, a.file_size,
                a.created_at
            FROM attachments a
            JOIN users u ON a.uploader_id = u.id
            WHERE a.request_id = $1
            ORDER BY a.created_at DESC
            "#,
        )
        .bind(request_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        Ok(entities?.into_iter().map(AttachmentListItem::from).collect())
    }

    /// Stored filenames of every attachment on a request. Used to remove the
    /// physical files when the request is deleted.
    pub async fn stored_filenames_for_request(
        &self,
        request_id: Uuid,
    ) -> Result<Vec<String>, sqlx::Error> {
        let timer = QueryTimer::new("attachment_filenames_for_request");
        let names: Vec<String> = sqlx::query_scalar(
            "SELECT stored_filename FROM attachments WHERE request_id = $1",
        )
        .bind(request_id)
        .fetch_all(&self.pool)
        .await?;
        timer.record();
        Ok(names)
    }

    /// Delete an attachment record. Returns whether it existed.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_attachment");
        let result = sqlx::query("DELETE FROM attachments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }
}
