//! Attachment entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::{Attachment, AttachmentKind, AttachmentListItem};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for attachment kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "attachment_kind", rename_all = "snake_case")]
pub enum AttachmentKindDb {
    Reference,
    Result,
}

impl From<AttachmentKindDb> for AttachmentKind {
    fn from(kind: AttachmentKindDb) -> Self {
        match kind {
            AttachmentKindDb::Reference => AttachmentKind::Reference,
            AttachmentKindDb::Result => AttachmentKind::Result,
        }
    }
}

impl From<AttachmentKind> for AttachmentKindDb {
    fn from(kind: AttachmentKind) -> Self {
        match kind {
            AttachmentKind::Reference => AttachmentKindDb::Reference,
            AttachmentKind::Result => AttachmentKindDb::Result,
        }
    }
}

/// Database row mapping for the attachments table.
#[derive(Debug, Clone, FromRow)]
pub struct AttachmentEntity {
    pub id: Uuid,
    pub request_id: Uuid,
    pub comment_id: Option<Uuid>,
    pub uploader_id: Uuid,
    pub kind: AttachmentKindDb,
    pub filename: String,
    pub stored_filename: String,
    pub file_type: String,
    pub file_size: i64,
    pub created_at: DateTime<Utc>,
}

impl From<AttachmentEntity> for Attachment {
    fn from(entity: AttachmentEntity) -> Self {
        Attachment {
            id: entity.id,
            request_id: entity.request_id,
            comment_id: entity.comment_id,
            uploader_id: entity.uploader_id,
            kind: entity.kind.into(),
            filename: entity.filename,
            stored_filename: entity.stored_filename,
            file_type: entity.file_type,
            file_size: entity.file_size,
            created_at: entity.created_at,
        }
    }
}

/// Attachment row joined with the uploader's display name.
#[derive(Debug, Clone, FromRow)]
pub struct AttachmentWithUploaderEntity {
    pub id: Uuid,
    pub request_id: Uuid,
    pub comment_id: Option<Uuid>,
    pub uploader_id: Uuid,
    pub uploader_name: Option<String>,
    pub kind: AttachmentKindDb,
    pub filename: String,
    pub stored_filename: String,
    pub file_type: String,
    pub file_size: i64,
    pub created_at: DateTime<Utc>,
}

impl From<AttachmentWithUploaderEntity> for AttachmentListItem {
    fn from(entity: AttachmentWithUploaderEntity) -> Self {
        AttachmentListItem {
            id: entity.id,
            request_id: entity.request_id,
            comment_id: entity.comment_id,
            uploader_id: entity.uploader_id,
            uploader_name: entity.uploader_name,
            kind: entity.kind.into(),
            filename: entity.filename,
            stored_filename: entity.stored_filename,
            file_type: entity.file_type,
            file_size: entity.file_size,
            created_at: entity.created_at,
        }
    }
}
