//! Attachment domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who an attachment came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    /// Supplied by the requester as sample or reference material.
    Reference,
    /// Delivered by an admin in fulfillment of the request.
    Result,
}

impl std::fmt::Display for AttachmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttachmentKind::Reference => write!(f, "reference"),
            AttachmentKind::Result => write!(f, "result"),
        }
    }
}

/// A stored attachment. The physical file and this record are created and
/// deleted together.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct Attachment {
    pub id: Uuid,
    pub request_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_id: Option<Uuid>,
    pub uploader_id: Uuid,
    pub kind: AttachmentKind,
    /// Original filename as uploaded.
    pub filename: String,
    /// Generated collision-free name on disk.
    pub stored_filename: String,
    pub file_type: String,
    pub file_size: i64,
    pub created_at: DateTime<Utc>,
}

/// Attachment with the uploader's display name joined in, for listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct AttachmentListItem {
    pub id: Uuid,
    pub request_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_id: Option<Uuid>,
    pub uploader_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploader_name: Option<String>,
    pub kind: AttachmentKind,
    pub filename: String,
    pub stored_filename: String,
    pub file_type: String,
    pub file_size: i64,
    pub created_at: DateTime<Utc>,
}

/// An incoming upload before it is admitted by the attachment subsystem.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    /// Declared MIME type.
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// Extension of the original filename, or the empty string.
    pub fn extension(&self) -> &str {
        self.filename.rsplit_once('.').map_or("", |(_, ext)| ext)
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_kind_display() {
        assert_eq!(AttachmentKind::Reference.to_string(), "reference");
        assert_eq!(AttachmentKind::Result.to_string(), "result");
    }

    #[test]
    fn test_uploaded_file_extension() {
        let file = UploadedFile {
            filename: "report.final.xlsx".into(),
            content_type: "application/vnd.ms-excel".into(),
            bytes: vec![1, 2, 3],
        };
        assert_eq!(file.extension(), "xlsx");
        assert_eq!(file.size(), 3);
    }

    #[test]
    fn test_uploaded_file_no_extension() {
        let file = UploadedFile {
            filename: "README".into(),
            content_type: "text/plain".into(),
            bytes: vec![],
        };
        assert_eq!(file.extension(), "");
    }
}
