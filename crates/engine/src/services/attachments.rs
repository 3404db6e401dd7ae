//! Attachment subsystem.
//!
//! Files live on disk under the configured upload directory; rows live in
//! the attachments table. The two are created and deleted together. Admins
//! delivering result files can ask for a password-protected archive; the
//! password is the requester's directory username, so only the requester can
//! open their own results.

use std::path::{Path, PathBuf};

use domain::models::{
    Actor, Attachment, AttachmentKind, AttachmentListItem, AuditAction, AuditDetails,
    AuditResourceType, RecordAuditInput, RequestContext, UploadedFile, User,
};
use domain::services::{policy, ArchiveTool};
use persistence::repositories::{AttachmentRepository, ReportRequestRepository, UserRepository};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::error::EngineError;
use crate::services::AuditRecorder;

/// Collision-free on-disk name for an upload.
fn stored_name(id: Uuid, extension: &str) -> String {
    if extension.is_empty() {
        id.to_string()
    } else {
        format!("{}.{}", id, extension)
    }
}

/// What ends up on disk and in the attachments row for one admitted upload.
struct StoredUpload {
    stored_filename: String,
    filename: String,
    file_type: String,
    file_size: i64,
}

/// Produce the password-protected container for a result delivery. The
/// password is the request owner's directory username, so only the requester
/// can open their own results. The upload is staged in a temp directory under
/// its original name so the entry inside the archive is recognizable; the
/// staging area is removed whether or not compression succeeds, and a failed
/// run leaves no partial container behind.
async fn build_encrypted_archive(
    archive: &dyn ArchiveTool,
    upload_dir: &Path,
    owner: &User,
    attachment_id: Uuid,
    file: &UploadedFile,
) -> Result<StoredUpload, EngineError> {
    let stored_filename = format!("{}.zip", attachment_id);
    let dest = upload_dir.join(&stored_filename);

    let temp_dir = upload_dir.join(format!("tmp-{}", attachment_id));
    tokio::fs::create_dir_all(&temp_dir).await?;
    let temp_path = temp_dir.join(&file.filename);
    tokio::fs::write(&temp_path, &file.bytes).await?;

    let result = archive
        .compress(&temp_path, &dest, &owner.external_username)
        .await;

    if let Err(e) = tokio::fs::remove_dir_all(&temp_dir).await {
        warn!("Failed to remove temp upload directory: {}", e);
    }

    if let Err(e) = result {
        // The tool may die mid-write; make sure no orphan container survives.
        if let Err(unlink) = tokio::fs::remove_file(&dest).await {
            if unlink.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %dest.display(), "Failed to remove partial archive: {}", unlink);
            }
        }
        return Err(EngineError::Internal(e.into()));
    }

    let file_size = tokio::fs::metadata(&dest).await?.len() as i64;
    Ok(StoredUpload {
        stored_filename,
        filename: format!("{}.zip", file.filename),
        file_type: "application/zip".to_string(),
        file_size,
    })
}

/// Manages upload, delivery and deletion of request attachments.
#[derive(Clone)]
pub struct AttachmentService {
    requests: ReportRequestRepository,
    attachments: AttachmentRepository,
    users: UserRepository,
    audit: AuditRecorder,
    archive: Arc<dyn ArchiveTool>,
    upload_dir: PathBuf,
}

impl AttachmentService {
    pub fn new(
        requests: ReportRequestRepository,
        attachments: AttachmentRepository,
        users: UserRepository,
        audit: AuditRecorder,
        archive: Arc<dyn ArchiveTool>,
        upload_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            requests,
            attachments,
            users,
            audit,
            archive,
            upload_dir: upload_dir.into(),
        }
    }

    /// Admit an upload. The permission gate decides whether the file lands as
    /// reference material or a delivered result; `encrypt` asks for a
    /// password-protected archive and is honored only on the result path.
    pub async fn upload(
        &self,
        actor: &Actor,
        request_id: Uuid,
        file: UploadedFile,
        comment_id: Option<Uuid>,
        encrypt: bool,
        context: RequestContext,
    ) -> Result<Attachment, EngineError> {
        let request = self
            .requests
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Request"))?;

        let kind = policy::can_upload(actor, &request)?;
        let encrypt = encrypt && kind == AttachmentKind::Result;

        // The archive container replaces the file wholesale, so the MIME
        // allow-list only applies to files stored as-is.
        if !encrypt && !shared::validation::is_allowed_file_type(&file.content_type) {
            return Err(EngineError::field(
                "file",
                "file_type",
                "File type is not allowed",
            ));
        }
        if !shared::validation::is_allowed_file_size(file.size()) {
            return Err(EngineError::field(
                "file",
                "file_size",
                "File exceeds the maximum size of 10 MiB",
            ));
        }

        tokio::fs::create_dir_all(&self.upload_dir).await?;

        let attachment_id = Uuid::new_v4();
        let stored = if encrypt {
            // The password must resolve before anything touches the disk.
            let owner = self
                .users
                .find_by_id(request.requested_by)
                .await?
                .ok_or_else(|| {
                    EngineError::Internal(anyhow::anyhow!(
                        "Request owner {} has no user record",
                        request.requested_by
                    ))
                })?;

            build_encrypted_archive(
                self.archive.as_ref(),
                &self.upload_dir,
                &owner,
                attachment_id,
                &file,
            )
            .await?
        } else {
            let stored_filename = stored_name(attachment_id, file.extension());
            tokio::fs::write(self.upload_dir.join(&stored_filename), &file.bytes).await?;
            StoredUpload {
                stored_filename,
                filename: file.filename.clone(),
                file_type: file.content_type.clone(),
                file_size: file.size() as i64,
            }
        };

        let attachment = self
            .attachments
            .insert(
                request_id,
                comment_id,
                actor.id,
                kind,
                &stored.filename,
                &stored.stored_filename,
                &stored.file_type,
                stored.file_size,
            )
            .await?;

        self.audit
            .record(RecordAuditInput {
                actor_id: Some(actor.id),
                action: AuditAction::UploadFile,
                resource_type: AuditResourceType::Attachment,
                resource_id: Some(attachment.id.to_string()),
                details: Some(AuditDetails::FileUploaded {
                    request_id,
                    filename: attachment.filename.clone(),
                    file_size: attachment.file_size,
                    encrypted_archive: encrypt,
                }),
                context,
            })
            .await;

        Ok(attachment)
    }

    /// Remove an attachment. Only the uploader may do this; a missing file on
    /// disk does not block removal of the record.
    pub async fn delete(
        &self,
        actor: &Actor,
        attachment_id: Uuid,
        context: RequestContext,
    ) -> Result<(), EngineError> {
        let attachment = self
            .attachments
            .find_by_id(attachment_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Attachment"))?;

        policy::can_delete_attachment(actor, &attachment)?;

        let path = self.upload_dir.join(&attachment.stored_filename);
        if let Err(e) = tokio::fs::remove_file(&path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %path.display(), "Failed to unlink attachment file: {}", e);
            }
        }

        self.attachments.delete(attachment_id).await?;

        self.audit
            .record(RecordAuditInput {
                actor_id: Some(actor.id),
                action: AuditAction::DeleteFile,
                resource_type: AuditResourceType::Attachment,
                resource_id: Some(attachment_id.to_string()),
                details: Some(AuditDetails::FileDeleted {
                    request_id: attachment.request_id,
                    filename: attachment.filename.clone(),
                }),
                context,
            })
            .await;

        Ok(())
    }

    /// All attachments on a request, with uploader names.
    pub async fn list(&self, request_id: Uuid) -> Result<Vec<AttachmentListItem>, EngineError> {
        self.requests
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Request"))?;
        Ok(self.attachments.list_for_request(request_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domain::models::UserRole;
    use domain::services::MockArchiveTool;

    fn requester(username: &str) -> User {
        User {
            id: Uuid::new_v4(),
            external_username: username.to_string(),
            name: Some("Jane Doe".into()),
            department: Some("Radiology".into()),
            role: UserRole::User,
            password_hash: None,
            email: None,
            email_notifications_enabled: true,
            telegram_bot_token: None,
            telegram_chat_id: None,
            telegram_notifications_enabled: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn upload(filename: &str) -> UploadedFile {
        UploadedFile {
            filename: filename.to_string(),
            content_type: "application/pdf".into(),
            bytes: b"report payload".to_vec(),
        }
    }

    #[test]
    fn test_stored_name_with_extension() {
        let id = Uuid::new_v4();
        assert_eq!(stored_name(id, "xlsx"), format!("{}.xlsx", id));
    }

    #[test]
    fn test_stored_name_without_extension() {
        let id = Uuid::new_v4();
        assert_eq!(stored_name(id, ""), id.to_string());
    }

    #[tokio::test]
    async fn test_archive_password_is_requesters_username() {
        let dir = tempfile::tempdir().unwrap();
        let tool = MockArchiveTool::new();
        let owner = requester("somchai.p");
        let id = Uuid::new_v4();

        let stored = build_encrypted_archive(&tool, dir.path(), &owner, id, &upload("visits.pdf"))
            .await
            .unwrap();

        // The container is locked with the owner's directory username, never
        // the uploading admin's.
        assert_eq!(tool.used_passwords(), vec!["somchai.p".to_string()]);
        assert_eq!(stored.stored_filename, format!("{}.zip", id));
        assert_eq!(stored.filename, "visits.pdf.zip");
        assert_eq!(stored.file_type, "application/zip");
        assert!(stored.file_size > 0);
        assert!(dir.path().join(&stored.stored_filename).exists());
        // The staging directory is gone once the archive is in place.
        assert!(!dir.path().join(format!("tmp-{}", id)).exists());
    }

    #[tokio::test]
    async fn test_failed_compression_leaves_no_orphan_archive() {
        let dir = tempfile::tempdir().unwrap();
        let tool = MockArchiveTool::failing();
        let owner = requester("somchai.p");
        let id = Uuid::new_v4();

        let result =
            build_encrypted_archive(&tool, dir.path(), &owner, id, &upload("visits.pdf")).await;

        assert!(matches!(result, Err(EngineError::Internal(_))));
        assert!(!dir.path().join(format!("{}.zip", id)).exists());
        assert!(!dir.path().join(format!("tmp-{}", id)).exists());
    }
}
