//! Request lifecycle engine.
//!
//! Orchestrates every mutation of a report request: creation, content
//! updates, the status state machine, assignment, comments, duplication and
//! deletion. Permission checks live in the domain policy layer; this service
//! sequences repository writes, audit entries and notification dispatch.
//! Notifications and audit appends are best-effort and never fail the
//! primary mutation.

use std::path::PathBuf;
use std::sync::Arc;

use domain::models::{
    Actor, AuditAction, AuditDetails, AuditResourceType, Comment, RecordAuditInput,
    ReportRequest, RequestContext, RequestFields, RequestStatus,
};
use domain::services::policy;
use persistence::repositories::{
    AttachmentRepository, CommentRepository, ReportRequestRepository, RequestListFilter,
    RequestStats, UserRepository,
};
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::error::EngineError;
use crate::services::{AuditRecorder, NotificationDispatcher, ViewTracker};

/// Only brand-new submissions are announced to admins and the operations
/// channel. A duplicate leaves its audit entry and stays quiet.
fn announces_new_request(duplicated_from: Option<Uuid>) -> bool {
    duplicated_from.is_none()
}

/// A request together with the caller's unread comment count, for listings.
#[derive(Debug, Clone, Serialize)]
pub struct RequestWithUnread {
    #[serde(flatten)]
    pub request: ReportRequest,
    pub unread_comments: i64,
}

/// The lifecycle engine. Request-scoped and stateless; cloning shares the
/// underlying pool.
#[derive(Clone)]
pub struct LifecycleEngine {
    requests: ReportRequestRepository,
    comments: CommentRepository,
    attachments: AttachmentRepository,
    users: UserRepository,
    audit: AuditRecorder,
    dispatcher: Arc<NotificationDispatcher>,
    views: ViewTracker,
    upload_dir: PathBuf,
}

impl LifecycleEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        requests: ReportRequestRepository,
        comments: CommentRepository,
        attachments: AttachmentRepository,
        users: UserRepository,
        audit: AuditRecorder,
        dispatcher: Arc<NotificationDispatcher>,
        views: ViewTracker,
        upload_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            requests,
            comments,
            attachments,
            users,
            audit,
            dispatcher,
            views,
            upload_dir: upload_dir.into(),
        }
    }

    /// Create a new request owned by the actor. Starts pending, unassigned.
    pub async fn create(
        &self,
        actor: &Actor,
        fields: RequestFields,
        context: RequestContext,
    ) -> Result<ReportRequest, EngineError> {
        let fields = fields.validated()?;
        let request = self.requests.insert(&fields, actor.id).await?;
        self.record_creation(actor, &request, None, context).await;
        Ok(request)
    }

    /// Overwrite the content fields. Owner-only while pending.
    pub async fn update(
        &self,
        actor: &Actor,
        request_id: Uuid,
        fields: RequestFields,
        context: RequestContext,
    ) -> Result<ReportRequest, EngineError> {
        let existing = self.load(request_id).await?;
        policy::can_update(actor, &existing)?;
        let fields = fields.validated()?;
        let updated_fields: Vec<String> = fields
            .changed_fields(&existing)
            .into_iter()
            .map(String::from)
            .collect();

        let updated = self
            .requests
            .update_fields(request_id, &fields)
            .await?
            .ok_or_else(|| EngineError::not_found("Request"))?;

        self.audit
            .record(RecordAuditInput {
                actor_id: Some(actor.id),
                action: AuditAction::UpdateRequest,
                resource_type: AuditResourceType::Request,
                resource_id: Some(request_id.to_string()),
                details: Some(AuditDetails::RequestUpdated { updated_fields }),
                context,
            })
            .await;

        Ok(updated)
    }

    /// Cancel a pending request. Owner-only.
    pub async fn cancel(
        &self,
        actor: &Actor,
        request_id: Uuid,
        context: RequestContext,
    ) -> Result<ReportRequest, EngineError> {
        let existing = self.load(request_id).await?;
        policy::can_cancel(actor, &existing)?;

        let updated = self
            .requests
            .set_status(request_id, RequestStatus::Cancelled, None)
            .await?
            .ok_or_else(|| EngineError::not_found("Request"))?;

        self.audit
            .record(RecordAuditInput {
                actor_id: Some(actor.id),
                action: AuditAction::CancelRequest,
                resource_type: AuditResourceType::Request,
                resource_id: Some(request_id.to_string()),
                details: Some(AuditDetails::RequestCancelled {
                    previous_status: existing.status,
                }),
                context,
            })
            .await;

        Ok(updated)
    }

    /// Admin status transition. Rejection demands a reason before anything
    /// changes; the reason is cleared again on any other transition.
    pub async fn update_status(
        &self,
        actor: &Actor,
        request_id: Uuid,
        status: RequestStatus,
        rejection_reason: Option<String>,
        context: RequestContext,
    ) -> Result<ReportRequest, EngineError> {
        policy::can_update_status(actor)?;
        self.load(request_id).await?;
        let reason = Self::rejection_reason_for(status, rejection_reason)?;

        let updated = self
            .requests
            .set_status(request_id, status, reason.as_deref())
            .await?
            .ok_or_else(|| EngineError::not_found("Request"))?;

        self.audit
            .record(RecordAuditInput {
                actor_id: Some(actor.id),
                action: AuditAction::UpdateStatus,
                resource_type: AuditResourceType::Request,
                resource_id: Some(request_id.to_string()),
                details: Some(AuditDetails::StatusChanged {
                    new_status: status,
                    rejection_reason: reason,
                    bulk: false,
                }),
                context,
            })
            .await;

        let dispatcher = self.dispatcher.clone();
        let request = updated.clone();
        tokio::spawn(async move {
            dispatcher.notify_status_change(&request).await;
        });

        Ok(updated)
    }

    /// Admin bulk status transition. One audit entry per updated request,
    /// flagged as bulk; no per-item notifications.
    pub async fn bulk_update_status(
        &self,
        actor: &Actor,
        request_ids: &[Uuid],
        status: RequestStatus,
        rejection_reason: Option<String>,
        context: RequestContext,
    ) -> Result<Vec<ReportRequest>, EngineError> {
        policy::can_update_status(actor)?;
        let reason = Self::rejection_reason_for(status, rejection_reason)?;

        let updated = self
            .requests
            .set_status_bulk(request_ids, status, reason.as_deref())
            .await?;

        for request in &updated {
            self.audit
                .record(RecordAuditInput {
                    actor_id: Some(actor.id),
                    action: AuditAction::UpdateStatus,
                    resource_type: AuditResourceType::Request,
                    resource_id: Some(request.id.to_string()),
                    details: Some(AuditDetails::StatusChanged {
                        new_status: status,
                        rejection_reason: reason.clone(),
                        bulk: true,
                    }),
                    context: context.clone(),
                })
                .await;
        }

        Ok(updated)
    }

    /// Admin assignment. A null assignee unassigns.
    pub async fn assign(
        &self,
        actor: &Actor,
        request_id: Uuid,
        assigned_to: Option<Uuid>,
        context: RequestContext,
    ) -> Result<ReportRequest, EngineError> {
        policy::can_assign(actor)?;
        self.load(request_id).await?;

        if let Some(assignee) = assigned_to {
            self.users
                .find_by_id(assignee)
                .await?
                .ok_or_else(|| EngineError::not_found("Assignee"))?;
        }

        let updated = self
            .requests
            .assign(request_id, assigned_to)
            .await?
            .ok_or_else(|| EngineError::not_found("Request"))?;

        self.audit
            .record(RecordAuditInput {
                actor_id: Some(actor.id),
                action: AuditAction::AssignRequest,
                resource_type: AuditResourceType::Request,
                resource_id: Some(request_id.to_string()),
                details: Some(AuditDetails::Assigned { assigned_to }),
                context,
            })
            .await;

        Ok(updated)
    }

    /// Delete a pending request and everything hanging off it. Owner-only.
    /// File unlinks are best-effort; the row cascade is transactional.
    pub async fn delete(
        &self,
        actor: &Actor,
        request_id: Uuid,
        context: RequestContext,
    ) -> Result<(), EngineError> {
        let existing = self.load(request_id).await?;
        policy::can_delete(actor, &existing)?;

        let stored = self
            .attachments
            .stored_filenames_for_request(request_id)
            .await?;
        for name in &stored {
            let path = self.upload_dir.join(name);
            if let Err(e) = tokio::fs::remove_file(&path).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %path.display(), "Failed to unlink attachment file: {}", e);
                }
            }
        }

        let deleted = self.requests.delete_cascade(request_id).await?;
        if !deleted {
            return Err(EngineError::not_found("Request"));
        }

        self.audit
            .record(RecordAuditInput {
                actor_id: Some(actor.id),
                action: AuditAction::DeleteRequest,
                resource_type: AuditResourceType::Request,
                resource_id: Some(request_id.to_string()),
                details: Some(AuditDetails::RequestDeleted {
                    title: existing.title,
                }),
                context,
            })
            .await;

        Ok(())
    }

    /// Duplicate a request's content as a fresh pending request owned by the
    /// actor. Status, assignment and attachments are not carried over, and no
    /// new-request announcement goes out.
    pub async fn duplicate(
        &self,
        actor: &Actor,
        request_id: Uuid,
        context: RequestContext,
    ) -> Result<ReportRequest, EngineError> {
        let original = self.load(request_id).await?;
        let fields = RequestFields::copy_of(&original).validated()?;
        let request = self.requests.insert(&fields, actor.id).await?;
        self.record_creation(actor, &request, Some(original.id), context)
            .await;
        Ok(request)
    }

    /// Append a comment. Any authenticated user may comment; the owner is
    /// notified unless they wrote the comment themselves.
    pub async fn add_comment(
        &self,
        actor: &Actor,
        request_id: Uuid,
        content: &str,
        context: RequestContext,
    ) -> Result<Comment, EngineError> {
        let request = self.load(request_id).await?;

        let content = content.trim();
        if content.is_empty() {
            return Err(EngineError::field(
                "content",
                "required",
                "Comment content must not be empty",
            ));
        }

        let comment = self.comments.insert(request_id, actor.id, content).await?;

        self.audit
            .record(RecordAuditInput {
                actor_id: Some(actor.id),
                action: AuditAction::AddComment,
                resource_type: AuditResourceType::Comment,
                resource_id: Some(comment.id.to_string()),
                details: Some(AuditDetails::CommentAdded {
                    request_id,
                    content_length: content.chars().count(),
                }),
                context,
            })
            .await;

        if actor.id != request.requested_by {
            let author_name = self.display_name(actor.id).await;
            let dispatcher = self.dispatcher.clone();
            tokio::spawn(async move {
                dispatcher.notify_new_comment(&request, &author_name).await;
            });
        }

        Ok(comment)
    }

    /// Fetch one request.
    pub async fn get(&self, request_id: Uuid) -> Result<ReportRequest, EngineError> {
        self.load(request_id).await
    }

    /// All comments on a request, oldest first.
    pub async fn comments(&self, request_id: Uuid) -> Result<Vec<Comment>, EngineError> {
        self.load(request_id).await?;
        Ok(self.comments.list_for_request(request_id).await?)
    }

    /// List requests visible to the actor. Non-admins only ever see their
    /// own; admins see everything the filter matches. Each row carries the
    /// actor's unread comment count.
    pub async fn list(
        &self,
        actor: &Actor,
        mut filter: RequestListFilter,
    ) -> Result<(Vec<RequestWithUnread>, i64), EngineError> {
        if !actor.is_admin() {
            filter.requested_by = Some(actor.id);
        }

        let (requests, total) = self.requests.list(&filter).await?;

        let mut rows = Vec::with_capacity(requests.len());
        for request in requests {
            let unread_comments = self.views.unread_count(request.id, actor.id).await?;
            rows.push(RequestWithUnread {
                request,
                unread_comments,
            });
        }

        Ok((rows, total))
    }

    /// Aggregate counts for the dashboard. Admin-only.
    pub async fn stats(&self, actor: &Actor) -> Result<RequestStats, EngineError> {
        policy::can_view_stats(actor)?;
        Ok(self.requests.stats().await?)
    }

    async fn load(&self, request_id: Uuid) -> Result<ReportRequest, EngineError> {
        self.requests
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Request"))
    }

    /// Audit a freshly inserted request and, for brand-new submissions only,
    /// kick off the admin/ops announcement.
    async fn record_creation(
        &self,
        actor: &Actor,
        request: &ReportRequest,
        duplicated_from: Option<Uuid>,
        context: RequestContext,
    ) {
        self.audit
            .record(RecordAuditInput {
                actor_id: Some(actor.id),
                action: AuditAction::CreateRequest,
                resource_type: AuditResourceType::Request,
                resource_id: Some(request.id.to_string()),
                details: Some(AuditDetails::RequestCreated {
                    title: request.title.clone(),
                    priority: request.priority.to_string(),
                    output_type: request.output_type.to_string(),
                    duplicated_from,
                }),
                context,
            })
            .await;

        if announces_new_request(duplicated_from) {
            self.spawn_new_request_notification(request).await;
        }
    }

    /// Reason is mandatory for rejection and dropped for anything else.
    fn rejection_reason_for(
        status: RequestStatus,
        rejection_reason: Option<String>,
    ) -> Result<Option<String>, EngineError> {
        if status != RequestStatus::Rejected {
            return Ok(None);
        }
        match rejection_reason.map(|r| r.trim().to_string()) {
            Some(reason) if !reason.is_empty() => Ok(Some(reason)),
            _ => Err(EngineError::field(
                "rejection_reason",
                "required",
                "A rejection reason is required when rejecting a request",
            )),
        }
    }

    async fn display_name(&self, user_id: Uuid) -> String {
        match self.users.find_by_id(user_id).await {
            Ok(Some(user)) => user.name.unwrap_or(user.external_username),
            _ => "Unknown user".to_string(),
        }
    }

    async fn spawn_new_request_notification(&self, request: &ReportRequest) {
        let requester_name = self.display_name(request.requested_by).await;
        let dispatcher = self.dispatcher.clone();
        let request = request.clone();
        tokio::spawn(async move {
            dispatcher.notify_new_request(&request, &requester_name).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_new_submissions_are_announced() {
        assert!(announces_new_request(None));
        assert!(!announces_new_request(Some(Uuid::new_v4())));
    }

    #[test]
    fn test_rejection_requires_reason() {
        let err =
            LifecycleEngine::rejection_reason_for(RequestStatus::Rejected, None).unwrap_err();
        match err {
            EngineError::Validation(errors) => {
                assert!(errors.field_errors().contains_key("rejection_reason"));
            }
            other => panic!("Unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn test_blank_rejection_reason_rejected() {
        let result = LifecycleEngine::rejection_reason_for(
            RequestStatus::Rejected,
            Some("   ".into()),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_reason_trimmed_on_rejection() {
        let reason = LifecycleEngine::rejection_reason_for(
            RequestStatus::Rejected,
            Some("  Data source unavailable  ".into()),
        )
        .unwrap();
        assert_eq!(reason.as_deref(), Some("Data source unavailable"));
    }

    #[test]
    fn test_reason_dropped_for_other_statuses() {
        let reason = LifecycleEngine::rejection_reason_for(
            RequestStatus::Completed,
            Some("irrelevant".into()),
        )
        .unwrap();
        assert!(reason.is_none());
    }
}
