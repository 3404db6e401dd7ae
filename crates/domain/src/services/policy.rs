//! Permission policy for the request lifecycle.
//!
//! Every role/ownership/status precondition lives here as a pure function so
//! the rules can be tested without a database. A violation carries the
//! specific, user-facing reason; callers surface it verbatim instead of a
//! generic failure message.

use crate::models::{Actor, Attachment, AttachmentKind, ReportRequest, RequestStatus};

/// A denied operation with its human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct Denied {
    pub reason: String,
}

fn deny(reason: &str) -> Denied {
    Denied {
        reason: reason.to_string(),
    }
}

/// Content mutation (update) is reserved for the owner while the request is
/// still pending.
pub fn can_update(actor: &Actor, request: &ReportRequest) -> Result<(), Denied> {
    if actor.id != request.requested_by {
        return Err(deny("Only the requester may edit this request"));
    }
    if request.status != RequestStatus::Pending {
        return Err(deny(
            "This request has already been actioned and can no longer be edited",
        ));
    }
    Ok(())
}

/// Cancellation is reserved for the owner while the request is still pending.
pub fn can_cancel(actor: &Actor, request: &ReportRequest) -> Result<(), Denied> {
    if actor.id != request.requested_by {
        return Err(deny("Only the requester may cancel this request"));
    }
    if request.status != RequestStatus::Pending {
        return Err(deny("Only pending requests can be cancelled"));
    }
    Ok(())
}

/// Deletion is reserved for the owner while the request is still pending.
pub fn can_delete(actor: &Actor, request: &ReportRequest) -> Result<(), Denied> {
    if actor.id != request.requested_by {
        return Err(deny("Only the requester may delete this request"));
    }
    if request.status != RequestStatus::Pending {
        return Err(deny("Only pending requests can be deleted"));
    }
    Ok(())
}

/// Status updates are admin-only, regardless of ownership. Backward
/// transitions out of terminal states are deliberately allowed here.
pub fn can_update_status(actor: &Actor) -> Result<(), Denied> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(deny("Only administrators may change request status"))
    }
}

/// Assignment is admin-only.
pub fn can_assign(actor: &Actor) -> Result<(), Denied> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(deny("Only administrators may assign requests"))
    }
}

/// Dashboard aggregates span every user's requests, so they are admin-only.
pub fn can_view_stats(actor: &Actor) -> Result<(), Denied> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(deny("Only administrators may view request statistics"))
    }
}

/// Upload gate. The requester may upload reference material while the request
/// is pending or in progress; an admin may deliver result files only once the
/// request is completed. Returns the kind the admitted file will be tagged
/// with.
pub fn can_upload(actor: &Actor, request: &ReportRequest) -> Result<AttachmentKind, Denied> {
    let is_owner = actor.id == request.requested_by;

    if is_owner
        && matches!(
            request.status,
            RequestStatus::Pending | RequestStatus::InProgress
        )
    {
        return Ok(AttachmentKind::Reference);
    }
    if actor.is_admin() && request.status == RequestStatus::Completed {
        return Ok(AttachmentKind::Result);
    }

    if actor.is_admin() {
        Err(deny(
            "Administrators may upload result files only after the request is completed",
        ))
    } else if is_owner {
        Err(deny(
            "Files can be uploaded only while the request is pending or in progress",
        ))
    } else {
        Err(deny(
            "Only the requester or an administrator may upload files to this request",
        ))
    }
}

/// Attachment deletion belongs solely to the uploader. Role grants no
/// override in either direction.
pub fn can_delete_attachment(actor: &Actor, attachment: &Attachment) -> Result<(), Denied> {
    if actor.id == attachment.uploader_id {
        Ok(())
    } else {
        Err(deny("Only the uploader may delete this file"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        DateRangeType, FileFormat, OutputType, Priority, SourceSystem, UserRole,
    };
    use chrono::Utc;
    use uuid::Uuid;

    fn request(owner: Uuid, status: RequestStatus) -> ReportRequest {
        ReportRequest {
            id: Uuid::new_v4(),
            title: "Monthly OPD visits".into(),
            description: None,
            output_type: OutputType::File,
            file_format: Some(FileFormat::Excel),
            date_range_type: DateRangeType::Specific,
            start_date: None,
            end_date: None,
            fiscal_year_start: None,
            fiscal_year_end: None,
            priority: Priority::Medium,
            expected_deadline: None,
            source_system: SourceSystem::Hosxp,
            data_source: None,
            additional_notes: None,
            requested_by: owner,
            assigned_to: None,
            status,
            rejection_reason: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn owner_actor(owner: Uuid) -> Actor {
        Actor::new(owner, UserRole::User)
    }

    fn admin_actor() -> Actor {
        Actor::new(Uuid::new_v4(), UserRole::Admin)
    }

    fn stranger_actor() -> Actor {
        Actor::new(Uuid::new_v4(), UserRole::User)
    }

    #[test]
    fn test_owner_can_update_pending() {
        let owner = Uuid::new_v4();
        let req = request(owner, RequestStatus::Pending);
        assert!(can_update(&owner_actor(owner), &req).is_ok());
    }

    #[test]
    fn test_update_denied_for_non_owner() {
        let req = request(Uuid::new_v4(), RequestStatus::Pending);
        let err = can_update(&stranger_actor(), &req).unwrap_err();
        assert!(err.reason.contains("requester"));
    }

    #[test]
    fn test_update_denied_for_admin_non_owner() {
        // Admin role grants no content mutation rights over someone else's request.
        let req = request(Uuid::new_v4(), RequestStatus::Pending);
        assert!(can_update(&admin_actor(), &req).is_err());
    }

    #[test]
    fn test_update_denied_once_actioned() {
        let owner = Uuid::new_v4();
        for status in [
            RequestStatus::InProgress,
            RequestStatus::Completed,
            RequestStatus::Rejected,
            RequestStatus::Cancelled,
        ] {
            let req = request(owner, status);
            assert!(can_update(&owner_actor(owner), &req).is_err());
        }
    }

    #[test]
    fn test_cancel_rules_match_update_rules() {
        let owner = Uuid::new_v4();
        let pending = request(owner, RequestStatus::Pending);
        assert!(can_cancel(&owner_actor(owner), &pending).is_ok());
        assert!(can_cancel(&stranger_actor(), &pending).is_err());
        let in_progress = request(owner, RequestStatus::InProgress);
        assert!(can_cancel(&owner_actor(owner), &in_progress).is_err());
    }

    #[test]
    fn test_delete_owner_pending_only() {
        let owner = Uuid::new_v4();
        assert!(can_delete(&owner_actor(owner), &request(owner, RequestStatus::Pending)).is_ok());
        assert!(can_delete(&owner_actor(owner), &request(owner, RequestStatus::Completed)).is_err());
        assert!(can_delete(&admin_actor(), &request(owner, RequestStatus::Pending)).is_err());
    }

    #[test]
    fn test_status_update_admin_only() {
        assert!(can_update_status(&admin_actor()).is_ok());
        // Even the owner cannot change status without the admin role.
        let owner = Uuid::new_v4();
        assert!(can_update_status(&owner_actor(owner)).is_err());
    }

    #[test]
    fn test_assign_admin_only() {
        assert!(can_assign(&admin_actor()).is_ok());
        assert!(can_assign(&stranger_actor()).is_err());
    }

    #[test]
    fn test_stats_admin_only() {
        assert!(can_view_stats(&admin_actor()).is_ok());
        let owner = Uuid::new_v4();
        assert!(can_view_stats(&owner_actor(owner)).is_err());
    }

    #[test]
    fn test_owner_upload_pending_and_in_progress() {
        let owner = Uuid::new_v4();
        for status in [RequestStatus::Pending, RequestStatus::InProgress] {
            let kind = can_upload(&owner_actor(owner), &request(owner, status)).unwrap();
            assert_eq!(kind, AttachmentKind::Reference);
        }
    }

    #[test]
    fn test_owner_upload_denied_when_completed() {
        let owner = Uuid::new_v4();
        let err = can_upload(&owner_actor(owner), &request(owner, RequestStatus::Completed))
            .unwrap_err();
        assert!(err.reason.contains("pending or in progress"));
    }

    #[test]
    fn test_admin_upload_completed_only() {
        let owner = Uuid::new_v4();
        let kind = can_upload(&admin_actor(), &request(owner, RequestStatus::Completed)).unwrap();
        assert_eq!(kind, AttachmentKind::Result);

        for status in [
            RequestStatus::Pending,
            RequestStatus::InProgress,
            RequestStatus::Rejected,
            RequestStatus::Cancelled,
        ] {
            let err = can_upload(&admin_actor(), &request(owner, status)).unwrap_err();
            assert!(err.reason.contains("completed"));
        }
    }

    #[test]
    fn test_stranger_upload_always_denied() {
        let owner = Uuid::new_v4();
        for status in [
            RequestStatus::Pending,
            RequestStatus::InProgress,
            RequestStatus::Completed,
            RequestStatus::Rejected,
            RequestStatus::Cancelled,
        ] {
            assert!(can_upload(&stranger_actor(), &request(owner, status)).is_err());
        }
    }

    #[test]
    fn test_admin_owner_uploads_reference_while_pending() {
        // An admin uploading to their own pending request acts as the requester.
        let admin = admin_actor();
        let req = request(admin.id, RequestStatus::Pending);
        let kind = can_upload(&admin, &req).unwrap();
        assert_eq!(kind, AttachmentKind::Reference);
    }

    #[test]
    fn test_attachment_delete_uploader_only() {
        let uploader = Uuid::new_v4();
        let attachment = Attachment {
            id: Uuid::new_v4(),
            request_id: Uuid::new_v4(),
            comment_id: None,
            uploader_id: uploader,
            kind: AttachmentKind::Reference,
            filename: "sample.pdf".into(),
            stored_filename: "abc.pdf".into(),
            file_type: "application/pdf".into(),
            file_size: 10,
            created_at: Utc::now(),
        };

        assert!(can_delete_attachment(&Actor::new(uploader, UserRole::User), &attachment).is_ok());
        // An admin cannot delete a requester's file.
        let err = can_delete_attachment(&admin_actor(), &attachment).unwrap_err();
        assert_eq!(err.reason, "Only the uploader may delete this file");
    }
}
