//! Audit trail domain models.
//!
//! Every mutating engine operation appends exactly one entry (or one per item
//! for bulk operations) after its primary effect commits. Entries are never
//! updated or deleted by the application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::RequestStatus;

/// Actions recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Login,
    CreateRequest,
    UpdateRequest,
    CancelRequest,
    UpdateStatus,
    AssignRequest,
    DeleteRequest,
    AddComment,
    UploadFile,
    DeleteFile,
    UpdateUserRole,
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AuditAction::Login => "LOGIN",
            AuditAction::CreateRequest => "CREATE_REQUEST",
            AuditAction::UpdateRequest => "UPDATE_REQUEST",
            AuditAction::CancelRequest => "CANCEL_REQUEST",
            AuditAction::UpdateStatus => "UPDATE_STATUS",
            AuditAction::AssignRequest => "ASSIGN_REQUEST",
            AuditAction::DeleteRequest => "DELETE_REQUEST",
            AuditAction::AddComment => "ADD_COMMENT",
            AuditAction::UploadFile => "UPLOAD_FILE",
            AuditAction::DeleteFile => "DELETE_FILE",
            AuditAction::UpdateUserRole => "UPDATE_USER_ROLE",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for AuditAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOGIN" => Ok(AuditAction::Login),
            "CREATE_REQUEST" => Ok(AuditAction::CreateRequest),
            "UPDATE_REQUEST" => Ok(AuditAction::UpdateRequest),
            "CANCEL_REQUEST" => Ok(AuditAction::CancelRequest),
            "UPDATE_STATUS" => Ok(AuditAction::UpdateStatus),
            "ASSIGN_REQUEST" => Ok(AuditAction::AssignRequest),
            "DELETE_REQUEST" => Ok(AuditAction::DeleteRequest),
            "ADD_COMMENT" => Ok(AuditAction::AddComment),
            "UPLOAD_FILE" => Ok(AuditAction::UploadFile),
            "DELETE_FILE" => Ok(AuditAction::DeleteFile),
            "UPDATE_USER_ROLE" => Ok(AuditAction::UpdateUserRole),
            _ => Err(format!("Unknown audit action: {}", s)),
        }
    }
}

/// Resource types audited actions can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditResourceType {
    Request,
    Comment,
    Attachment,
    User,
}

impl std::fmt::Display for AuditResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AuditResourceType::Request => "REQUEST",
            AuditResourceType::Comment => "COMMENT",
            AuditResourceType::Attachment => "ATTACHMENT",
            AuditResourceType::User => "USER",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for AuditResourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "REQUEST" => Ok(AuditResourceType::Request),
            "COMMENT" => Ok(AuditResourceType::Comment),
            "ATTACHMENT" => Ok(AuditResourceType::Attachment),
            "USER" => Ok(AuditResourceType::User),
            _ => Err(format!("Unknown audit resource type: {}", s)),
        }
    }
}

/// Structured details payload, one variant per action kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditDetails {
    Login {
        username: String,
    },
    RequestCreated {
        title: String,
        priority: String,
        output_type: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        duplicated_from: Option<Uuid>,
    },
    RequestUpdated {
        updated_fields: Vec<String>,
    },
    RequestCancelled {
        previous_status: RequestStatus,
    },
    StatusChanged {
        new_status: RequestStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        rejection_reason: Option<String>,
        #[serde(default)]
        bulk: bool,
    },
    Assigned {
        #[serde(skip_serializing_if = "Option::is_none")]
        assigned_to: Option<Uuid>,
    },
    RequestDeleted {
        title: String,
    },
    CommentAdded {
        request_id: Uuid,
        content_length: usize,
    },
    FileUploaded {
        request_id: Uuid,
        filename: String,
        file_size: i64,
        encrypted_archive: bool,
    },
    FileDeleted {
        request_id: Uuid,
        filename: String,
    },
    RoleChanged {
        new_role: String,
    },
}

/// Network provenance of the action being audited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

/// Input for appending an audit entry.
#[derive(Debug, Clone)]
pub struct RecordAuditInput {
    /// Nullable for system-originated events.
    pub actor_id: Option<Uuid>,
    pub action: AuditAction,
    pub resource_type: AuditResourceType,
    pub resource_id: Option<String>,
    pub details: Option<AuditDetails>,
    pub context: RequestContext,
}

/// An immutable audit trail entry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct AuditEntry {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<Uuid>,
    pub action: AuditAction,
    pub resource_type: AuditResourceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<AuditDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_audit_action_display_roundtrip() {
        for action in [
            AuditAction::Login,
            AuditAction::CreateRequest,
            AuditAction::UpdateRequest,
            AuditAction::CancelRequest,
            AuditAction::UpdateStatus,
            AuditAction::AssignRequest,
            AuditAction::DeleteRequest,
            AuditAction::AddComment,
            AuditAction::UploadFile,
            AuditAction::DeleteFile,
            AuditAction::UpdateUserRole,
        ] {
            assert_eq!(AuditAction::from_str(&action.to_string()).unwrap(), action);
        }
    }

    #[test]
    fn test_resource_type_roundtrip() {
        for rt in [
            AuditResourceType::Request,
            AuditResourceType::Comment,
            AuditResourceType::Attachment,
            AuditResourceType::User,
        ] {
            assert_eq!(AuditResourceType::from_str(&rt.to_string()).unwrap(), rt);
        }
    }

    #[test]
    fn test_details_tagged_serialization() {
        let details = AuditDetails::StatusChanged {
            new_status: RequestStatus::Rejected,
            rejection_reason: Some("Data source unavailable".into()),
            bulk: false,
        };
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["kind"], "status_changed");
        assert_eq!(json["new_status"], "rejected");
        assert_eq!(json["rejection_reason"], "Data source unavailable");
    }

    #[test]
    fn test_details_deserialize_roundtrip() {
        let details = AuditDetails::FileUploaded {
            request_id: Uuid::new_v4(),
            filename: "result.xlsx.zip".into(),
            file_size: 2048,
            encrypted_archive: true,
        };
        let json = serde_json::to_string(&details).unwrap();
        let back: AuditDetails = serde_json::from_str(&json).unwrap();
        assert_eq!(back, details);
    }

    #[test]
    fn test_details_bulk_flag_defaults_false() {
        let json = r#"{"kind":"status_changed","new_status":"completed"}"#;
        let details: AuditDetails = serde_json::from_str(json).unwrap();
        match details {
            AuditDetails::StatusChanged { bulk, .. } => assert!(!bulk),
            other => panic!("Unexpected variant: {:?}", other),
        }
    }
}
