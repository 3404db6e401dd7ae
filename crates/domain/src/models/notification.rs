//! Notification log domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kinds of events the dispatcher delivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    StatusChange,
    NewComment,
    NewRequest,
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationKind::StatusChange => write!(f, "status_change"),
            NotificationKind::NewComment => write!(f, "new_comment"),
            NotificationKind::NewRequest => write!(f, "new_request"),
        }
    }
}

impl std::str::FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "status_change" => Ok(NotificationKind::StatusChange),
            "new_comment" => Ok(NotificationKind::NewComment),
            "new_request" => Ok(NotificationKind::NewRequest),
            _ => Err(format!("Unknown notification kind: {}", s)),
        }
    }
}

/// Outcome of one delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryOutcome {
    Sent,
    Failed,
}

impl std::fmt::Display for DeliveryOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryOutcome::Sent => write!(f, "sent"),
            DeliveryOutcome::Failed => write!(f, "failed"),
        }
    }
}

/// Immutable record of one attempted delivery. The rendered body is stored so
/// delivery can be audited without re-deriving content.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct NotificationLogEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub request_id: Uuid,
    pub kind: NotificationKind,
    pub message: String,
    pub outcome: DeliveryOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_notification_kind_roundtrip() {
        for kind in [
            NotificationKind::StatusChange,
            NotificationKind::NewComment,
            NotificationKind::NewRequest,
        ] {
            assert_eq!(NotificationKind::from_str(&kind.to_string()).unwrap(), kind);
        }
    }

    #[test]
    fn test_delivery_outcome_display() {
        assert_eq!(DeliveryOutcome::Sent.to_string(), "sent");
        assert_eq!(DeliveryOutcome::Failed.to_string(), "failed");
    }
}
