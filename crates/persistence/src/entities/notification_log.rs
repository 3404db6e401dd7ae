//! Notification log entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{DeliveryOutcome, NotificationKind, NotificationLogEntry};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for notification kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "notification_kind", rename_all = "snake_case")]
pub enum NotificationKindDb {
    StatusChange,
    NewComment,
    NewRequest,
}

impl From<NotificationKindDb> for NotificationKind {
    fn from(kind: NotificationKindDb) -> Self {
        match kind {
            NotificationKindDb::StatusChange => NotificationKind::StatusChange,
            NotificationKindDb::NewComment => NotificationKind::NewComment,
            NotificationKindDb::NewRequest => NotificationKind::NewRequest,
        }
    }
}

impl From<NotificationKind> for NotificationKindDb {
    fn from(kind: NotificationKind) -> Self {
        match kind {
            NotificationKind::StatusChange => NotificationKindDb::StatusChange,
            NotificationKind::NewComment => NotificationKindDb::NewComment,
            NotificationKind::NewRequest => NotificationKindDb::NewRequest,
        }
    }
}

/// Database enum for delivery outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "delivery_outcome", rename_all = "snake_case")]
pub enum DeliveryOutcomeDb {
    Sent,
    Failed,
}

impl From<DeliveryOutcomeDb> for DeliveryOutcome {
    fn from(outcome: DeliveryOutcomeDb) -> Self {
        match outcome {
            DeliveryOutcomeDb::Sent => DeliveryOutcome::Sent,
            DeliveryOutcomeDb::Failed => DeliveryOutcome::Failed,
        }
    }
}

impl From<DeliveryOutcome> for DeliveryOutcomeDb {
    fn from(outcome: DeliveryOutcome) -> Self {
        match outcome {
            DeliveryOutcome::Sent => DeliveryOutcomeDb::Sent,
            DeliveryOutcome::Failed => DeliveryOutcomeDb::Failed,
        }
    }
}

/// Database row mapping for the notification_logs table.
#[derive(Debug, Clone, FromRow)]
pub struct NotificationLogEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub request_id: Uuid,
    pub kind: NotificationKindDb,
    pub message: String,
    pub outcome: DeliveryOutcomeDb,
    pub sent_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<NotificationLogEntity> for NotificationLogEntry {
    fn from(entity: NotificationLogEntity) -> Self {
        NotificationLogEntry {
            id: entity.id,
            user_id: entity.user_id,
            request_id: entity.request_id,
            kind: entity.kind.into(),
            message: entity.message,
            outcome: entity.outcome.into(),
            sent_at: entity.sent_at,
            error_message: entity.error_message,
            created_at: entity.created_at,
        }
    }
}
