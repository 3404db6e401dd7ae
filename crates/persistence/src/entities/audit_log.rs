//! Audit log entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{AuditAction, AuditDetails, AuditEntry, AuditResourceType};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the audit_logs table.
///
/// Action and resource type are stored as text so the trail survives enum
/// additions; details land in a JSONB column.
#[derive(Debug, Clone, FromRow)]
pub struct AuditLogEntity {
    pub id: Uuid,
    pub actor_id: Option<Uuid>,
    pub action: String,
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub details: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<AuditLogEntity> for AuditEntry {
    type Error = String;

    fn try_from(entity: AuditLogEntity) -> Result<Self, Self::Error> {
        let action: AuditAction = entity.action.parse()?;
        let resource_type: AuditResourceType = entity.resource_type.parse()?;
        let details = match entity.details {
            Some(value) => Some(
                serde_json::from_value::<AuditDetails>(value)
                    .map_err(|e| format!("Malformed audit details: {}", e))?,
            ),
            None => None,
        };

        Ok(AuditEntry {
            id: entity.id,
            actor_id: entity.actor_id,
            action,
            resource_type,
            resource_id: entity.resource_id,
            details,
            ip_address: entity.ip_address,
            user_agent: entity.user_agent,
            created_at: entity.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_converts_to_domain_entry() {
        let entity = AuditLogEntity {
            id: Uuid::new_v4(),
            actor_id: Some(Uuid::new_v4()),
            action: "UPDATE_STATUS".into(),
            resource_type: "REQUEST".into(),
            resource_id: Some(Uuid::new_v4().to_string()),
            details: Some(serde_json::json!({
                "kind": "status_changed",
                "new_status": "completed"
            })),
            ip_address: Some("10.0.0.5".into()),
            user_agent: None,
            created_at: Utc::now(),
        };

        let entry = AuditEntry::try_from(entity).unwrap();
        assert_eq!(entry.action, AuditAction::UpdateStatus);
        assert_eq!(entry.resource_type, AuditResourceType::Request);
        assert!(matches!(
            entry.details,
            Some(AuditDetails::StatusChanged { .. })
        ));
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        let entity = AuditLogEntity {
            id: Uuid::new_v4(),
            actor_id: None,
            action: "NOT_AN_ACTION".into(),
            resource_type: "REQUEST".into(),
            resource_id: None,
            details: None,
            ip_address: None,
            user_agent: None,
            created_at: Utc::now(),
        };

        assert!(AuditEntry::try_from(entity).is_err());
    }
}
