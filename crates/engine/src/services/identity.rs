//! Identity resolution against the employee directory.
//!
//! Users authenticate with their directory credentials. A successful login
//! mirrors the directory profile into the local users table; the local row
//! carries everything the engine needs afterwards (role, notification
//! settings). Bootstrap accounts carry a local password hash and are checked
//! before the directory is consulted, so the system stays reachable when the
//! directory is down.

use std::sync::Arc;

use domain::models::{
    Actor, AuditAction, AuditDetails, AuditResourceType, RecordAuditInput, RequestContext, User,
    UserRole,
};
use domain::services::DirectoryClient;
use persistence::repositories::UserRepository;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::EngineError;
use crate::services::AuditRecorder;

/// Resolves credentials to local user accounts.
#[derive(Clone)]
pub struct IdentityResolver {
    users: UserRepository,
    directory: Arc<dyn DirectoryClient>,
    audit: AuditRecorder,
}

impl IdentityResolver {
    pub fn new(
        users: UserRepository,
        directory: Arc<dyn DirectoryClient>,
        audit: AuditRecorder,
    ) -> Self {
        Self {
            users,
            directory,
            audit,
        }
    }

    /// Verify credentials and return the local user. `None` means the
    /// credentials did not match anywhere; the caller cannot distinguish an
    /// unknown user from a wrong password.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
        context: RequestContext,
    ) -> Result<Option<User>, EngineError> {
        let local = self.users.find_by_username(username).await?;

        // Bootstrap accounts are checked locally first.
        if let Some(user) = &local {
            if let Some(hash) = &user.password_hash {
                if shared::crypto::verify_md5(password, hash) {
                    self.record_login(user, context);
                    return Ok(Some(user.clone()));
                }
                // A bootstrap account never falls through to the directory.
                return Ok(None);
            }
        }

        let Some(identity) = self.directory.verify(username, password).await else {
            return Ok(None);
        };

        let user = match local {
            Some(existing) => {
                // Refresh the mirrored profile; the role is left alone.
                self.users
                    .update_profile(existing.id, &identity)
                    .await?
                    .unwrap_or(existing)
            }
            None => {
                info!(username = %username, "First login, creating local user");
                self.users.insert(&identity, UserRole::User, None).await?
            }
        };

        self.record_login(&user, context);
        Ok(Some(user))
    }

    /// Change a user's role. Admin-only; the acting admin cannot demote
    /// themselves by accident through this path either, it is just recorded.
    pub async fn update_role(
        &self,
        actor: &Actor,
        user_id: Uuid,
        role: UserRole,
        context: RequestContext,
    ) -> Result<User, EngineError> {
        if !actor.is_admin() {
            return Err(EngineError::Denied(
                "Only administrators may change user roles".to_string(),
            ));
        }

        let updated = self
            .users
            .update_role(user_id, role)
            .await?
            .ok_or_else(|| EngineError::not_found("User"))?;

        self.audit
            .record(RecordAuditInput {
                actor_id: Some(actor.id),
                action: AuditAction::UpdateUserRole,
                resource_type: AuditResourceType::User,
                resource_id: Some(user_id.to_string()),
                details: Some(AuditDetails::RoleChanged {
                    new_role: role.to_string(),
                }),
                context,
            })
            .await;

        Ok(updated)
    }

    fn record_login(&self, user: &User, context: RequestContext) {
        if user.password_hash.is_some() {
            warn!(username = %user.external_username, "Bootstrap account login");
        }
        self.audit.record_async(RecordAuditInput {
            actor_id: Some(user.id),
            action: AuditAction::Login,
            resource_type: AuditResourceType::User,
            resource_id: Some(user.id.to_string()),
            details: Some(AuditDetails::Login {
                username: user.external_username.clone(),
            }),
            context,
        });
    }
}
