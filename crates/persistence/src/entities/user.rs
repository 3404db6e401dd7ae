//! User entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{User, UserRole};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for user roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
pub enum UserRoleDb {
    Admin,
    User,
}

impl From<UserRoleDb> for UserRole {
    fn from(role: UserRoleDb) -> Self {
        match role {
            UserRoleDb::Admin => UserRole::Admin,
            UserRoleDb::User => UserRole::User,
        }
    }
}

impl From<UserRole> for UserRoleDb {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Admin => UserRoleDb::Admin,
            UserRole::User => UserRoleDb::User,
        }
    }
}

/// Database row mapping for the users table.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: Uuid,
    pub external_username: String,
    pub name: Option<String>,
    pub department: Option<String>,
    pub role: UserRoleDb,
    pub password_hash: Option<String>,
    pub email: Option<String>,
    pub email_notifications_enabled: bool,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub telegram_notifications_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserEntity> for User {
    fn from(entity: UserEntity) -> Self {
        User {
            id: entity.id,
            external_username: entity.external_username,
            name: entity.name,
            department: entity.department,
            role: entity.role.into(),
            password_hash: entity.password_hash,
            email: entity.email,
            email_notifications_enabled: entity.email_notifications_enabled,
            telegram_bot_token: entity.telegram_bot_token,
            telegram_chat_id: entity.telegram_chat_id,
            telegram_notifications_enabled: entity.telegram_notifications_enabled,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
