//! User repository for database operations.

use domain::models::{ExternalIdentity, User, UserRole};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{UserEntity, UserRoleDb};
use crate::metrics::QueryTimer;

const USER_COLUMNS: &str = "id, external_username, name, department, role, password_hash, \
     email, email_notifications_enabled, telegram_bot_token, telegram_chat_id, \
     telegram_notifications_enabled, created_at, updated_at";

/// Repository for user database operations.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Creates a new UserRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_id");
        let entity = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(entity?.map(User::from))
    }

    /// Find a user by external username.
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_username");
        let entity = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {} FROM users WHERE external_username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(entity?.map(User::from))
    }

    /// Insert a user mirrored from a directory identity.
    pub async fn insert(
        &self,
        identity: &ExternalIdentity,
        role: UserRole,
        password_hash: Option<&str>,
    ) -> Result<User, sqlx::Error> {
        let timer = QueryTimer::new("insert_user");
        let entity = sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            INSERT INTO users (
                external_username, name, department, role, password_hash,
                email, telegram_bot_token, telegram_chat_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(&identity.username)
        .bind(identity.display_name())
        .bind(&identity.department)
        .bind(UserRoleDb::from(role))
        .bind(password_hash)
        .bind(&identity.email)
        .bind(&identity.telegram_bot_token)
        .bind(&identity.telegram_chat_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        entity.map(User::from)
    }

    /// Refresh the mirrored profile fields from the directory. The role is
    /// never touched here.
    pub async fn update_profile(
        &self,
        id: Uuid,
        identity: &ExternalIdentity,
    ) -> Result<Option<User>, sqlx::Error> {
        let timer = QueryTimer::new("update_user_profile");
        let entity = sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            UPDATE users
            SET name = $2, department = $3, email = $4,
                telegram_bot_token = $5, telegram_chat_id = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id)
        .bind(identity.display_name())
        .bind(&identity.department)
        .bind(&identity.email)
        .bind(&identity.telegram_bot_token)
        .bind(&identity.telegram_chat_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(entity?.map(User::from))
    }

    /// Change a user's role.
    pub async fn update_role(
        &self,
        id: Uuid,
        role: UserRole,
    ) -> Result<Option<User>, sqlx::Error> {
        let timer = QueryTimer::new("update_user_role");
        let entity = sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            UPDATE users
            SET role = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id)
        .bind(UserRoleDb::from(role))
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(entity?.map(User::from))
    }

    /// Update a user's email notification opt-in.
    pub async fn update_email_opt_in(
        &self,
        id: Uuid,
        enabled: bool,
    ) -> Result<Option<User>, sqlx::Error> {
        let timer = QueryTimer::new("update_user_email_opt_in");
        let entity = sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            UPDATE users
            SET email_notifications_enabled = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id)
        .bind(enabled)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(entity?.map(User::from))
    }

    /// Update a user's Telegram notification opt-in.
    pub async fn update_telegram_opt_in(
        &self,
        id: Uuid,
        enabled: bool,
    ) -> Result<Option<User>, sqlx::Error> {
        let timer = QueryTimer::new("update_user_telegram_opt_in");
        let entity = sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            UPDATE users
            SET telegram_notifications_enabled = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id)
        .bind(enabled)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(entity?.map(User::from))
    }

    /// List all admin users.
    pub async fn list_admins(&self) -> Result<Vec<User>, sqlx::Error> {
        let timer = QueryTimer::new("list_admin_users");
        let entities = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {} FROM users WHERE role = $1 ORDER BY external_username",
            USER_COLUMNS
        ))
        .bind(UserRoleDb::Admin)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        Ok(entities?.into_iter().map(User::from).collect())
    }
}
