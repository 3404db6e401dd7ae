//! Employee directory collaborator.
//!
//! The directory is an external system that verifies credentials and supplies
//! profile fields. Passwords in the directory are stored as MD5 hex digests;
//! verification must use the same digest to stay compatible.

use std::collections::HashMap;

use crate::models::ExternalIdentity;

/// Verifies a username/password pair against the employee directory.
#[async_trait::async_trait]
pub trait DirectoryClient: Send + Sync {
    /// Returns the verified identity, or `None` when the user is unknown or
    /// the password does not match. Transport errors are reported as `None`
    /// by implementations after logging; authentication never aborts on a
    /// directory outage.
    async fn verify(&self, username: &str, password: &str) -> Option<ExternalIdentity>;
}

/// Directory entry for the in-memory implementation.
#[derive(Debug, Clone)]
pub struct DirectoryEntry {
    /// MD5 hex digest of the password, as the directory stores it.
    pub password_hash: String,
    pub identity: ExternalIdentity,
}

/// In-memory directory used in tests and bootstrap deployments.
#[derive(Debug, Default)]
pub struct StaticDirectory {
    entries: HashMap<String, DirectoryEntry>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user with a plaintext password (hashed on insert).
    pub fn with_user(mut self, password: &str, identity: ExternalIdentity) -> Self {
        self.entries.insert(
            identity.username.clone(),
            DirectoryEntry {
                password_hash: shared::crypto::md5_hex(password),
                identity,
            },
        );
        self
    }
}

#[async_trait::async_trait]
impl DirectoryClient for StaticDirectory {
    async fn verify(&self, username: &str, password: &str) -> Option<ExternalIdentity> {
        let entry = self.entries.get(username)?;
        if shared::crypto::verify_md5(password, &entry.password_hash) {
            Some(entry.identity.clone())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(username: &str) -> ExternalIdentity {
        ExternalIdentity {
            username: username.into(),
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            email: Some("jane@example.org".into()),
            department: Some("Informatics".into()),
            telegram_bot_token: None,
            telegram_chat_id: None,
        }
    }

    #[tokio::test]
    async fn test_verify_accepts_correct_password() {
        let directory = StaticDirectory::new().with_user("s3cret", identity("jdoe"));
        let resolved = directory.verify("jdoe", "s3cret").await.unwrap();
        assert_eq!(resolved.username, "jdoe");
        assert_eq!(resolved.department.as_deref(), Some("Informatics"));
    }

    #[tokio::test]
    async fn test_verify_rejects_wrong_password() {
        let directory = StaticDirectory::new().with_user("s3cret", identity("jdoe"));
        assert!(directory.verify("jdoe", "wrong").await.is_none());
    }

    #[tokio::test]
    async fn test_verify_rejects_unknown_user() {
        let directory = StaticDirectory::new();
        assert!(directory.verify("ghost", "anything").await.is_none());
    }
}
