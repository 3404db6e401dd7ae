//! Engine error taxonomy.

use domain::services::Denied;
use validator::{ValidationError, ValidationErrors};

/// Errors surfaced by engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Input failed field or cross-field validation. The payload names each
    /// offending field with its reason.
    #[error("Validation failed")]
    Validation(ValidationErrors),

    /// The actor is not allowed to perform the operation. The message is the
    /// specific user-facing reason.
    #[error("{0}")]
    Denied(String),

    /// The referenced resource does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// Infrastructure failure (database, filesystem, archiver).
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl EngineError {
    /// Validation error with a single offending field.
    pub fn field(field: &'static str, code: &'static str, message: &str) -> Self {
        let mut errors = ValidationErrors::new();
        let mut err = ValidationError::new(code);
        err.message = Some(message.to_string().into());
        errors.add(field, err);
        EngineError::Validation(errors)
    }

    pub fn not_found(resource: &str) -> Self {
        EngineError::NotFound(resource.to_string())
    }
}

impl From<Denied> for EngineError {
    fn from(denied: Denied) -> Self {
        EngineError::Denied(denied.reason)
    }
}

impl From<ValidationErrors> for EngineError {
    fn from(errors: ValidationErrors) -> Self {
        EngineError::Validation(errors)
    }
}

impl From<sqlx::Error> for EngineError {
    fn from(err: sqlx::Error) -> Self {
        EngineError::Internal(err.into())
    }
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::Internal(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_error_carries_field_name() {
        let err = EngineError::field("rejection_reason", "required", "Rejection reason is required");
        match err {
            EngineError::Validation(errors) => {
                assert!(errors.field_errors().contains_key("rejection_reason"));
            }
            other => panic!("Unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn test_denied_preserves_reason() {
        let err: EngineError = Denied {
            reason: "Only administrators may assign requests".into(),
        }
        .into();
        assert_eq!(err.to_string(), "Only administrators may assign requests");
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(EngineError::not_found("Request").to_string(), "Request not found");
    }
}
