//! Application error types.
//!
//! Every service operation surfaces failures as an [`AppError`]; nothing
//! is swallowed and the core performs no retries. Infrastructure errors
//! (sqlx, bcrypt) convert in via `From`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// A unique constraint rejected the write (duplicate id or email).
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    /// Malformed input: bad date range, out-of-range score,
    /// non-positive capacity, conflicting role profile, and so on.
    #[error("{0}")]
    Validation(String),

    /// Active enrollments for the section already equal `max_students`.
    #[error("class section is full")]
    CapacityExceeded,

    /// The student already holds an active enrollment in the section.
    #[error("student is already enrolled in this class section")]
    DuplicateEnrollment,

    /// Bad credentials. The message never distinguishes an unknown
    /// email from a wrong password.
    #[error("invalid email or password")]
    Authentication,

    /// At least one exam of the section has no recorded grade for the
    /// enrollment.
    #[error("one or more exams have no recorded grade")]
    IncompleteGrades,

    /// A referenced row does not exist.
    #[error("{0} not found")]
    NotFound(String),

    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl AppError {
    pub fn duplicate_key(what: impl Into<String>) -> Self {
        Self::DuplicateKey(what.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Whether this error is a duplicate-key rejection.
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, Self::DuplicateKey(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authentication_message_is_fixed() {
        assert_eq!(AppError::Authentication.to_string(), "invalid email or password");
    }

    #[test]
    fn test_not_found_display() {
        assert_eq!(AppError::not_found("user").to_string(), "user not found");
    }

    #[test]
    fn test_duplicate_key_display() {
        let err = AppError::duplicate_key("email admin@example.com");
        assert!(err.is_duplicate_key());
        assert_eq!(err.to_string(), "duplicate key: email admin@example.com");
    }
}
