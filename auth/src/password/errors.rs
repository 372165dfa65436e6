use thiserror::Error;

/// Error type for password operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Password must not be empty")]
    EmptyPassword,

    #[error("Password does not match stored hash")]
    Mismatch,

    #[error("Stored password hash is malformed: {0}")]
    MalformedHash(String),

    #[error("Password hashing failed: {0}")]
    HashingFailed(String),
}
