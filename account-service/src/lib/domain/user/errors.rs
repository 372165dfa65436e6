use thiserror::Error;

/// Error for Username validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UsernameError {
    #[error("Username too short: minimum {min} characters, got {actual}")]
    TooShort { min: usize, actual: usize },

    #[error("Username too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },

    #[error("Username must contain only letters and digits")]
    NotAlphanumeric,

    #[error(
        "Username contains invalid characters (only alphanumeric, underscore, and hyphen allowed)"
    )]
    InvalidCharacters,
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),

    #[error("Email too short: minimum {min} characters, got {actual}")]
    TooShort { min: usize, actual: usize },
}

/// Error for password policy failures at registration
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordPolicyError {
    #[error("Password too short: minimum {min} characters, got {actual}")]
    TooShort { min: usize, actual: usize },
}

/// Top-level error for all user-related operations
#[derive(Debug, Clone, Error)]
pub enum UserError {
    #[error("Invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Invalid password: {0}")]
    InvalidPasswordPolicy(#[from] PasswordPolicyError),

    // Credential errors. Both surface as the same message to clients.
    #[error("No user matches identifier: {0}")]
    UserNotFound(String),

    #[error("Password verification failed for user: {0}")]
    InvalidPassword(String),

    #[error("No profile for username: {0}")]
    ProfileNotFound(String),

    // Uniqueness violations reported by the store
    #[error("Email already exists: {0}")]
    EmailAlreadyExists(String),

    #[error("Username already exists: {0}")]
    UsernameAlreadyExists(String),

    // Infrastructure errors
    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
