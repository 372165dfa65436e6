use thiserror::Error;

/// Error type for JWT operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JwtError {
    #[error("Secret key too short: minimum {min} bytes, got {actual}")]
    WeakSecret { min: usize, actual: usize },

    #[error("Failed to serialize token: {0}")]
    SerializationFailed(String),

    #[error("Token is malformed: {0}")]
    Malformed(String),

    #[error("Token signature is invalid")]
    SignatureInvalid,

    #[error("Token algorithm is not supported: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Token is expired")]
    TokenExpired,

    #[error("Token is not valid yet")]
    TokenNotYetValid,
}
