use thiserror::Error;

use crate::user::errors::UserError;

/// Errors of the third-party login flow
#[derive(Debug, Clone, Error)]
pub enum OAuthError {
    #[error("Unknown identity provider: {0}")]
    UnknownProvider(String),

    #[error("OAuth state does not match the issued state")]
    StateMismatch,

    #[error("Provider exchange failed: {0}")]
    ProviderExchange(String),

    #[error("Provider returned an unusable identity: {0}")]
    InvalidIdentity(String),

    #[error("Failed to provision local account: {0}")]
    Provisioning(String),

    #[error("User store error: {0}")]
    Store(#[from] UserError),
}
