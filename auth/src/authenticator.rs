use chrono::Duration;

use crate::jwt::JwtError;
use crate::jwt::JwtMaker;
use crate::jwt::TokenPayload;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password verification and session tokens.
///
/// Built once at startup from the configured secret and shared read-only by
/// every request handler.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    jwt_maker: JwtMaker,
}

/// Authentication operation errors.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for token signing (at least 32 bytes)
    ///
    /// # Errors
    /// * `JwtError(WeakSecret)` - Secret is too short
    pub fn new(jwt_secret: &[u8]) -> Result<Self, AuthenticationError> {
        Ok(Self {
            password_hasher: PasswordHasher::new(),
            jwt_maker: JwtMaker::new(jwt_secret)?,
        })
    }

    /// Hash a password for storage.
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify a password against an optional stored hash.
    ///
    /// Accounts created through a third-party provider have no hash; password
    /// login never succeeds for them.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Hash is absent or the password does not match
    /// * `PasswordError` - Stored hash is malformed
    pub fn verify_password(
        &self,
        password: &str,
        stored_hash: Option<&str>,
    ) -> Result<(), AuthenticationError> {
        let stored_hash = stored_hash.ok_or(AuthenticationError::InvalidCredentials)?;

        match self.password_hasher.verify(password, stored_hash) {
            Ok(()) => Ok(()),
            Err(PasswordError::Mismatch) => Err(AuthenticationError::InvalidCredentials),
            Err(e) => Err(AuthenticationError::PasswordError(e)),
        }
    }

    /// Issue a session token for a verified identity.
    pub fn issue_token(
        &self,
        email: &str,
        username: &str,
        ttl: Duration,
    ) -> Result<String, JwtError> {
        self.jwt_maker.issue(email, username, ttl)
    }

    /// Validate and decode a session token.
    pub fn validate_token(&self, token: &str) -> Result<TokenPayload, JwtError> {
        self.jwt_maker.verify(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    #[test]
    fn test_weak_secret() {
        let result = Authenticator::new(b"short");
        assert!(matches!(
            result,
            Err(AuthenticationError::JwtError(JwtError::WeakSecret { .. }))
        ));
    }

    #[test]
    fn test_verify_password_success() {
        let authenticator = Authenticator::new(SECRET).unwrap();

        let hash = authenticator
            .hash_password("my_password")
            .expect("Failed to hash password");

        assert!(authenticator
            .verify_password("my_password", Some(&hash))
            .is_ok());
    }

    #[test]
    fn test_verify_password_wrong_password() {
        let authenticator = Authenticator::new(SECRET).unwrap();
        let hash = authenticator.hash_password("my_password").unwrap();

        let result = authenticator.verify_password("wrong_password", Some(&hash));
        assert_eq!(result, Err(AuthenticationError::InvalidCredentials));
    }

    #[test]
    fn test_verify_password_without_hash() {
        let authenticator = Authenticator::new(SECRET).unwrap();

        let result = authenticator.verify_password("anything", None);
        assert_eq!(result, Err(AuthenticationError::InvalidCredentials));
    }

    #[test]
    fn test_verify_password_malformed_hash() {
        let authenticator = Authenticator::new(SECRET).unwrap();

        let result = authenticator.verify_password("anything", Some("not-a-phc-string"));
        assert!(matches!(
            result,
            Err(AuthenticationError::PasswordError(
                PasswordError::MalformedHash(_)
            ))
        ));
    }

    #[test]
    fn test_issue_and_validate_token() {
        let authenticator = Authenticator::new(SECRET).unwrap();

        let token = authenticator
            .issue_token("user@example.com", "username1", Duration::hours(72))
            .expect("Failed to issue token");

        let payload = authenticator
            .validate_token(&token)
            .expect("Failed to validate token");

        assert_eq!(payload.email, "user@example.com");
        assert_eq!(payload.username, "username1");
    }

    #[test]
    fn test_validate_invalid_token() {
        let authenticator = Authenticator::new(SECRET).unwrap();

        let result = authenticator.validate_token("invalid.token.here");
        assert!(result.is_err());
    }
}
