use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use super::errors::JwtError;

/// Session token payload.
///
/// Carries the subject identity plus the registered time claims. All
/// timestamps are Unix seconds. The payload is never mutated after issuance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenPayload {
    /// Token identifier, random per issuance (UUID v4)
    #[serde(rename = "jti")]
    pub id: String,

    /// Subject e-mail
    pub email: String,

    /// Subject username
    pub username: String,

    /// Issued at
    #[serde(rename = "iat")]
    pub issued_at: i64,

    /// Not before
    #[serde(rename = "nbf")]
    pub not_before: i64,

    /// Expiration time
    #[serde(rename = "exp")]
    pub expires_at: i64,
}

impl TokenPayload {
    /// Create a payload valid from now until `now + ttl`.
    pub fn new(
        email: impl Into<String>,
        username: impl Into<String>,
        ttl: Duration,
    ) -> Result<Self, JwtError> {
        Self::issued_at(email, username, ttl, Utc::now())
    }

    /// Create a payload as if issued at `now`.
    ///
    /// # Arguments
    /// * `email` - Subject e-mail
    /// * `username` - Subject username
    /// * `ttl` - Lifetime; a negative value yields an already expired payload
    /// * `now` - Issuance instant
    ///
    /// # Errors
    /// * `SerializationFailed` - `now + ttl` is outside the representable time range
    pub fn issued_at(
        email: impl Into<String>,
        username: impl Into<String>,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<Self, JwtError> {
        let issued_at = now.timestamp();
        let expires_at = now.checked_add_signed(ttl).ok_or_else(|| {
            JwtError::SerializationFailed(format!("token lifetime out of range: {}", ttl))
        })?;

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            email: email.into(),
            username: username.into(),
            issued_at,
            not_before: issued_at,
            expires_at: expires_at.timestamp(),
        })
    }

    /// Check if token is expired. Expiry is inclusive: a token is still valid
    /// at exactly `expires_at`.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        current_timestamp > self.expires_at
    }

    /// Check if token is not valid yet.
    pub fn is_not_yet_valid(&self, current_timestamp: i64) -> bool {
        current_timestamp < self.not_before
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_new_payload() {
        let payload =
            TokenPayload::new("user@example.com", "username1", Duration::hours(72)).unwrap();

        assert_eq!(payload.email, "user@example.com");
        assert_eq!(payload.username, "username1");
        assert!(!payload.id.is_empty());
        assert_eq!(payload.issued_at, payload.not_before);
        assert_eq!(payload.expires_at - payload.issued_at, 72 * 60 * 60);
    }

    #[test]
    fn test_issued_at_fixed_clock() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let payload =
            TokenPayload::issued_at("a@example.com", "alice", Duration::minutes(1), now).unwrap();

        assert_eq!(payload.issued_at, 1_700_000_000);
        assert_eq!(payload.not_before, 1_700_000_000);
        assert_eq!(payload.expires_at, 1_700_000_060);
    }

    #[test]
    fn test_identifiers_are_unique() {
        let ids: HashSet<String> = (0..1000)
            .map(|_| TokenPayload::new("a@example.com", "alice", Duration::minutes(1)).unwrap().id)
            .collect();

        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_out_of_range_lifetime_is_an_error() {
        let result = TokenPayload::new("a@example.com", "alice", Duration::days(100_000_000));
        assert!(matches!(result, Err(JwtError::SerializationFailed(_))));

        let now = DateTime::from_timestamp(0, 0).unwrap();
        let result =
            TokenPayload::issued_at("a@example.com", "alice", Duration::days(-100_000_000), now);
        assert!(matches!(result, Err(JwtError::SerializationFailed(_))));
    }

    #[test]
    fn test_is_expired() {
        let now = DateTime::from_timestamp(1000, 0).unwrap();
        let payload =
            TokenPayload::issued_at("a@example.com", "alice", Duration::seconds(0), now).unwrap();

        assert!(!payload.is_expired(999));
        assert!(!payload.is_expired(1000)); // Exactly at expiration
        assert!(payload.is_expired(1001));
    }

    #[test]
    fn test_is_not_yet_valid() {
        let now = DateTime::from_timestamp(1000, 0).unwrap();
        let payload =
            TokenPayload::issued_at("a@example.com", "alice", Duration::seconds(10), now).unwrap();

        assert!(payload.is_not_yet_valid(999));
        assert!(!payload.is_not_yet_valid(1000));
    }

    #[test]
    fn test_serialized_claim_names() {
        let payload = TokenPayload::new("a@example.com", "alice", Duration::minutes(1)).unwrap();
        let value = serde_json::to_value(&payload).unwrap();

        for claim in ["jti", "email", "username", "iat", "nbf", "exp"] {
            assert!(value.get(claim).is_some(), "missing claim {claim}");
        }
    }
}
