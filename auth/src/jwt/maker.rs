use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::Deserialize;

use super::claims::TokenPayload;
use super::errors::JwtError;

/// Minimum HMAC secret length in bytes.
pub const MIN_SECRET_LENGTH: usize = 32;

/// Signs and verifies session tokens.
///
/// Tokens are compact JWS strings signed with HS256. The secret is fixed for
/// the lifetime of the maker; the maker holds no other state, so one instance
/// can be shared across request handlers.
pub struct JwtMaker {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

#[derive(Deserialize)]
struct RawHeader {
    alg: String,
}

impl JwtMaker {
    /// Create a new token maker with a secret key.
    ///
    /// # Arguments
    /// * `secret` - HMAC secret, at least 32 bytes
    ///
    /// # Errors
    /// * `WeakSecret` - Secret is shorter than [`MIN_SECRET_LENGTH`]
    pub fn new(secret: &[u8]) -> Result<Self, JwtError> {
        if secret.len() < MIN_SECRET_LENGTH {
            return Err(JwtError::WeakSecret {
                min: MIN_SECRET_LENGTH,
                actual: secret.len(),
            });
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
        })
    }

    /// Issue a signed token for the given subject.
    ///
    /// # Arguments
    /// * `email` - Subject e-mail
    /// * `username` - Subject username
    /// * `ttl` - Token lifetime
    ///
    /// # Errors
    /// * `SerializationFailed` - Lifetime out of range, or payload could not be encoded or signed
    pub fn issue(&self, email: &str, username: &str, ttl: Duration) -> Result<String, JwtError> {
        self.sign(&TokenPayload::new(email, username, ttl)?)
    }

    /// Sign an already built payload.
    pub fn sign(&self, payload: &TokenPayload) -> Result<String, JwtError> {
        encode(&Header::new(self.algorithm), payload, &self.encoding_key)
            .map_err(|e| JwtError::SerializationFailed(e.to_string()))
    }

    /// Verify a token against the current clock.
    ///
    /// # Errors
    /// See [`JwtMaker::verify_at`].
    pub fn verify(&self, token: &str) -> Result<TokenPayload, JwtError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    /// Verify a token against an explicit clock (Unix seconds).
    ///
    /// The header algorithm is checked before anything else, so `alg: none`
    /// or a different HMAC/RSA algorithm is rejected even when the rest of the
    /// token is well formed. The signature comparison is constant-time. Time
    /// bounds are inclusive and no leeway is applied.
    ///
    /// # Errors
    /// * `Malformed` - Token structure, encoding or payload is invalid
    /// * `UnsupportedAlgorithm` - Header declares an algorithm other than HS256
    /// * `SignatureInvalid` - Signature does not match
    /// * `TokenExpired` - `now` is after `exp`
    /// * `TokenNotYetValid` - `now` is before `nbf`
    pub fn verify_at(&self, token: &str, now: i64) -> Result<TokenPayload, JwtError> {
        let declared = Self::declared_algorithm(token)?;
        match declared.parse::<Algorithm>() {
            Ok(algorithm) if algorithm == self.algorithm => {}
            _ => return Err(JwtError::UnsupportedAlgorithm(declared)),
        }

        let payload = decode::<TokenPayload>(token, &self.decoding_key, &self.validation())
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => JwtError::SignatureInvalid,
                ErrorKind::InvalidAlgorithm => JwtError::UnsupportedAlgorithm(declared.clone()),
                ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                ErrorKind::ImmatureSignature => JwtError::TokenNotYetValid,
                _ => JwtError::Malformed(e.to_string()),
            })?
            .claims;

        if payload.is_expired(now) {
            return Err(JwtError::TokenExpired);
        }
        if payload.is_not_yet_valid(now) {
            return Err(JwtError::TokenNotYetValid);
        }

        Ok(payload)
    }

    // Time claims are checked by `verify_at` against the caller's clock.
    fn validation(&self) -> Validation {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims = ["exp", "nbf"].iter().map(|c| c.to_string()).collect();
        validation
    }

    fn declared_algorithm(token: &str) -> Result<String, JwtError> {
        let encoded = token
            .split('.')
            .next()
            .filter(|segment| !segment.is_empty())
            .ok_or_else(|| JwtError::Malformed("missing header".to_string()))?;

        let bytes = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|e| JwtError::Malformed(format!("header encoding: {}", e)))?;

        serde_json::from_slice::<RawHeader>(&bytes)
            .map(|header| header.alg)
            .map_err(|e| JwtError::Malformed(format!("header: {}", e)))
    }
}
