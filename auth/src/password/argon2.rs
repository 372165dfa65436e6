use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::Error as HashError;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as Argon2PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Argon2;

use super::errors::PasswordError;

/// Password hashing implementation.
///
/// Provides cryptographic password hashing (internally uses Argon2id with
/// the crate's fixed default cost parameters).
pub struct PasswordHasher;

impl PasswordHasher {
    /// Create a new password hasher instance.
    pub fn new() -> Self {
        Self
    }

    /// Hash a plaintext password.
    ///
    /// A fresh random salt is generated for every call, so hashing the same
    /// password twice yields two different strings.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to hash
    ///
    /// # Returns
    /// PHC string format hash (includes algorithm, parameters, salt, and digest)
    ///
    /// # Errors
    /// * `EmptyPassword` - Password is an empty string
    /// * `HashingFailed` - Password hashing operation failed
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        if password.is_empty() {
            return Err(PasswordError::EmptyPassword);
        }

        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Verify a password against a stored hash.
    ///
    /// Salt and cost are read back from the PHC string; the digest comparison
    /// is constant-time.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `hash` - Stored password hash in PHC string format
    ///
    /// # Errors
    /// * `Mismatch` - Password does not match the hash
    /// * `MalformedHash` - Stored hash cannot be parsed or uses unknown parameters
    pub fn verify(&self, password: &str, hash: &str) -> Result<(), PasswordError> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| PasswordError::MalformedHash(e.to_string()))?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(()),
            Err(HashError::Password) => Err(PasswordError::Mismatch),
            Err(e) => Err(PasswordError::MalformedHash(e.to_string())),
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = PasswordHasher::new();
        let password = "my_secure_password";

        let hash = hasher.hash(password).expect("Failed to hash password");

        assert!(hasher.verify(password, &hash).is_ok());
        assert_eq!(
            hasher.verify("wrong_password", &hash),
            Err(PasswordError::Mismatch)
        );
    }

    #[test]
    fn test_hash_is_salted() {
        let hasher = PasswordHasher::new();

        let first = hasher.hash("password_1234").unwrap();
        let second = hasher.hash("password_1234").unwrap();

        assert_ne!(first, second);
        assert!(first.starts_with("$argon2id$"));
        assert!(!first.contains("password_1234"));
    }

    #[test]
    fn test_hash_empty_password() {
        let hasher = PasswordHasher::new();
        assert_eq!(hasher.hash(""), Err(PasswordError::EmptyPassword));
    }

    #[test]
    fn test_verify_empty_password_against_hash() {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash("not_empty").unwrap();

        assert_eq!(hasher.verify("", &hash), Err(PasswordError::Mismatch));
    }

    #[test]
    fn test_verify_invalid_hash() {
        let hasher = PasswordHasher::new();
        let result = hasher.verify("password", "invalid_hash");
        assert!(matches!(result, Err(PasswordError::MalformedHash(_))));
    }
}
