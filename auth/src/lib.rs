//! Authentication primitives
//!
//! Provides the credential and session-token building blocks of the account service:
//! - Password hashing (Argon2id)
//! - Signed session tokens (HS256) with expiry and not-before checks
//! - Authentication coordination
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash).is_ok());
//! ```
//!
//! ## Session Tokens
//! ```
//! use auth::JwtMaker;
//! use chrono::Duration;
//!
//! let maker = JwtMaker::new(b"secret_key_at_least_32_bytes_long!").unwrap();
//! let token = maker.issue("alice@example.com", "alice", Duration::hours(72)).unwrap();
//! let payload = maker.verify(&token).unwrap();
//! assert_eq!(payload.username, "alice");
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::Authenticator;
//! use chrono::Duration;
//!
//! let auth = Authenticator::new(b"secret_key_at_least_32_bytes_long!").unwrap();
//!
//! // Register: hash password
//! let hash = auth.hash_password("password123").unwrap();
//!
//! // Login: verify and issue token
//! auth.verify_password("password123", Some(&hash)).unwrap();
//! let token = auth.issue_token("alice@example.com", "alice", Duration::hours(72)).unwrap();
//!
//! // Validate token
//! let payload = auth.validate_token(&token).unwrap();
//! assert_eq!(payload.email, "alice@example.com");
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use jwt::JwtError;
pub use jwt::JwtMaker;
pub use jwt::TokenPayload;
pub use password::PasswordError;
pub use password::PasswordHasher;
