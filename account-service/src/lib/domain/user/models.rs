use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::user::errors::EmailError;
use crate::user::errors::PasswordPolicyError;
use crate::user::errors::UsernameError;

/// User aggregate entity.
///
/// Represents a registered user. `password_hash` is absent for accounts that
/// were provisioned through a third-party identity provider.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: EmailAddress,
    pub username: Username,
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Shape of a user record before the store assigns an identifier.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: EmailAddress,
    pub username: Username,
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewUser {
    /// Build an insert record stamped with the current time.
    pub fn new(email: EmailAddress, username: Username, password_hash: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            email,
            username,
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Verified identity handed back to the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub email: String,
    pub username: String,
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.as_str().to_string(),
            username: user.username.as_str().to_string(),
        }
    }
}

/// Publicly visible part of an account. The e-mail is not included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicProfile {
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for PublicProfile {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.as_str().to_string(),
            created_at: user.created_at,
        }
    }
}

/// User unique identifier type, assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Username value type
///
/// Usernames chosen at registration are 6-32 ASCII letters or digits. Names
/// derived for third-party accounts follow a looser rule (3-32 characters,
/// `_` and `-` allowed), so stored rows are loaded with that rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Username(String);

impl Username {
    const MIN_LENGTH: usize = 6;
    const DERIVED_MIN_LENGTH: usize = 3;
    const MAX_LENGTH: usize = 32;

    /// Create a username chosen at registration.
    ///
    /// # Errors
    /// * `TooShort` - Username shorter than 6 characters
    /// * `TooLong` - Username longer than 32 characters
    /// * `NotAlphanumeric` - Contains anything but ASCII letters and digits
    pub fn new(username: String) -> Result<Self, UsernameError> {
        let username = Self::with_valid_length(username, Self::MIN_LENGTH)?;
        if !username.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(UsernameError::NotAlphanumeric);
        }
        Ok(Self(username))
    }

    /// Accept a username that is already stored or was derived from a provider profile.
    ///
    /// # Errors
    /// * `TooShort` - Username shorter than 3 characters
    /// * `TooLong` - Username longer than 32 characters
    /// * `InvalidCharacters` - Contains non-alphanumeric characters (except _ and -)
    pub fn existing(username: String) -> Result<Self, UsernameError> {
        let username = Self::with_valid_length(username, Self::DERIVED_MIN_LENGTH)?;
        let username = Self::with_valid_chars(username)?;
        Ok(Self(username))
    }

    /// Derive a username for an account created through an identity provider.
    ///
    /// Tries the provider display name, then the e-mail local part, and falls
    /// back to a generated `user-xxxxxxxx` name.
    pub fn derive(display_name: &str, email: &EmailAddress) -> Self {
        let local_part = email.as_str().split('@').next().unwrap_or_default();

        [display_name, local_part]
            .into_iter()
            .map(Self::sanitize)
            .find_map(|candidate| Self::existing(candidate).ok())
            .unwrap_or_else(|| Self(format!("user-{}", Self::random_suffix())))
    }

    /// Same username with a short random suffix, kept within the length limit.
    pub fn with_random_suffix(&self) -> Self {
        let base: String = self.0.chars().take(Self::MAX_LENGTH - 9).collect();
        Self(format!("{}-{}", base, Self::random_suffix()))
    }

    fn sanitize(raw: &str) -> String {
        raw.chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
            .take(Self::MAX_LENGTH)
            .collect()
    }

    fn random_suffix() -> String {
        Uuid::new_v4().simple().to_string()[..8].to_string()
    }

    fn with_valid_length(username: String, min: usize) -> Result<String, UsernameError> {
        let length = username.chars().count();
        if length < min {
            Err(UsernameError::TooShort {
                min,
                actual: length,
            })
        } else if length > Self::MAX_LENGTH {
            Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(username)
        }
    }

    fn with_valid_chars(username: String) -> Result<String, UsernameError> {
        if username
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
        {
            Ok(username)
        } else {
            Err(UsernameError::InvalidCharacters)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    const MIN_REGISTRATION_LENGTH: usize = 6;

    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    /// Validate an address typed at registration.
    ///
    /// # Errors
    /// * `TooShort` - Fewer than 6 characters
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn for_registration(email: String) -> Result<Self, EmailError> {
        let length = email.chars().count();
        if length < Self::MIN_REGISTRATION_LENGTH {
            return Err(EmailError::TooShort {
                min: Self::MIN_REGISTRATION_LENGTH,
                actual: length,
            });
        }
        Self::new(email)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Plaintext password accepted at registration.
///
/// Only enforces the length policy; the value is hashed by the service and
/// never stored or logged. `Debug` is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    const MIN_LENGTH: usize = 6;

    pub fn new(password: String) -> Result<Self, PasswordPolicyError> {
        let length = password.chars().count();
        if length < Self::MIN_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            });
        }
        Ok(Self(password))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Command to register a new user with domain types
#[derive(Debug)]
pub struct RegisterCommand {
    pub email: EmailAddress,
    pub username: Username,
    pub password: Password,
}

impl RegisterCommand {
    pub fn new(email: EmailAddress, username: Username, password: Password) -> Self {
        Self {
            email,
            username,
            password,
        }
    }
}
