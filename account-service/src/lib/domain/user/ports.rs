use async_trait::async_trait;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Identity;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::Password;
use crate::domain::user::models::PublicProfile;
use crate::domain::user::models::RegisterCommand;
use crate::domain::user::models::User;
use crate::user::errors::UserError;

/// Port for user domain service operations.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Register a new account with a password.
    ///
    /// Uniqueness is decided by the store's insert, not by a prior lookup.
    ///
    /// # Arguments
    /// * `command` - Validated command containing email, username, and password
    ///
    /// # Returns
    /// Identity of the persisted user
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `Hashing` - Password hashing failed
    /// * `DatabaseError` - Database operation failed
    async fn register(&self, command: RegisterCommand) -> Result<Identity, UserError>;

    /// Verify credentials.
    ///
    /// Does not issue a token; the caller owns the session lifetime policy.
    ///
    /// # Arguments
    /// * `identifier` - Stored email or stored username
    /// * `password` - Plaintext password
    ///
    /// # Errors
    /// * `UserNotFound` - No record matches the identifier
    /// * `InvalidPassword` - Password does not match, or the account has no password
    /// * `DatabaseError` - Database operation failed
    async fn authenticate(&self, identifier: &str, password: &str)
        -> Result<Identity, UserError>;

    /// Replace the password of the account owning `email`.
    ///
    /// Accounts that already have a password must present it; accounts
    /// created through an identity provider may set a first one.
    ///
    /// # Errors
    /// * `UserNotFound` - No account with that email
    /// * `InvalidPassword` - `current_password` missing or wrong
    /// * `Hashing` - Password hashing failed
    /// * `DatabaseError` - Database operation failed
    async fn change_password(
        &self,
        email: &str,
        current_password: Option<&str>,
        new_password: Password,
    ) -> Result<(), UserError>;

    /// Delete the account owning `email`.
    ///
    /// # Errors
    /// * `UserNotFound` - No account with that email
    /// * `DatabaseError` - Database operation failed
    async fn delete_account(&self, email: &str) -> Result<(), UserError>;

    /// Public view of an account, looked up by username.
    ///
    /// # Errors
    /// * `ProfileNotFound` - No account with that username
    /// * `DatabaseError` - Database operation failed
    async fn get_profile(&self, username: &str) -> Result<PublicProfile, UserError>;
}

/// Persistence operations for user aggregate.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist new user to storage.
    ///
    /// # Returns
    /// Created user entity with its store-assigned identifier
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email unique constraint fired
    /// * `UsernameAlreadyExists` - Username unique constraint fired
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, user: NewUser) -> Result<User, UserError>;

    /// Retrieve the user whose email or username equals `identifier`.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_email_or_username(&self, identifier: &str)
        -> Result<Option<User>, UserError>;

    /// Retrieve user by email address.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError>;

    /// Retrieve user by exact username.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, UserError>;

    /// Store a new password hash and bump `updated_at`.
    ///
    /// # Errors
    /// * `UserNotFound` - No row with that email
    /// * `DatabaseError` - Database operation failed
    async fn update_password_hash(
        &self,
        email: &EmailAddress,
        password_hash: &str,
    ) -> Result<(), UserError>;

    /// Remove the user and return the deleted record, if any.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn delete_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError>;
}
