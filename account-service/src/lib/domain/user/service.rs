use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Identity;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::Password;
use crate::domain::user::models::PublicProfile;
use crate::domain::user::models::RegisterCommand;
use crate::domain::user::models::User;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service implementation for account registration and login.
///
/// Concrete implementation of UserServicePort with dependency injection.
pub struct UserService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `authenticator` - Shared password and token primitives
    pub fn new(repository: Arc<UR>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            repository,
            authenticator,
        }
    }
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository,
{
    async fn register(&self, command: RegisterCommand) -> Result<Identity, UserError> {
        let password_hash = self
            .authenticator
            .hash_password(command.password.expose())
            .map_err(|e| UserError::Hashing(e.to_string()))?;

        let user = self
            .repository
            .create(NewUser::new(
                command.email,
                command.username,
                Some(password_hash),
            ))
            .await?;

        tracing::info!(user_id = %user.id, username = %user.username, "User registered");

        Ok(Identity::from(&user))
    }

    async fn authenticate(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<Identity, UserError> {
        let user = self
            .repository
            .find_by_email_or_username(identifier)
            .await?
            .ok_or_else(|| UserError::UserNotFound(identifier.to_string()))?;

        self.check_password(&user, password)?;

        Ok(Identity::from(&user))
    }

    async fn change_password(
        &self,
        email: &str,
        current_password: Option<&str>,
        new_password: Password,
    ) -> Result<(), UserError> {
        let email = EmailAddress::new(email.to_string())?;
        let user = self
            .repository
            .find_by_email(&email)
            .await?
            .ok_or_else(|| UserError::UserNotFound(email.to_string()))?;

        if user.password_hash.is_some() {
            let current_password = current_password
                .ok_or_else(|| UserError::InvalidPassword(user.username.to_string()))?;
            self.check_password(&user, current_password)?;
        }

        let password_hash = self
            .authenticator
            .hash_password(new_password.expose())
            .map_err(|e| UserError::Hashing(e.to_string()))?;

        self.repository
            .update_password_hash(&email, &password_hash)
            .await?;

        tracing::info!(user_id = %user.id, username = %user.username, "Password changed");

        Ok(())
    }

    async fn delete_account(&self, email: &str) -> Result<(), UserError> {
        let email = EmailAddress::new(email.to_string())?;
        let user = self
            .repository
            .delete_by_email(&email)
            .await?
            .ok_or_else(|| UserError::UserNotFound(email.to_string()))?;

        tracing::info!(user_id = %user.id, username = %user.username, "Account deleted");

        Ok(())
    }

    async fn get_profile(&self, username: &str) -> Result<PublicProfile, UserError> {
        self.repository
            .find_by_username(username)
            .await?
            .map(|user| PublicProfile::from(&user))
            .ok_or_else(|| UserError::ProfileNotFound(username.to_string()))
    }
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    fn check_password(&self, user: &User, password: &str) -> Result<(), UserError> {
        self.authenticator
            .verify_password(password, user.password_hash.as_deref())
            .map_err(|e| {
                if let AuthenticationError::PasswordError(err) = &e {
                    tracing::error!(
                        user_id = %user.id,
                        error = %err,
                        "Stored password hash unusable"
                    );
                }
                UserError::InvalidPassword(user.username.to_string())
            })
    }
}
