use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::oauth::errors::OAuthError;
use crate::domain::oauth::models::OAuthStage;
use crate::domain::oauth::ports::IdentityProvider;
use crate::domain::oauth::ports::OAuthServicePort;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Identity;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::Username;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;

/// Links third-party identities to local accounts.
pub struct OAuthService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    providers: HashMap<String, Arc<dyn IdentityProvider>>,
}

impl<UR> OAuthService<UR>
where
    UR: UserRepository,
{
    /// Create a service without providers.
    pub fn new(repository: Arc<UR>) -> Self {
        Self {
            repository,
            providers: HashMap::new(),
        }
    }

    /// Register a provider under its route name.
    pub fn with_provider(
        mut self,
        name: impl Into<String>,
        provider: Arc<dyn IdentityProvider>,
    ) -> Self {
        self.providers.insert(name.into(), provider);
        self
    }

    fn provider(&self, name: &str) -> Result<&Arc<dyn IdentityProvider>, OAuthError> {
        self.providers
            .get(name)
            .ok_or_else(|| OAuthError::UnknownProvider(name.to_string()))
    }

    async fn link(
        &self,
        provider: &Arc<dyn IdentityProvider>,
        code: &str,
    ) -> Result<Identity, OAuthError> {
        let external = provider.exchange(code).await?;

        let email = EmailAddress::new(external.email)
            .map_err(|e| OAuthError::InvalidIdentity(e.to_string()))?;

        if let Some(user) = self.repository.find_by_email(&email).await? {
            return Ok(Identity::from(&user));
        }

        let username = Username::derive(&external.display_name, &email);

        for candidate in [username.clone(), username.with_random_suffix()] {
            match self
                .repository
                .create(NewUser::new(email.clone(), candidate, None))
                .await
            {
                Ok(user) => {
                    tracing::info!(
                        user_id = %user.id,
                        username = %user.username,
                        "Provisioned account from identity provider"
                    );
                    return Ok(Identity::from(&user));
                }
                // Another request linked the same e-mail first.
                Err(UserError::EmailAlreadyExists(_)) => return self.refetch(&email).await,
                Err(UserError::UsernameAlreadyExists(taken)) => {
                    tracing::debug!(username = %taken, "Derived username taken, retrying");
                }
                Err(e) => return Err(OAuthError::Provisioning(e.to_string())),
            }
        }

        Err(OAuthError::Provisioning(format!(
            "no free username derived from {}",
            username
        )))
    }

    async fn refetch(&self, email: &EmailAddress) -> Result<Identity, OAuthError> {
        self.repository
            .find_by_email(email)
            .await?
            .map(|user| Identity::from(&user))
            .ok_or_else(|| {
                OAuthError::Provisioning(format!("account for {} vanished after conflict", email))
            })
    }
}

#[async_trait]
impl<UR> OAuthServicePort for OAuthService<UR>
where
    UR: UserRepository,
{
    fn authorization_url(&self, provider: &str, state: &str) -> Result<String, OAuthError> {
        let url = self.provider(provider)?.authorization_url(state);
        tracing::debug!(
            provider,
            stage = %OAuthStage::AwaitingProviderCallback,
            "Redirecting to identity provider"
        );
        Ok(url)
    }

    async fn complete_login(&self, provider: &str, code: &str) -> Result<Identity, OAuthError> {
        let identity_provider = self.provider(provider)?;

        tracing::debug!(provider, stage = %OAuthStage::Exchanging, "Exchanging authorization code");
        let result = self.link(identity_provider, code).await;

        match &result {
            Ok(identity) => tracing::info!(
                provider,
                stage = %OAuthStage::Linked,
                username = %identity.username,
                "Third-party login linked"
            ),
            Err(e) => tracing::warn!(
                provider,
                stage = %OAuthStage::Failed,
                error = %e,
                "Third-party login failed"
            ),
        }

        result
    }
}
