use async_trait::async_trait;

use crate::domain::oauth::errors::OAuthError;
use crate::domain::oauth::models::ExternalIdentity;
use crate::domain::user::models::Identity;

/// Port for the third-party login service.
#[async_trait]
pub trait OAuthServicePort: Send + Sync + 'static {
    /// Build the provider URL the browser is redirected to.
    ///
    /// # Arguments
    /// * `provider` - Provider name as it appears in the route (`google`, `github`, ...)
    /// * `state` - Opaque anti-forgery value echoed back on the callback
    ///
    /// # Errors
    /// * `UnknownProvider` - No provider registered under that name
    fn authorization_url(&self, provider: &str, state: &str) -> Result<String, OAuthError>;

    /// Finish a login from the provider callback.
    ///
    /// Looks up the local account by the verified e-mail and creates a
    /// password-less one when absent.
    ///
    /// # Errors
    /// * `UnknownProvider` - No provider registered under that name
    /// * `ProviderExchange` - Code exchange or profile fetch failed
    /// * `InvalidIdentity` - Provider e-mail is not a usable address
    /// * `Provisioning` - Local account could not be created
    /// * `Store` - User store failure during lookup
    async fn complete_login(&self, provider: &str, code: &str) -> Result<Identity, OAuthError>;
}

/// A third-party identity provider speaking the authorization-code flow.
#[async_trait]
pub trait IdentityProvider: Send + Sync + 'static {
    /// Provider authorization endpoint with client id, scopes and `state` applied.
    fn authorization_url(&self, state: &str) -> String;

    /// Exchange an authorization code for the provider's verified identity.
    ///
    /// # Errors
    /// * `ProviderExchange` - Provider rejected the code or returned no e-mail
    async fn exchange(&self, code: &str) -> Result<ExternalIdentity, OAuthError>;
}
