use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::Url;
use serde::Deserialize;

use crate::config::OAuthClientConfig;
use crate::domain::oauth::errors::OAuthError;
use crate::domain::oauth::models::ExternalIdentity;
use crate::domain::oauth::ports::IdentityProvider;

/// Supported third-party identity providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Google,
    GitHub,
    GitLab,
}

/// Endpoint set of one provider.
#[derive(Debug, Clone)]
pub struct ProviderEndpoints {
    pub authorize: String,
    pub token: String,
    pub profile: String,
    /// Secondary e-mail listing, used when the profile hides the address
    pub emails: Option<String>,
    pub scope: String,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 3] = [
        ProviderKind::Google,
        ProviderKind::GitHub,
        ProviderKind::GitLab,
    ];

    /// Route name of the provider.
    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::Google => "google",
            ProviderKind::GitHub => "github",
            ProviderKind::GitLab => "gitlab",
        }
    }

    pub fn endpoints(&self) -> ProviderEndpoints {
        let (authorize, token, profile, emails, scope) = match self {
            ProviderKind::Google => (
                "https://accounts.google.com/o/oauth2/v2/auth",
                "https://oauth2.googleapis.com/token",
                "https://openidconnect.googleapis.com/v1/userinfo",
                None,
                "openid email profile",
            ),
            ProviderKind::GitHub => (
                "https://github.com/login/oauth/authorize",
                "https://github.com/login/oauth/access_token",
                "https://api.github.com/user",
                Some("https://api.github.com/user/emails"),
                "read:user user:email",
            ),
            ProviderKind::GitLab => (
                "https://gitlab.com/oauth/authorize",
                "https://gitlab.com/oauth/token",
                "https://gitlab.com/api/v4/user",
                None,
                "read_user",
            ),
        };

        ProviderEndpoints {
            authorize: authorize.to_string(),
            token: token.to_string(),
            profile: profile.to_string(),
            emails: emails.map(str::to_string),
            scope: scope.to_string(),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProviderKind {
    type Err = OAuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProviderKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| OAuthError::UnknownProvider(s.to_string()))
    }
}

/// Token endpoint body. GitHub reports failures here with a 200 status.
#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

impl TokenResponse {
    fn into_access_token(self) -> Result<String, OAuthError> {
        if let Some(error) = self.error {
            let detail = match self.error_description {
                Some(description) => format!("{}: {}", error, description),
                None => error,
            };
            return Err(OAuthError::ProviderExchange(format!("token response: {}", detail)));
        }

        self.access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                OAuthError::ProviderExchange("token response: no access token".to_string())
            })
    }
}

#[derive(Deserialize)]
struct Profile {
    email: Option<String>,
    email_verified: Option<bool>,
    login: Option<String>,
    username: Option<String>,
    name: Option<String>,
}

#[derive(Deserialize)]
struct ProfileEmail {
    email: String,
    primary: bool,
    verified: bool,
}

/// Authorization-code client for one provider.
pub struct HttpIdentityProvider {
    kind: ProviderKind,
    client_id: String,
    client_secret: String,
    redirect_url: String,
    endpoints: ProviderEndpoints,
    http: Client,
}

impl HttpIdentityProvider {
    /// Create a client using the provider's public endpoints.
    ///
    /// # Arguments
    /// * `kind` - Provider
    /// * `credentials` - Registered client id and secret
    /// * `server_url` - Public base URL of this service, used for the callback
    pub fn new(
        kind: ProviderKind,
        credentials: &OAuthClientConfig,
        server_url: &str,
    ) -> Result<Self, OAuthError> {
        let http = Client::builder()
            .user_agent(concat!("account-service/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| OAuthError::ProviderExchange(e.to_string()))?;

        Ok(Self {
            kind,
            client_id: credentials.client_id.clone(),
            client_secret: credentials.client_secret.clone(),
            redirect_url: callback_url(server_url, kind),
            endpoints: kind.endpoints(),
            http,
        })
    }

    /// Replace the endpoint set (self-hosted GitLab, test doubles).
    pub fn with_endpoints(mut self, endpoints: ProviderEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    async fn access_token(&self, code: &str) -> Result<String, OAuthError> {
        let response = self
            .http
            .post(&self.endpoints.token)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.redirect_url.as_str()),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| OAuthError::ProviderExchange(format!("token request: {}", e)))?;

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| OAuthError::ProviderExchange(format!("token response: {}", e)))?
            .into_access_token()
    }

    async fn fetch<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        access_token: &str,
    ) -> Result<T, OAuthError> {
        self.http
            .get(url)
            .bearer_auth(access_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| OAuthError::ProviderExchange(format!("{}: {}", url, e)))?
            .json::<T>()
            .await
            .map_err(|e| OAuthError::ProviderExchange(format!("{}: {}", url, e)))
    }

    async fn primary_email(&self, access_token: &str) -> Result<Option<String>, OAuthError> {
        let Some(url) = &self.endpoints.emails else {
            return Ok(None);
        };

        let emails: Vec<ProfileEmail> = self.fetch(url, access_token).await?;

        Ok(emails
            .into_iter()
            .find(|entry| entry.primary && entry.verified)
            .map(|entry| entry.email))
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    fn authorization_url(&self, state: &str) -> String {
        let params = [
            ("response_type", "code"),
            ("client_id", self.client_id.as_str()),
            ("redirect_uri", self.redirect_url.as_str()),
            ("scope", self.endpoints.scope.as_str()),
            ("state", state),
        ];

        match Url::parse_with_params(&self.endpoints.authorize, &params) {
            Ok(url) => url.into(),
            Err(e) => {
                tracing::error!(provider = %self.kind, error = %e, "Invalid authorize endpoint");
                self.endpoints.authorize.clone()
            }
        }
    }

    async fn exchange(&self, code: &str) -> Result<ExternalIdentity, OAuthError> {
        let access_token = self.access_token(code).await?;
        let profile: Profile = self.fetch(&self.endpoints.profile, &access_token).await?;

        if profile.email_verified == Some(false) {
            return Err(OAuthError::ProviderExchange(
                "provider reports e-mail as unverified".to_string(),
            ));
        }

        let email = match profile.email.filter(|email| !email.is_empty()) {
            Some(email) => email,
            None => self.primary_email(&access_token).await?.ok_or_else(|| {
                OAuthError::ProviderExchange("provider returned no verified e-mail".to_string())
            })?,
        };

        let display_name = profile
            .login
            .or(profile.username)
            .or(profile.name)
            .unwrap_or_default();

        Ok(ExternalIdentity {
            email,
            display_name,
        })
    }
}

/// Callback route registered with the provider.
pub fn callback_url(server_url: &str, kind: ProviderKind) -> String {
    format!(
        "{}/api/user/oauth/{}/callback",
        server_url.trim_end_matches('/'),
        kind.name()
    )
}
