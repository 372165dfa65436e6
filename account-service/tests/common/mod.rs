use std::sync::Arc;
use std::sync::Mutex;

use account_service::domain::oauth::errors::OAuthError;
use account_service::domain::oauth::models::ExternalIdentity;
use account_service::domain::oauth::ports::IdentityProvider;
use account_service::domain::oauth::service::OAuthService;
use account_service::domain::user::models::EmailAddress;
use account_service::domain::user::models::NewUser;
use account_service::domain::user::models::User;
use account_service::domain::user::models::UserId;
use account_service::domain::user::ports::UserRepository;
use account_service::domain::user::service::UserService;
use account_service::inbound::http::router::create_router;
use account_service::inbound::http::router::SessionSettings;
use account_service::user::errors::UserError;
use async_trait::async_trait;
use auth::Authenticator;

pub const JWT_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const WEB_URL: &str = "http://localhost:5173";
pub const PROVIDER_CODE: &str = "good-code";
pub const PROVIDER_EMAIL: &str = "octo@example.com";

/// Test application that spawns a real server over an in-memory store
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub repository: Arc<InMemoryUserRepository>,
    pub api_client: reqwest::Client,
    pub authenticator: Arc<Authenticator>,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let repository = Arc::new(InMemoryUserRepository::default());
        let authenticator =
            Arc::new(Authenticator::new(JWT_SECRET).expect("Failed to create authenticator"));

        let user_service = Arc::new(UserService::new(
            Arc::clone(&repository),
            Arc::clone(&authenticator),
        ));
        let oauth_service = Arc::new(
            OAuthService::new(Arc::clone(&repository))
                .with_provider("github", Arc::new(FakeIdentityProvider)),
        );

        let session = SessionSettings {
            token_ttl: chrono::Duration::hours(72),
            secure_cookie: false,
            web_url: WEB_URL.to_string(),
        };

        let router = create_router(
            user_service,
            oauth_service,
            Arc::clone(&authenticator),
            session,
        );

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            repository,
            api_client: reqwest::Client::builder()
                .cookie_store(true)
                .redirect(reqwest::redirect::Policy::none())
                .build()
                .expect("Failed to create reqwest client"),
            authenticator,
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make PATCH request
    pub fn patch(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.patch(format!("{}{}", self.address, path))
    }

    /// Helper to make DELETE request
    pub fn delete(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.delete(format!("{}{}", self.address, path))
    }

    /// GET with an explicit cookie header, bypassing the client's cookie store
    pub fn get_with_session(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        reqwest::Client::new()
            .get(format!("{}{}", self.address, path))
            .header(reqwest::header::COOKIE, format!("accessToken={}", token))
    }

    /// Register an account, leaving its session cookie in the client
    pub async fn register(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> reqwest::Response {
        self.post("/api/user")
            .json(&serde_json::json!({
                "email": email,
                "username": username,
                "password": password,
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }
}

/// User store that enforces the same uniqueness rules as the `users` table
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn count(&self) -> usize {
        self.users.lock().unwrap().len()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, UserError> {
        let mut users = self.users.lock().unwrap();

        if users.iter().any(|u| u.email == user.email) {
            return Err(UserError::EmailAlreadyExists(user.email.to_string()));
        }
        if users.iter().any(|u| u.username == user.username) {
            return Err(UserError::UsernameAlreadyExists(user.username.to_string()));
        }

        let created = User {
            id: UserId(users.iter().map(|u| u.id.0).max().unwrap_or(0) + 1),
            email: user.email,
            username: user.username,
            password_hash: user.password_hash,
            created_at: user.created_at,
            updated_at: user.updated_at,
        };
        users.push(created.clone());

        Ok(created)
    }

    async fn find_by_email_or_username(
        &self,
        identifier: &str,
    ) -> Result<Option<User>, UserError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email.as_str() == identifier || u.username.as_str() == identifier)
            .cloned())
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| &u.email == email)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, UserError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username.as_str() == username)
            .cloned())
    }

    async fn update_password_hash(
        &self,
        email: &EmailAddress,
        password_hash: &str,
    ) -> Result<(), UserError> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| &u.email == email)
            .ok_or_else(|| UserError::UserNotFound(email.to_string()))?;

        user.password_hash = Some(password_hash.to_string());
        user.updated_at = chrono::Utc::now();

        Ok(())
    }

    async fn delete_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError> {
        let mut users = self.users.lock().unwrap();
        let position = users.iter().position(|u| &u.email == email);

        Ok(position.map(|index| users.remove(index)))
    }
}

/// Provider that accepts a single authorization code
pub struct FakeIdentityProvider;

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    fn authorization_url(&self, state: &str) -> String {
        format!("https://provider.test/authorize?client_id=test&state={}", state)
    }

    async fn exchange(&self, code: &str) -> Result<ExternalIdentity, OAuthError> {
        if code != PROVIDER_CODE {
            return Err(OAuthError::ProviderExchange(
                "bad_verification_code".to_string(),
            ));
        }

        Ok(ExternalIdentity {
            email: PROVIDER_EMAIL.to_string(),
            display_name: "octocat".to_string(),
        })
    }
}
