use std::env;

use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub session: SessionConfig,
    pub oauth: OAuthConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_expiration_hours")]
    pub expiration_hours: i64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SessionConfig {
    /// Sets the `Secure` attribute on session cookies. Off for plain-http development.
    #[serde(default)]
    pub secure_cookie: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OAuthConfig {
    /// Public base URL of this service, used to build provider callback URLs
    pub server_url: String,
    /// Web front end that receives the browser after a completed login
    pub web_url: String,
    pub google: Option<OAuthClientConfig>,
    pub github: Option<OAuthClientConfig>,
    pub gitlab: Option<OAuthClientConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OAuthClientConfig {
    pub client_id: String,
    pub client_secret: String,
}

impl JwtConfig {
    const MAX_EXPIRATION_HOURS: i64 = 24 * 366;

    /// Session token lifetime.
    ///
    /// # Errors
    /// * `Message` - `expiration_hours` is not between 1 hour and one year
    pub fn token_ttl(&self) -> Result<chrono::Duration, ConfigError> {
        if !(1..=Self::MAX_EXPIRATION_HOURS).contains(&self.expiration_hours) {
            return Err(ConfigError::Message(format!(
                "jwt.expiration_hours must be between 1 and {}, got {}",
                Self::MAX_EXPIRATION_HOURS,
                self.expiration_hours
            )));
        }

        chrono::Duration::try_hours(self.expiration_hours).ok_or_else(|| {
            ConfigError::Message(format!(
                "jwt.expiration_hours out of range: {}",
                self.expiration_hours
            ))
        })
    }
}

fn default_max_connections() -> u32 {
    5
}

fn default_expiration_hours() -> i64 {
    72
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__SECRET, OAUTH__GITHUB__CLIENT_ID, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: JWT__SECRET=... overrides jwt.secret
            .add_source(Environment::default().separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that deserialize but cannot run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.jwt.token_ttl().map(|_| ())
    }
}
