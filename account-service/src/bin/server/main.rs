use std::sync::Arc;

use account_service::config::Config;
use account_service::config::OAuthConfig;
use account_service::domain::oauth::service::OAuthService;
use account_service::domain::user::service::UserService;
use account_service::inbound::http::router::create_router;
use account_service::inbound::http::router::SessionSettings;
use account_service::outbound::oauth::HttpIdentityProvider;
use account_service::outbound::oauth::ProviderKind;
use account_service::outbound::repositories::PostgresUserRepository;
use auth::Authenticator;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "account_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "account-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        token_ttl_hours = config.jwt.expiration_hours,
        secure_cookie = config.session.secure_cookie,
        web_url = %config.oauth.web_url,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let authenticator = Arc::new(Authenticator::new(config.jwt.secret.as_bytes())?);
    let user_repository = Arc::new(PostgresUserRepository::new(pg_pool));

    let user_service = Arc::new(UserService::new(
        Arc::clone(&user_repository),
        Arc::clone(&authenticator),
    ));
    let oauth_service = Arc::new(register_providers(
        OAuthService::new(user_repository),
        &config.oauth,
    )?);

    let session = SessionSettings {
        token_ttl: config.jwt.token_ttl()?,
        secure_cookie: config.session.secure_cookie,
        web_url: config.oauth.web_url.clone(),
    };

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(user_service, oauth_service, authenticator, session);
    axum::serve(http_listener, http_application).await?;

    tracing::info!("Server exited");

    Ok(())
}

/// Register every provider that has client credentials configured.
fn register_providers(
    mut service: OAuthService<PostgresUserRepository>,
    config: &OAuthConfig,
) -> Result<OAuthService<PostgresUserRepository>, anyhow::Error> {
    for kind in ProviderKind::ALL {
        let credentials = match kind {
            ProviderKind::Google => config.google.as_ref(),
            ProviderKind::GitHub => config.github.as_ref(),
            ProviderKind::GitLab => config.gitlab.as_ref(),
        };

        let Some(credentials) = credentials else {
            tracing::debug!(provider = %kind, "Identity provider not configured");
            continue;
        };

        let provider = HttpIdentityProvider::new(kind, credentials, &config.server_url)?;
        service = service.with_provider(kind.name(), Arc::new(provider));
        tracing::info!(provider = %kind, "Identity provider registered");
    }

    Ok(service)
}
