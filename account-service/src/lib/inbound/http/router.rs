use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use axum::body::Body;
use axum::http::header;
use axum::http::HeaderValue;
use axum::http::Method;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::patch;
use axum::routing::post;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::AllowOrigin;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::authorize_user::authorize_user;
use super::handlers::change_password::change_password;
use super::handlers::create_user::create_user;
use super::handlers::delete_user::delete_user;
use super::handlers::get_profile::get_profile;
use super::handlers::get_user::get_user;
use super::handlers::logout_user::logout_user;
use super::handlers::oauth::begin_oauth;
use super::handlers::oauth::oauth_callback;
use super::middleware::session_gate;
use crate::domain::oauth::ports::OAuthServicePort;
use crate::domain::user::ports::UserServicePort;

/// Session cookie policy shared by every handler that opens a session.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub token_ttl: chrono::Duration,
    pub secure_cookie: bool,
    /// Web front end: the CORS origin and the landing page after third-party login
    pub web_url: String,
}

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserServicePort>,
    pub oauth_service: Arc<dyn OAuthServicePort>,
    pub authenticator: Arc<Authenticator>,
    pub session: SessionSettings,
}

pub fn create_router(
    user_service: Arc<dyn UserServicePort>,
    oauth_service: Arc<dyn OAuthServicePort>,
    authenticator: Arc<Authenticator>,
    session: SessionSettings,
) -> Router {
    let cors_layer = cors_layer(&session.web_url);

    let state = AppState {
        user_service,
        oauth_service,
        authenticator,
        session,
    };

    let public_routes = Router::new()
        .route("/api/user", post(create_user))
        .route("/api/user/authorize", post(authorize_user))
        .route("/api/user/logout", get(logout_user))
        .route("/api/user/profile/:username", get(get_profile))
        .route("/api/user/oauth/:provider", get(begin_oauth))
        .route("/api/user/oauth/:provider/callback", get(oauth_callback));

    let protected_routes = Router::new()
        .route("/api/user", get(get_user).delete(delete_user))
        .route("/api/user/password", patch(change_password))
        .route_layer(middleware::from_fn_with_state(state.clone(), session_gate));

    // Headers carry the session cookie and are kept out of the span.
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri().path(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                path = %request.uri().path(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(ServiceBuilder::new().layer(trace_layer).layer(cors_layer))
        .with_state(state)
}

fn cors_layer(web_url: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    match HeaderValue::from_str(web_url.trim_end_matches('/')) {
        Ok(origin) => cors.allow_origin(AllowOrigin::exact(origin)),
        Err(e) => {
            tracing::error!(
                web_url,
                error = %e,
                "Web URL is not a valid origin, cross-origin requests disabled"
            );
            cors
        }
    }
}
