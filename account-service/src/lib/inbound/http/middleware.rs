use axum::extract::Request;
use axum::extract::State;
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::CookieJar;

use super::cookies::SESSION_COOKIE;
use super::handlers::ApiError;
use crate::inbound::http::router::AppState;

const INVALID_TOKEN: &str = "invalid token";

/// Session holder, stored in request extensions by the session gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub token_id: String,
    pub email: String,
    pub username: String,
}

impl From<auth::TokenPayload> for AuthenticatedUser {
    fn from(payload: auth::TokenPayload) -> Self {
        Self {
            token_id: payload.id,
            email: payload.email,
            username: payload.username,
        }
    }
}

/// Middleware that validates the session cookie and adds the holder to request extensions
pub async fn session_gate(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = jar.get(SESSION_COOKIE).map(|c| c.value()).ok_or_else(|| {
        tracing::debug!("Session cookie missing");
        ApiError::Unauthorized(INVALID_TOKEN.to_string())
    })?;

    let payload = state.authenticator.validate_token(token).map_err(|e| {
        tracing::warn!(error = %e, "Session token rejected");
        ApiError::Unauthorized(INVALID_TOKEN.to_string())
    })?;

    tracing::debug!(
        token_id = %payload.id,
        username = %payload.username,
        "Session authenticated"
    );

    req.extensions_mut().insert(AuthenticatedUser::from(payload));

    Ok(next.run(req).await)
}
