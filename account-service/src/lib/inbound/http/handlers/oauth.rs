use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::header;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Redirect;
use axum::response::Response;
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use uuid::Uuid;

use super::ApiError;
use crate::domain::oauth::errors::OAuthError;
use crate::domain::oauth::models::OAuthStage;
use crate::domain::oauth::ports::OAuthServicePort;
use crate::inbound::http::cookies::expired;
use crate::inbound::http::cookies::oauth_state_cookie;
use crate::inbound::http::cookies::start_session;
use crate::inbound::http::cookies::OAUTH_STATE_COOKIE;
use crate::inbound::http::router::AppState;

/// Send the browser to the provider's consent page.
pub async fn begin_oauth(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), ApiError> {
    tracing::debug!(
        provider = %provider,
        stage = %OAuthStage::AwaitingProviderRedirect,
        "Starting third-party login"
    );

    let csrf_state = Uuid::new_v4().simple().to_string();
    let url = state
        .oauth_service
        .authorization_url(&provider, &csrf_state)?;

    Ok((
        jar.add(oauth_state_cookie(csrf_state, &state.session)),
        Redirect::temporary(&url),
    ))
}

#[derive(Debug, Clone, Deserialize)]
pub struct OAuthCallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

/// Provider callback: check the anti-forgery state, link the account, open a session
/// and hand the browser back to the web front end.
pub async fn oauth_callback(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(query): Query<OAuthCallbackQuery>,
    jar: CookieJar,
) -> Result<Response, ApiError> {
    let issued_state = jar.get(OAUTH_STATE_COOKIE).map(|c| c.value().to_string());
    let jar = jar.remove(expired(OAUTH_STATE_COOKIE));

    match (issued_state, query.state.as_deref()) {
        (Some(issued), Some(returned)) if issued == returned => {}
        _ => return Err(OAuthError::StateMismatch.into()),
    }

    if let Some(reason) = query.error {
        let reason = format!("provider denied consent: {}", reason);
        return Err(OAuthError::ProviderExchange(reason).into());
    }

    let code = query
        .code
        .filter(|code| !code.is_empty())
        .ok_or_else(|| ApiError::BadRequest("missing authorization code".to_string()))?;

    let identity = state.oauth_service.complete_login(&provider, &code).await?;
    let jar = start_session(jar, &state.authenticator, &state.session, &identity)?;

    Ok((
        StatusCode::FOUND,
        jar,
        [(header::LOCATION, state.session.web_url.clone())],
    )
        .into_response())
}
