use auth::Authenticator;
use axum_extra::extract::cookie::Cookie;
use axum_extra::extract::cookie::SameSite;
use axum_extra::extract::CookieJar;

use super::handlers::ApiError;
use super::router::SessionSettings;
use crate::domain::user::models::Identity;

pub const SESSION_COOKIE: &str = "accessToken";
pub const OAUTH_STATE_COOKIE: &str = "oauthState";

const OAUTH_STATE_TTL_SECONDS: i64 = 10 * 60;

/// Sign a token for `identity` and attach it as the session cookie.
pub fn start_session(
    jar: CookieJar,
    authenticator: &Authenticator,
    settings: &SessionSettings,
    identity: &Identity,
) -> Result<CookieJar, ApiError> {
    let token = authenticator
        .issue_token(&identity.email, &identity.username, settings.token_ttl)
        .map_err(|e| {
            tracing::error!(
                error = %e,
                username = %identity.username,
                "Failed to issue session token"
            );
            ApiError::internal()
        })?;

    Ok(jar.add(session_cookie(token, settings)))
}

pub fn session_cookie(token: String, settings: &SessionSettings) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(settings.secure_cookie)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(settings.token_ttl.num_seconds()))
        .build()
}

pub fn oauth_state_cookie(state: String, settings: &SessionSettings) -> Cookie<'static> {
    Cookie::build((OAUTH_STATE_COOKIE, state))
        .path("/")
        .http_only(true)
        .secure(settings.secure_cookie)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(OAUTH_STATE_TTL_SECONDS))
        .build()
}

/// Removal cookie; the path must match the one the cookie was set with.
pub fn expired(name: &'static str) -> Cookie<'static> {
    Cookie::build(name).path("/").build()
}
