use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum_extra::extract::CookieJar;

use super::ApiError;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::cookies::expired;
use crate::inbound::http::cookies::SESSION_COOKIE;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

/// Delete the session holder's account and clear the session cookie.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode), ApiError> {
    state.user_service.delete_account(&user.email).await?;

    Ok((jar.remove(expired(SESSION_COOKIE)), StatusCode::NO_CONTENT))
}
