use axum::http::StatusCode;
use axum_extra::extract::CookieJar;

use crate::inbound::http::cookies::expired;
use crate::inbound::http::cookies::SESSION_COOKIE;

/// Drop the session cookie. Tokens are stateless, so nothing is revoked server-side.
pub async fn logout_user(jar: CookieJar) -> (CookieJar, StatusCode) {
    (jar.remove(expired(SESSION_COOKIE)), StatusCode::NO_CONTENT)
}
