use axum::http::StatusCode;
use axum::Extension;

use super::ApiSuccess;
use super::IdentityResponseData;
use crate::inbound::http::middleware::AuthenticatedUser;

/// Identity of the session holder. Answered from the token alone.
pub async fn get_user(
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiSuccess<IdentityResponseData> {
    ApiSuccess::new(
        StatusCode::OK,
        IdentityResponseData {
            email: user.email,
            username: user.username,
        },
    )
}
