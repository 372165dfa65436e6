use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use crate::domain::user::models::Password;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

/// HTTP request body for a password change (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    /// Absent for accounts created through a third-party provider
    #[serde(default)]
    current_password: Option<String>,
    new_password: String,
}

/// Replace the session holder's password. The current password is required when one is set.
pub async fn change_password(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(body) = payload?;
    let new_password = Password::new(body.new_password).map_err(UserError::from)?;

    state
        .user_service
        .change_password(&user.email, body.current_password.as_deref(), new_password)
        .await
        .map_err(ApiError::from)
        .map(|_| StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_uses_camel_case() {
        let request: ChangePasswordRequest = serde_json::from_value(serde_json::json!({
            "currentPassword": "password_1234",
            "newPassword": "new_password_1",
        }))
        .unwrap();

        assert_eq!(request.current_password.as_deref(), Some("password_1234"));
        assert_eq!(request.new_password, "new_password_1");
    }

    #[test]
    fn test_current_password_is_optional() {
        let request: ChangePasswordRequest = serde_json::from_value(serde_json::json!({
            "newPassword": "new_password_1",
        }))
        .unwrap();

        assert!(request.current_password.is_none());
    }
}
