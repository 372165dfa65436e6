use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::IdentityResponseData;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::cookies::start_session;
use crate::inbound::http::router::AppState;

/// Log in with an email or username and open a session.
pub async fn authorize_user(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<AuthorizeUserRequest>, JsonRejection>,
) -> Result<(CookieJar, ApiSuccess<IdentityResponseData>), ApiError> {
    let Json(body) = payload?;
    body.validate()?;

    let identity = state
        .user_service
        .authenticate(body.email_or_username.trim(), &body.password)
        .await?;
    let jar = start_session(jar, &state.authenticator, &state.session, &identity)?;

    Ok((jar, ApiSuccess::new(StatusCode::OK, identity.into())))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizeUserRequest {
    email_or_username: String,
    password: String,
}

impl AuthorizeUserRequest {
    const MIN_FIELD_LENGTH: usize = 6;

    fn validate(&self) -> Result<(), ApiError> {
        let too_short = |value: &str| value.chars().count() < Self::MIN_FIELD_LENGTH;

        if too_short(self.email_or_username.trim()) || too_short(&self.password) {
            return Err(ApiError::BadRequest(format!(
                "emailOrUsername and password must be at least {} characters",
                Self::MIN_FIELD_LENGTH
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_uses_camel_case() {
        let body: AuthorizeUserRequest =
            serde_json::from_str(r#"{"emailOrUsername":"alice01","password":"secret1"}"#)
                .unwrap();

        assert_eq!(body.email_or_username, "alice01");
        assert!(body.validate().is_ok());
    }

    #[test]
    fn test_short_fields_rejected() {
        let body = AuthorizeUserRequest {
            email_or_username: "  alice  ".to_string(),
            password: "secret1".to_string(),
        };
        assert!(matches!(body.validate(), Err(ApiError::BadRequest(_))));

        let body = AuthorizeUserRequest {
            email_or_username: "alice01".to_string(),
            password: "12345".to_string(),
        };
        assert!(matches!(body.validate(), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_minimum_length_fields_accepted() {
        let body = AuthorizeUserRequest {
            email_or_username: "a@x.co".to_string(),
            password: "123456".to_string(),
        };
        assert!(body.validate().is_ok());
    }
}
