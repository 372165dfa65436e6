use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;

use crate::domain::oauth::errors::OAuthError;
use crate::domain::user::models::Identity;
use crate::user::errors::UserError;

pub mod authorize_user;
pub mod change_password;
pub mod create_user;
pub mod delete_user;
pub mod get_profile;
pub mod get_user;
pub mod logout_user;
pub mod oauth;

const INTERNAL_ERROR: &str = "internal error";
const INVALID_CREDENTIALS: &str = "invalid credentials";

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<T>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(data))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

/// Client-facing failure. Messages are fixed per category; detail stays in the logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    BadRequest(String),
    Unauthorized(String),
    NotFound(String),
}

impl ApiError {
    pub fn internal() -> Self {
        ApiError::InternalServerError(INTERNAL_ERROR.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };

        (status, Json(ApiErrorBody { error: message })).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection, "Rejected request body");
        ApiError::BadRequest("invalid request data".to_string())
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::InvalidUsername(_)
            | UserError::InvalidEmail(_)
            | UserError::InvalidPasswordPolicy(_) => ApiError::BadRequest(err.to_string()),
            UserError::EmailAlreadyExists(_) => {
                ApiError::BadRequest("email already exists".to_string())
            }
            UserError::UsernameAlreadyExists(_) => {
                ApiError::BadRequest("username already exists".to_string())
            }
            UserError::UserNotFound(_) | UserError::InvalidPassword(_) => {
                tracing::warn!(error = %err, "Credential check rejected");
                ApiError::Unauthorized(INVALID_CREDENTIALS.to_string())
            }
            UserError::ProfileNotFound(_) => ApiError::NotFound("user not found".to_string()),
            UserError::Hashing(_) | UserError::DatabaseError(_) => {
                tracing::error!(error = %err, "User operation failed");
                ApiError::internal()
            }
        }
    }
}

impl From<OAuthError> for ApiError {
    fn from(err: OAuthError) -> Self {
        match err {
            OAuthError::UnknownProvider(_) => ApiError::BadRequest("unknown provider".to_string()),
            OAuthError::StateMismatch => {
                tracing::warn!(error = %err, "OAuth callback rejected");
                ApiError::BadRequest("invalid oauth state".to_string())
            }
            OAuthError::Store(user_error) => ApiError::from(user_error),
            OAuthError::ProviderExchange(_)
            | OAuthError::InvalidIdentity(_)
            | OAuthError::Provisioning(_) => {
                tracing::error!(error = %err, "Third-party login failed");
                ApiError::internal()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorBody {
    pub error: String,
}

/// Identity returned by every account endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityResponseData {
    pub email: String,
    pub username: String,
}

impl From<Identity> for IdentityResponseData {
    fn from(identity: Identity) -> Self {
        Self {
            email: identity.email,
            username: identity.username,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniqueness_maps_to_bad_request() {
        assert_eq!(
            ApiError::from(UserError::EmailAlreadyExists("a@b.co".to_string())),
            ApiError::BadRequest("email already exists".to_string())
        );
        assert_eq!(
            ApiError::from(UserError::UsernameAlreadyExists("alice".to_string())),
            ApiError::BadRequest("username already exists".to_string())
        );
    }

    #[test]
    fn test_credential_errors_share_one_message() {
        let not_found = ApiError::from(UserError::UserNotFound("alice".to_string()));
        let wrong_password = ApiError::from(UserError::InvalidPassword("alice".to_string()));

        assert_eq!(not_found, wrong_password);
        assert_eq!(
            not_found,
            ApiError::Unauthorized(INVALID_CREDENTIALS.to_string())
        );
    }

    #[test]
    fn test_unknown_profile_maps_to_not_found() {
        assert_eq!(
            ApiError::from(UserError::ProfileNotFound("ghost01".to_string())),
            ApiError::NotFound("user not found".to_string())
        );
    }

    #[test]
    fn test_infrastructure_detail_is_hidden() {
        let err = ApiError::from(UserError::DatabaseError(
            "connection refused at 10.0.0.3".to_string(),
        ));
        assert_eq!(err, ApiError::internal());

        let err = ApiError::from(OAuthError::Provisioning("duplicate key".to_string()));
        assert_eq!(err, ApiError::internal());
    }

    #[test]
    fn test_oauth_errors_mapping() {
        assert!(matches!(
            ApiError::from(OAuthError::UnknownProvider("myspace".to_string())),
            ApiError::BadRequest(_)
        ));
        assert!(matches!(
            ApiError::from(OAuthError::StateMismatch),
            ApiError::BadRequest(_)
        ));
        assert!(matches!(
            ApiError::from(OAuthError::Store(UserError::DatabaseError("x".to_string()))),
            ApiError::InternalServerError(_)
        ));
    }

    #[test]
    fn test_error_response_status() {
        let response = ApiError::Unauthorized("invalid token".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = ApiError::NotFound("user not found".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = ApiError::internal().into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
