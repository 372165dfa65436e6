use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::IdentityResponseData;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Password;
use crate::domain::user::models::RegisterCommand;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::cookies::start_session;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

/// Register a password account and open a session for it.
pub async fn create_user(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(CookieJar, ApiSuccess<IdentityResponseData>), ApiError> {
    let Json(body) = payload?;
    let command = body.try_into_command()?;

    let identity = state.user_service.register(command).await?;
    let jar = start_session(jar, &state.authenticator, &state.session, &identity)?;

    Ok((jar, ApiSuccess::new(StatusCode::CREATED, identity.into())))
}

/// HTTP request body for registration (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateUserRequest {
    email: String,
    username: String,
    password: String,
}

impl CreateUserRequest {
    fn try_into_command(self) -> Result<RegisterCommand, UserError> {
        let email = EmailAddress::for_registration(self.email)?;
        let username = Username::new(self.username)?;
        let password = Password::new(self.password)?;
        Ok(RegisterCommand::new(email, username, password))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(email: &str, username: &str, password: &str) -> CreateUserRequest {
        CreateUserRequest {
            email: email.to_string(),
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_try_into_command_valid() {
        let command = request("alice@example.com", "alice01", "secret1")
            .try_into_command()
            .unwrap();

        assert_eq!(command.email.as_str(), "alice@example.com");
        assert_eq!(command.username.as_str(), "alice01");
        assert_eq!(command.password.expose(), "secret1");
    }

    #[test]
    fn test_try_into_command_rejects_each_field() {
        assert!(matches!(
            request("not-an-email", "alice01", "secret1").try_into_command(),
            Err(UserError::InvalidEmail(_))
        ));
        assert!(matches!(
            request("a@x.c", "alice01", "secret1").try_into_command(),
            Err(UserError::InvalidEmail(_))
        ));
        assert!(matches!(
            request("alice@example.com", "ab1", "secret1").try_into_command(),
            Err(UserError::InvalidUsername(_))
        ));
        assert!(matches!(
            request("alice@example.com", "alice_01", "secret1").try_into_command(),
            Err(UserError::InvalidUsername(_))
        ));
        assert!(matches!(
            request("alice@example.com", "alice01", "123").try_into_command(),
            Err(UserError::InvalidPasswordPolicy(_))
        ));
    }
}
