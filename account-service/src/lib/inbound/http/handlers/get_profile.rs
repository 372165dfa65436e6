use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::PublicProfile;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::router::AppState;

/// Public view of an account. Never carries the e-mail address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponseData {
    pub username: String,
    pub created_at: String,
}

impl From<PublicProfile> for ProfileResponseData {
    fn from(profile: PublicProfile) -> Self {
        Self {
            username: profile.username,
            created_at: profile.created_at.to_rfc3339(),
        }
    }
}

pub async fn get_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<ApiSuccess<ProfileResponseData>, ApiError> {
    state
        .user_service
        .get_profile(&username)
        .await
        .map_err(ApiError::from)
        .map(|profile| ApiSuccess::new(StatusCode::OK, profile.into()))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;

    use super::*;

    #[test]
    fn test_profile_serialization() {
        let profile = PublicProfile {
            username: "alice01".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        };

        let body = serde_json::to_value(ProfileResponseData::from(profile)).unwrap();

        assert_eq!(
            body,
            serde_json::json!({
                "username": "alice01",
                "createdAt": "2024-05-01T12:00:00+00:00",
            })
        );
    }
}
