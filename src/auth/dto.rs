use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo::User;

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthData {
    pub user: PublicUser,
    pub token: String,
}

/// Response envelope returned after register and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub data: AuthData,
    pub message: String,
}

impl AuthResponse {
    pub fn new(user: &User, token: String, message: &str) -> Self {
        Self {
            success: true,
            data: AuthData {
                user: PublicUser::from(user),
                token,
            },
            message: message.to_owned(),
        }
    }
}

/// Envelope for responses that carry no data, e.g. logout.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        let now = OffsetDateTime::now_utc();
        User {
            id: Uuid::new_v4(),
            email: "test@example.com".into(),
            password_hash: "$argon2id$secret-digest".into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn public_user_never_carries_the_digest() {
        let user = sample_user();
        let value = serde_json::to_value(PublicUser::from(&user)).expect("serialize");
        assert_eq!(value["email"], "test@example.com");
        assert!(value.get("password_hash").is_none());
        assert!(value.get("created_at").is_some());
        assert!(value.get("updated_at").is_some());
    }

    #[test]
    fn auth_response_envelope_shape() {
        let user = sample_user();
        let response = AuthResponse::new(&user, "token-value".into(), "Registration successful");
        let value = serde_json::to_value(&response).expect("serialize");
        assert_eq!(value["success"], true);
        assert_eq!(value["message"], "Registration successful");
        assert_eq!(value["data"]["token"], "token-value");
        assert_eq!(value["data"]["user"]["email"], "test@example.com");
        assert!(value["data"]["user"].get("password_hash").is_none());
    }

    #[test]
    fn user_record_skips_digest_in_json() {
        let json = serde_json::to_string(&sample_user()).expect("serialize");
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("secret-digest"));
    }
}
