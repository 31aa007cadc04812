use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Failures of the account store, kept separate from the auth taxonomy so
/// repository implementations stay framework-free.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("User with this email already exists")]
    DuplicateAccount,
    #[error("Incorrect email or password")]
    InvalidCredentials,
    #[error("Invalid token")]
    MalformedToken,
    #[error("Token expired")]
    ExpiredToken,
    #[error("{0}")]
    Validation(String),
    #[error("password hashing failed")]
    Hashing,
    #[error("token signing failed")]
    TokenSigning,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let challenge = matches!(self, AuthError::InvalidCredentials);
        let (status, message) = match &self {
            AuthError::DuplicateAccount => (StatusCode::CONFLICT, self.to_string()),
            AuthError::InvalidCredentials
            | AuthError::MalformedToken
            | AuthError::ExpiredToken => (StatusCode::UNAUTHORIZED, self.to_string()),
            AuthError::Validation(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AuthError::Hashing | AuthError::TokenSigning => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
            AuthError::Repo(e) => {
                error!(error = %e, "repository error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({ "success": false, "message": message }));
        let mut response = (status, body).into_response();
        if challenge {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
