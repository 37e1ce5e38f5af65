use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::{devices::DeviceError, preferences::PreferenceError, session::AuthError};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Preference(#[from] PreferenceError),
    #[error(transparent)]
    Device(#[from] DeviceError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Auth(AuthError::InvalidCredentials) => StatusCode::UNAUTHORIZED,
            AppError::Preference(PreferenceError::Storage(_))
            | AppError::Auth(AuthError::Storage(_))
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Preference(_) => StatusCode::BAD_REQUEST,
            AppError::Device(DeviceError::ScanInProgress) => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_error_kind() {
        assert_eq!(AppError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::from(AuthError::InvalidCredentials).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::from(PreferenceError::InvalidRefreshInterval(0)).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(DeviceError::ScanInProgress).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::from(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
