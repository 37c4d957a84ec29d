use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::app::XhsError;
use crate::login::QrCodeError;

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("Could not start a login session: {0}")]
    LoginUnavailable(String),

    #[error("Login session is not active")]
    SessionInactive,

    #[error("QR code unavailable: {0}")]
    QrCodeUnavailable(String),

    #[error("Login session not found")]
    SessionMissing,

    #[error("Unsupported action")]
    UnsupportedAction,

    #[error("No cookie configured and no active login session")]
    MissingCookie,

    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("Upstream error: {0}")]
    Upstream(String),
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            RouteError::LoginUnavailable(msg) => (
                StatusCode::BAD_GATEWAY,
                json!({"error": "login_unavailable", "message": msg}),
            ),
            RouteError::SessionInactive => {
                (StatusCode::NOT_FOUND, json!({"error": "session_inactive"}))
            }
            RouteError::QrCodeUnavailable(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": "qrcode_unavailable", "message": msg}),
            ),
            RouteError::SessionMissing => (StatusCode::NOT_FOUND, json!({"status": "missing"})),
            RouteError::UnsupportedAction => {
                (StatusCode::NOT_FOUND, json!({"error": "unsupported_action"}))
            }
            RouteError::MissingCookie => (
                StatusCode::UNAUTHORIZED,
                json!({"error": "missing_cookie", "message": self.to_string()}),
            ),
            RouteError::ExtractionFailed(msg) => (
                StatusCode::BAD_GATEWAY,
                json!({"error": "extraction_failed", "message": msg}),
            ),
            RouteError::Upstream(msg) => (
                StatusCode::BAD_GATEWAY,
                json!({"error": "upstream_error", "message": msg}),
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<XhsError> for RouteError {
    fn from(err: XhsError) -> Self {
        match err {
            XhsError::MissingCookie => RouteError::MissingCookie,
            XhsError::Extraction(_) | XhsError::Parse(_) | XhsError::Json(_) => {
                RouteError::ExtractionFailed(err.to_string())
            }
            other => RouteError::Upstream(other.to_string()),
        }
    }
}

impl From<QrCodeError> for RouteError {
    fn from(err: QrCodeError) -> Self {
        match err {
            QrCodeError::Inactive => RouteError::SessionInactive,
            QrCodeError::Unavailable(msg) => RouteError::QrCodeUnavailable(msg),
        }
    }
}
