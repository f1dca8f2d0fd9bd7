use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AppError {
    #[error("Invalid roomName")]
    InvalidRoomIdentifier,

    #[error("participantName is required")]
    MissingParticipant,

    #[error("No credential issuance strategy is configured")]
    ResolverNotConfigured,

    #[error("Local signing requires LIVEKIT_URL, LIVEKIT_API_KEY and LIVEKIT_API_SECRET")]
    SigningNotConfigured,

    #[error("Issuance service responded with {status}")]
    UpstreamIssuanceError { status: u16, body: String },

    #[error("Malformed issuance response: {0}")]
    MalformedIssuanceResponse(String),

    #[error("Issuance service unreachable: {0}")]
    UpstreamUnavailable(String),

    #[error("Token signing failed: {0}")]
    Signing(String),

    #[error("Unexpected error: {0}")]
    ConnectFailure(String),

    #[error("Encryption error: {0}")]
    EncryptionFailure(String),

    #[error("Media devices error: {0}")]
    MediaDeviceFailure(String),
}

impl AppError {
    /// Only connect failures end a session; the rest leave it running.
    pub fn is_session_fatal(&self) -> bool {
        matches!(self, AppError::ConnectFailure(_))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidRoomIdentifier | AppError::MissingParticipant => {
                StatusCode::BAD_REQUEST
            }
            AppError::ResolverNotConfigured
            | AppError::SigningNotConfigured
            | AppError::Signing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::UpstreamIssuanceError { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            AppError::MalformedIssuanceResponse(_) | AppError::UpstreamUnavailable(_) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::ConnectFailure(_)
            | AppError::EncryptionFailure(_)
            | AppError::MediaDeviceFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let error_message = match self {
            // Upstream rejections are passed through untouched.
            AppError::UpstreamIssuanceError { body, .. } => {
                return (status, [(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body)
                    .into_response();
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": error_message,
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        AppError::Signing(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::UpstreamUnavailable(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
