use automaker_core::AutomakerError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

// ---------------------------------------------------------------------------
// Internal sentinels for explicit status codes
// ---------------------------------------------------------------------------

/// Carries an explicit HTTP status through the `anyhow::Error` chain without
/// touching the `AutomakerError` enum.
#[derive(Debug)]
struct StatusError {
    status: StatusCode,
    message: String,
}

impl std::fmt::Display for StatusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for StatusError {}

// ---------------------------------------------------------------------------
// AppError: unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
///
/// Every error body has the shape `{ "success": false, "error": "…" }`.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    fn with_status(status: StatusCode, msg: impl Into<String>) -> Self {
        Self(
            StatusError {
                status,
                message: msg.into(),
            }
            .into(),
        )
    }

    /// Construct a 400 Bad Request error with the given message.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::with_status(StatusCode::BAD_REQUEST, msg)
    }

    /// Construct a 409 Conflict error.
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::with_status(StatusCode::CONFLICT, msg)
    }

    /// A 400 for a required request field that was absent.
    pub fn missing_field(field: &str) -> Self {
        Self(AutomakerError::MissingField(field.to_string()).into())
    }

    fn status(&self) -> StatusCode {
        if let Some(e) = self.0.downcast_ref::<StatusError>() {
            return e.status;
        }
        match self.0.downcast_ref::<AutomakerError>() {
            Some(
                AutomakerError::InvalidUpdate(_)
                | AutomakerError::MissingField(_)
                | AutomakerError::UnknownProvider(_),
            ) => StatusCode::BAD_REQUEST,
            Some(AutomakerError::Io(_) | AutomakerError::Json(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            None => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        let body = serde_json::json!({ "success": false, "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
