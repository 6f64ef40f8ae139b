//! Mapping of request failures onto HTTP responses.

use axum::{
    extract::multipart::MultipartError,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use mediacut_core::ProcessError;
use tracing::{error, warn};

/// Error returned by the media handlers. Bodies are plain text.
#[derive(Debug)]
pub enum ApiError {
    /// The multipart form is malformed, too large or incomplete.
    Form { status: StatusCode, message: String },
    /// The processor rejected or failed the request.
    Process(ProcessError),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::Form {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Form { status, .. } => *status,
            Self::Process(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            Self::Process(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::Form { message, .. } => message.clone(),
            Self::Process(e) => e.to_string(),
        }
    }
}

impl From<ProcessError> for ApiError {
    fn from(e: ProcessError) -> Self {
        Self::Process(e)
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        Self::Form {
            status: e.status(),
            message: e.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();

        if status.is_server_error() {
            error!(status = status.as_u16(), "{}", message);
        } else {
            warn!(status = status.as_u16(), "{}", message);
        }

        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            message,
        )
            .into_response()
    }
}
