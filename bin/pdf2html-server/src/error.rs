//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`] so errors are automatically converted
//! to a `{"error": "..."}` JSON body with an appropriate status code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::{error, warn};

use crate::handlers::pdf2html::ConversionError;
use crate::schemas::convert::ErrorResponse;

/// All errors that can occur in the pdf2html-server request lifecycle.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The caller sent an invalid request, or its PDF could not be fetched.
    #[error("{0}")]
    BadRequest(String),

    /// The request body exceeded the configured ceiling.
    #[error("{0}")]
    PayloadTooLarge(String),

    /// pdf2htmlEX failed or produced nothing.
    #[error("PDF conversion failed: {0}")]
    Conversion(#[from] ConversionError),

    /// Staging or reading files failed.
    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),

    /// An unclassified internal server error.
    #[error("Server error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ServerError::Conversion(_) | ServerError::Io(_) | ServerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %message, "request failed");
        } else {
            warn!(status = status.as_u16(), error = %message, "request rejected");
        }
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
