use std::path::PathBuf;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

/// Failures of the media delivery core. Every variant is terminal for the
/// request that produced it; nothing here is retried.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("path escapes the library root: {0}")]
    Forbidden(String),

    #[error("requested range not satisfiable (file is {size} bytes)")]
    RangeNotSatisfiable { size: u64 },

    #[error("cannot transcode {0}: not a video file")]
    Unsupported(String),

    #[error("transcode source not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("failed to start encoder {}: {source}", encoder.display())]
    EncoderStartFailed {
        encoder: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::NotFound(_) | Error::SourceNotFound(_) => StatusCode::NOT_FOUND,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::RangeNotSatisfiable { .. } => StatusCode::RANGE_NOT_SATISFIABLE,
            Error::Unsupported(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Error::EncoderStartFailed { .. } | Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Error::NotFound(_) | Error::SourceNotFound(_) | Error::RangeNotSatisfiable { .. } => {
                tracing::debug!("{}", self)
            }
            Error::Forbidden(_) | Error::Unsupported(_) => tracing::warn!("{}", self),
            Error::EncoderStartFailed { .. } | Error::Io(_) => tracing::error!("{}", self),
        }

        match self {
            // 416 carries the real length so clients can retry with a valid range.
            Error::RangeNotSatisfiable { size } => (
                status,
                [(header::CONTENT_RANGE, format!("bytes */{size}"))],
            )
                .into_response(),
            Error::NotFound(_) | Error::SourceNotFound(_) => {
                (status, "File not found").into_response()
            }
            Error::Forbidden(_) => (status, "Forbidden").into_response(),
            Error::Unsupported(_) => (status, "Not a video file").into_response(),
            Error::EncoderStartFailed { .. } | Error::Io(_) => {
                (status, "Internal server error").into_response()
            }
        }
    }
}
