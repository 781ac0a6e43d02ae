use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::error::Error;
use crate::http::state::AppState;
use crate::media::mime::{classify, Delivery, DeliveryMode};
use crate::transcode::TranscodeSession;

/// GET /stream/{*path}: transcode to fragmented MP4 and stream it as produced.
///
/// The body has no length and ignores `Range`; seeking is not supported in
/// this mode. `Accept-Ranges` is still sent because some players refuse to
/// start without it. When the client disconnects hyper drops the body,
/// which drops the session and kills the encoder.
pub async fn stream(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Response, Error> {
    let resolved = state.root.resolve(&path).await?;
    let descriptor = classify(&resolved)?;
    if descriptor.delivery(DeliveryMode::Transcode) == Delivery::Unsupported {
        return Err(Error::Unsupported(path));
    }

    let session = TranscodeSession::start(&state.encoder, resolved.path()).await?;
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("video/mp4")),
            (header::ACCEPT_RANGES, HeaderValue::from_static("bytes")),
            (header::CACHE_CONTROL, HeaderValue::from_static("no-store")),
        ],
        Body::from_stream(session),
    )
        .into_response())
}
