use std::io;
use std::path::Path as FsPath;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use http_range_header::parse_range_header;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use crate::error::Error;
use crate::http::state::AppState;
use crate::media::mime::classify;

/// Headers present on every direct-serve response (GET and HEAD).
fn file_headers(mime: &'static str, length: u64) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(mime));
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
    headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    headers
}

/// Serve a regular file's bytes, honoring a `Range` request header.
///
/// The length comes from the opened handle, so a file replaced between
/// resolution and serving is served consistently or not at all. Multi-range
/// requests are answered with the first range only.
pub async fn serve_file(
    path: &FsPath,
    mime: &'static str,
    range: Option<&HeaderValue>,
) -> Result<Response, Error> {
    let mut file = tokio::fs::File::open(path).await.map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => Error::NotFound(path.display().to_string()),
        _ => Error::Io(e),
    })?;
    let size = file.metadata().await?.len();
    let mut headers = file_headers(mime, size);

    // A header that does not parse as a byte range is ignored, not rejected.
    let parsed = range.and_then(|value| {
        let parsed = value.to_str().ok().and_then(|s| parse_range_header(s).ok());
        if parsed.is_none() {
            tracing::debug!("Ignoring malformed Range header {:?} for {}", value, path.display());
        }
        parsed
    });
    let Some(parsed) = parsed else {
        let body = Body::from_stream(ReaderStream::new(file));
        return Ok((StatusCode::OK, headers, body).into_response());
    };

    let unsatisfiable = || Error::RangeNotSatisfiable { size };
    // validate() resolves suffix and open-ended ranges against the real size
    // and rejects anything starting past the end.
    let ranges = parsed.validate(size).map_err(|_| unsatisfiable())?;
    let first = ranges.into_iter().next().ok_or_else(unsatisfiable)?;

    let start = *first.start();
    let end = *first.end(); // inclusive
    let length = end - start + 1;

    file.seek(io::SeekFrom::Start(start)).await?;

    headers.insert(
        header::CONTENT_RANGE,
        HeaderValue::from_str(&format!("bytes {start}-{end}/{size}"))
            .map_err(|e| Error::Io(io::Error::new(io::ErrorKind::InvalidData, e)))?,
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));

    let body = Body::from_stream(ReaderStream::new(file.take(length)));
    Ok((StatusCode::PARTIAL_CONTENT, headers, body).into_response())
}

/// GET /video/{*path}: the file's original bytes with range support.
pub async fn video_get(
    State(state): State<AppState>,
    Path(path): Path<String>,
    req_headers: HeaderMap,
) -> Result<Response, Error> {
    let resolved = state.root.resolve(&path).await?;
    // Direct requests serve any file as-is, so there is no delivery decision here.
    let descriptor = classify(&resolved)?;
    serve_file(resolved.path(), descriptor.mime, req_headers.get(header::RANGE)).await
}

/// HEAD /video/{*path}: same headers as a full GET, without opening the file for reading.
pub async fn video_head(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Response, Error> {
    let resolved = state.root.resolve(&path).await?;
    let descriptor = classify(&resolved)?;
    let size = tokio::fs::metadata(resolved.path()).await?.len();
    Ok((StatusCode::OK, file_headers(descriptor.mime, size)).into_response())
}
