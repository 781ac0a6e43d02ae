use axum::{
    extract::{Path, State},
    http::{header, HeaderMap},
    response::Response,
};

use crate::error::Error;
use crate::http::state::AppState;
use crate::http::video::serve_file;
use crate::media::listing::{find_thumbnail, THUMBNAIL_NAME};
use crate::media::mime::guess_mime;

/// Strip a trailing `index.jpg` segment, leaving the folder part.
fn thumbnail_folder(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rsplit_once('/') {
        Some((folder, name)) if name.eq_ignore_ascii_case(THUMBNAIL_NAME) => folder,
        None if trimmed.eq_ignore_ascii_case(THUMBNAIL_NAME) => "",
        _ => trimmed,
    }
}

/// GET /thumb/{*path}: folder art for `<folder>/index.jpg` or `<folder>`.
pub async fn thumb(
    State(state): State<AppState>,
    Path(path): Path<String>,
    req_headers: HeaderMap,
) -> Result<Response, Error> {
    let folder = state.root.resolve(thumbnail_folder(&path)).await?;
    if !folder.is_dir() {
        return Err(Error::NotFound(path));
    }
    let Some(image) = find_thumbnail(folder.path()).await else {
        return Err(Error::NotFound(path));
    };
    let mime = guess_mime(&image).unwrap_or("image/jpeg");
    serve_file(&image, mime, req_headers.get(header::RANGE)).await
}
