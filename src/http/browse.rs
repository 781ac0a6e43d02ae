use axum::{
    extract::{Path, State},
    http::{header, HeaderMap},
    response::{Html, IntoResponse, Response},
};

use crate::error::Error;
use crate::http::html::{render_listing, render_player};
use crate::http::state::AppState;
use crate::http::video::serve_file;
use crate::media::listing::{list_directory, parent_of};
use crate::media::mime::{classify, ClientHint};

fn client_hint(headers: &HeaderMap) -> ClientHint {
    ClientHint::from_user_agent(headers.get(header::USER_AGENT).and_then(|v| v.to_str().ok()))
}

async fn browse_path(state: &AppState, path: &str, headers: &HeaderMap) -> Result<Response, Error> {
    let resolved = state.root.resolve(path).await?;

    // Old bookmarks point files at /browse; serve them like /video.
    if resolved.is_file() {
        let descriptor = classify(&resolved)?;
        return serve_file(resolved.path(), descriptor.mime, headers.get(header::RANGE)).await;
    }

    let listing = list_directory(&resolved).await?;
    let host = headers.get(header::HOST).and_then(|v| v.to_str().ok());
    Ok(Html(render_listing(&listing, client_hint(headers), host)).into_response())
}

/// GET /: listing of the library root.
pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, Error> {
    browse_path(&state, "", &headers).await
}

/// GET /browse/{*path}: directory listing, or the file itself.
pub async fn browse(
    State(state): State<AppState>,
    Path(path): Path<String>,
    headers: HeaderMap,
) -> Result<Response, Error> {
    browse_path(&state, &path, &headers).await
}

/// GET /play/{*path}: HTML player for one video.
pub async fn play(State(state): State<AppState>, Path(path): Path<String>) -> Result<Response, Error> {
    let resolved = state.root.resolve(&path).await?;
    classify(&resolved)?;

    let relative = resolved.relative();
    let file_name = relative.rsplit('/').next().unwrap_or(relative);
    let back = parent_of(relative).unwrap_or_default();
    Ok(Html(render_player(relative, file_name, &back)).into_response())
}
