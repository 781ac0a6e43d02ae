pub mod browse;
pub mod html;
pub mod state;
pub mod stream;
pub mod thumb;
pub mod video;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;
use crate::http::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Pages
        .route("/", get(browse::index))
        .route("/browse/{*path}", get(browse::browse))
        .route("/play/{*path}", get(browse::play))
        // Media delivery
        .route("/video/{*path}", get(video::video_get).head(video::video_head))
        .route("/stream/{*path}", get(stream::stream))
        .route("/thumb/{*path}", get(thumb::thumb))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
