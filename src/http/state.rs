use std::sync::Arc;

use crate::media::root::LibraryRoot;
use crate::transcode::EncoderSettings;

/// Shared application state injected into all route handlers via axum::extract::State.
/// Built once from the startup config and never mutated, so handlers share it without locks.
#[derive(Clone)]
pub struct AppState {
    pub root: Arc<LibraryRoot>,
    pub encoder: Arc<EncoderSettings>,
}

impl AppState {
    pub fn new(root: LibraryRoot, encoder: EncoderSettings) -> Self {
        Self {
            root: Arc::new(root),
            encoder: Arc::new(encoder),
        }
    }
}
