//! Serve a local TV/video library over HTTP: folder listings, direct playback
//! with range requests, and live transcoding for clients that need it.

pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod media;
pub mod transcode;
