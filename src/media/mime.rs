use std::path::Path;

use crate::error::Error;
use crate::media::root::ResolvedPath;

/// Extensions treated as playable video. Everything else is listed as an
/// "other" file and refused by the transcode route.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "avi", "mov", "wmv", "flv", "ts", "webm", "m2ts"];

/// Content type used when the extension is unknown.
pub const DEFAULT_MIME: &str = "video/mp4";

/// Extension to MIME type. Lowercase keys; lookups lowercase the extension first.
const MIME_TYPES: &[(&str, &str)] = &[
    // Video
    ("mp4", "video/mp4"),
    ("m4v", "video/mp4"),
    ("mkv", "video/x-matroska"),
    ("avi", "video/x-msvideo"),
    ("mov", "video/quicktime"),
    ("wmv", "video/x-ms-wmv"),
    ("flv", "video/x-flv"),
    ("ts", "video/mp2t"),
    ("m2ts", "video/mp2t"),
    ("mts", "video/mp2t"),
    ("webm", "video/webm"),
    ("mpg", "video/mpeg"),
    ("mpeg", "video/mpeg"),
    ("ogv", "video/ogg"),
    ("3gp", "video/3gpp"),
    // Image (folder art)
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    // Subtitles and sidecar text
    ("srt", "application/x-subrip"),
    ("vtt", "text/vtt"),
    ("ass", "text/x-ssa"),
    ("txt", "text/plain"),
    ("nfo", "text/plain"),
];

/// How the caller asked for a file, decided by the route it hit.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DeliveryMode {
    Direct,
    Transcode,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Delivery {
    DirectServe,
    Transcode,
    Unsupported,
}

/// What the server knows about a file from its name alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaDescriptor {
    /// Lowercased extension without the dot.
    pub extension: Option<String>,
    pub mime: &'static str,
    /// True for files in [`VIDEO_EXTENSIONS`].
    pub direct: bool,
}

impl MediaDescriptor {
    /// Transcoding is never picked automatically: a direct request is served
    /// as-is whatever the codec, and only video files may be transcoded.
    pub fn delivery(&self, mode: DeliveryMode) -> Delivery {
        match mode {
            DeliveryMode::Direct => Delivery::DirectServe,
            DeliveryMode::Transcode if self.direct => Delivery::Transcode,
            DeliveryMode::Transcode => Delivery::Unsupported,
        }
    }
}

/// Client capability hint taken from the `User-Agent` header.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ClientHint {
    Desktop,
    Mobile,
}

impl ClientHint {
    pub fn from_user_agent(user_agent: Option<&str>) -> Self {
        match user_agent {
            Some(ua) if ua.to_ascii_lowercase().contains("mobile") => ClientHint::Mobile,
            _ => ClientHint::Desktop,
        }
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()?.to_str().map(str::to_ascii_lowercase)
}

pub fn is_video(path: &Path) -> bool {
    extension(path).is_some_and(|ext| VIDEO_EXTENSIONS.contains(&ext.as_str()))
}

/// Look up the MIME type for a path's extension, case-insensitively.
pub fn guess_mime(path: &Path) -> Option<&'static str> {
    let ext = extension(path)?;
    MIME_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
}

/// Describe a path without touching the filesystem.
pub fn describe(path: &Path) -> MediaDescriptor {
    MediaDescriptor {
        extension: extension(path),
        mime: guess_mime(path).unwrap_or(DEFAULT_MIME),
        direct: is_video(path),
    }
}

/// Describe a resolved path, which must be a regular file.
pub fn classify(resolved: &ResolvedPath) -> Result<MediaDescriptor, Error> {
    if !resolved.is_file() {
        return Err(Error::NotFound(format!("{} is not a file", resolved.relative())));
    }
    Ok(describe(resolved.path()))
}
