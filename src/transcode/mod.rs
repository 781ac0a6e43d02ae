//! Live transcoding of library files into fragmented MP4 (H.264 + AAC).
//!
//! Each request gets its own encoder process whose stdout is streamed to the
//! client as it is produced. See [`session::TranscodeSession`].

pub mod session;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub use session::{Canceller, ExitWatcher, TranscodeSession, CHUNK_SIZE};

pub const DEFAULT_ENCODER: &str = "ffmpeg";
pub const DEFAULT_PRESET: &str = "ultrafast";
pub const DEFAULT_VIDEO_BITRATE: &str = "500k";
pub const DEFAULT_AUDIO_BITRATE: &str = "96k";

const VIDEO_CODEC: &str = "libx264";
const AUDIO_CODEC: &str = "aac";
// Fragmented MP4 is the only MP4 flavour that can be written to a pipe.
const MOVFLAGS: &str = "frag_keyframe+empty_moov";

/// Static encoder configuration, fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderSettings {
    pub encoder: PathBuf,
    pub preset: String,
    pub video_bitrate: String,
    pub audio_bitrate: String,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            encoder: PathBuf::from(DEFAULT_ENCODER),
            preset: DEFAULT_PRESET.to_string(),
            video_bitrate: DEFAULT_VIDEO_BITRATE.to_string(),
            audio_bitrate: DEFAULT_AUDIO_BITRATE.to_string(),
        }
    }
}

impl EncoderSettings {
    /// Encoder arguments for one source file. Output always goes to stdout.
    pub fn args(&self, source: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-hide_banner", "-nostats", "-nostdin", "-i"]
            .iter()
            .map(OsString::from)
            .collect();
        args.push(source.as_os_str().to_owned());
        for arg in [
            "-c:v",
            VIDEO_CODEC,
            "-preset",
            self.preset.as_str(),
            "-b:v",
            self.video_bitrate.as_str(),
            "-c:a",
            AUDIO_CODEC,
            "-b:a",
            self.audio_bitrate.as_str(),
            "-f",
            "mp4",
            "-movflags",
            MOVFLAGS,
            "pipe:1",
        ] {
            args.push(OsString::from(arg));
        }
        args
    }

    /// Full path of the encoder if it can be found, for the startup check.
    pub fn locate(&self) -> Option<PathBuf> {
        which::which(&self.encoder).ok()
    }
}
