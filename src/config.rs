use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::transcode::EncoderSettings;

const DEFAULT_PORT: u16 = 8000;

/// `[transcode]` table of the config file. Every key is optional.
#[derive(Deserialize, Default, Debug)]
pub struct FileTranscodeConfig {
    pub encoder: Option<PathBuf>,
    pub preset: Option<String>,
    pub video_bitrate: Option<String>,
    pub audio_bitrate: Option<String>,
}

#[derive(Deserialize, Default, Debug)]
pub struct FileConfig {
    pub root: Option<PathBuf>,
    pub port: Option<u16>,
    pub localhost: Option<bool>,
    #[serde(default)]
    pub transcode: FileTranscodeConfig,
}

#[derive(Debug)]
pub struct Config {
    pub root: PathBuf,
    pub port: u16,
    pub localhost: bool,
    pub transcode: EncoderSettings,
}

impl Config {
    /// Merge CLI args over the config file over built-in defaults.
    pub fn resolve(file: Option<FileConfig>, args: &crate::cli::Args) -> Result<Self, ConfigError> {
        let file = file.unwrap_or_default();
        let root = args
            .root
            .clone()
            .or(file.root)
            .ok_or(ConfigError::MissingRoot)?;

        let defaults = EncoderSettings::default();
        let transcode = EncoderSettings {
            encoder: args
                .encoder
                .clone()
                .or(file.transcode.encoder)
                .unwrap_or(defaults.encoder),
            preset: file.transcode.preset.unwrap_or(defaults.preset),
            video_bitrate: file.transcode.video_bitrate.unwrap_or(defaults.video_bitrate),
            audio_bitrate: file.transcode.audio_bitrate.unwrap_or(defaults.audio_bitrate),
        };

        Ok(Config {
            root,
            port: args.port.or(file.port).unwrap_or(DEFAULT_PORT),
            localhost: args.localhost || file.localhost.unwrap_or(false),
            transcode,
        })
    }
}

pub fn find_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_owned());
    }
    let cwd_config = PathBuf::from("tvview.toml");
    if cwd_config.exists() {
        return Some(cwd_config);
    }
    if let Some(config_dir) = dirs::config_dir() {
        let user_config = config_dir.join("tvview").join("config.toml");
        if user_config.exists() {
            return Some(user_config);
        }
    }
    None
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("no library root given (pass a directory or set `root` in the config file)")]
    MissingRoot,
}

pub fn load_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: FileConfig = toml::from_str(&content)?;
    Ok(config)
}
