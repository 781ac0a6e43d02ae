use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "tvview",
    about = "Serve a TV/video folder over HTTP: `tvview /path/to/TV` and open it in a browser",
    long_about = None,
    version,
)]
pub struct Args {
    /// Library root directory to serve (may also be set as `root` in the config file)
    pub root: Option<PathBuf>,

    /// HTTP port to listen on [default: 8000]
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Path to TOML config file (overrides default search: ./tvview.toml, ~/.config/tvview/config.toml)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Bind to localhost only (127.0.0.1) instead of all interfaces (0.0.0.0 + :::)
    #[arg(long)]
    pub localhost: bool,

    /// Encoder binary used by /stream [default: ffmpeg from PATH]
    #[arg(long, value_name = "PATH")]
    pub encoder: Option<PathBuf>,
}
