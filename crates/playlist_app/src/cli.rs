use std::path::PathBuf;

use clap::Parser;

use crate::platform::config::AppConfig;

/// Terminal client for a playlist download runner
#[derive(Parser, Debug)]
#[command(
    name = "playlist",
    version,
    about = "Start, watch and collect playlist downloads from a job runner"
)]
pub struct Cli {
    /// Playlist URL to submit right away
    pub url: Option<String>,

    /// Job runner base URL (e.g. http://localhost:5000)
    #[arg(short, long, value_name = "URL")]
    pub server: Option<String>,

    /// Directory retrieved files are saved into
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Configuration file path (defaults to ./playlist.ron)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log level: error, warn, info, debug or trace
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

impl Cli {
    /// Command-line flags win over the configuration file.
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(server) = &self.server {
            config.server_url = server.clone();
        }
        if let Some(output) = &self.output {
            config.output_dir = output.clone();
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
    }
}
