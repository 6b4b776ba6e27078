use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use playlist_engine::{ChannelTransport, EngineSettings};
use serde::{Deserialize, Serialize};

use super::logging::LogDestination;

const DEFAULT_CONFIG_FILE: &str = "playlist.ron";

/// User settings, read from a RON file. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server_url: String,
    pub output_dir: PathBuf,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub reconnect_delay_secs: u64,
    pub transport: ChannelTransport,
    pub log_destination: LogDestination,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:5000".to_string(),
            output_dir: PathBuf::from("downloads"),
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            reconnect_delay_secs: 3,
            transport: ChannelTransport::SocketIo,
            log_destination: LogDestination::File,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Reads `path`, or `./playlist.ron` when none is given, and returns the file it came from.
    ///
    /// Only the implicit default file may be absent; an explicit path must exist. Nothing
    /// is logged here since this runs before the logger is set up.
    pub fn load(path: Option<&Path>) -> anyhow::Result<(Self, Option<PathBuf>)> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound && !explicit => {
                return Ok((Self::default(), None));
            }
            Err(err) => {
                return Err(err).with_context(|| format!("reading {}", path.display()));
            }
        };
        let config = Self::parse(&text).with_context(|| format!("parsing {}", path.display()))?;
        Ok((config, Some(path)))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(ron::from_str(text)?)
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            base_url: self.server_url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            reconnect_delay: Duration::from_secs(self.reconnect_delay_secs),
            transport: self.transport,
            output_dir: self.output_dir.clone(),
            ..EngineSettings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn partial_file_fills_in_defaults() {
        let config = AppConfig::parse(
            r#"(
                server_url: "http://runner:9000",
                transport: Sse,
                log_destination: Both,
            )"#,
        )
        .unwrap();

        assert_eq!(
            config,
            AppConfig {
                server_url: "http://runner:9000".to_string(),
                transport: ChannelTransport::Sse,
                log_destination: LogDestination::Both,
                ..AppConfig::default()
            }
        );
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(AppConfig::parse("(server_url: 5)").is_err());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.ron");
        assert!(AppConfig::load(Some(&missing)).is_err());
    }

    #[test]
    fn explicit_file_is_read() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("playlist.ron");
        fs::write(&path, "(reconnect_delay_secs: 1, output_dir: \"out\")").unwrap();

        let (config, source) = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.reconnect_delay_secs, 1);
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(source, Some(path));
    }

    #[test]
    fn engine_settings_follow_config() {
        let config = AppConfig {
            request_timeout_secs: 5,
            ..AppConfig::default()
        };
        let settings = config.engine_settings();
        assert_eq!(settings.base_url, "http://localhost:5000");
        assert_eq!(settings.request_timeout, Duration::from_secs(5));
        assert_eq!(settings.output_dir, PathBuf::from("downloads"));
        assert_eq!(settings.transport, ChannelTransport::SocketIo);
    }
}
