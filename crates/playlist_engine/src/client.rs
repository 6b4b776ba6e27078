use std::path::PathBuf;
use std::time::Duration;

use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};

use crate::ControlError;

/// How the runner pushes job notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChannelTransport {
    /// Socket.IO, as served by the Flask-SocketIO runner.
    #[default]
    SocketIo,
    /// Server-sent events on `GET {base}/events`.
    Sse,
}

/// Connection settings shared by every client the engine builds.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Job runner root, e.g. `http://localhost:5000`.
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Upper bound for control requests, and the idle read limit for artifact downloads.
    pub request_timeout: Duration,
    /// Pause before re-subscribing after the push channel drops.
    pub reconnect_delay: Duration,
    pub transport: ChannelTransport,
    pub output_dir: PathBuf,
    pub max_artifact_bytes: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            reconnect_delay: Duration::from_secs(3),
            transport: ChannelTransport::default(),
            output_dir: PathBuf::from("downloads"),
            max_artifact_bytes: 2 * 1024 * 1024 * 1024,
        }
    }
}

/// Client for short request/response calls.
pub(crate) fn control_client(settings: &EngineSettings) -> Result<reqwest::Client, ControlError> {
    reqwest::Client::builder()
        .connect_timeout(settings.connect_timeout)
        .timeout(settings.request_timeout)
        .build()
        .map_err(|err| ControlError::Transport(err.to_string()))
}

/// Client for long bodies: artifacts may take minutes, so only idle reads are bounded.
pub(crate) fn download_client(settings: &EngineSettings) -> Result<reqwest::Client, ControlError> {
    reqwest::Client::builder()
        .connect_timeout(settings.connect_timeout)
        .read_timeout(settings.request_timeout)
        .build()
        .map_err(|err| ControlError::Transport(err.to_string()))
}

/// Client for the push channel. Silence is legal there, so no read or total timeout.
pub(crate) fn stream_client(settings: &EngineSettings) -> Result<reqwest::Client, ControlError> {
    reqwest::Client::builder()
        .connect_timeout(settings.connect_timeout)
        .build()
        .map_err(|err| ControlError::Transport(err.to_string()))
}

/// Joins percent-encoded path segments onto the runner's base URL.
pub(crate) fn endpoint(base_url: &str, segments: &[&str]) -> Result<Url, ControlError> {
    let mut url =
        Url::parse(base_url).map_err(|err| ControlError::InvalidBaseUrl(err.to_string()))?;
    url.path_segments_mut()
        .map_err(|()| ControlError::InvalidBaseUrl(format!("{base_url} cannot be a base")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[derive(Debug, Deserialize)]
struct ErrorReply {
    error: String,
}

/// Builds the error for a non-2xx reply, preferring the runner's `{"error": ...}` message.
pub(crate) fn rejection(status: StatusCode, body: &[u8]) -> ControlError {
    let message = serde_json::from_slice::<ErrorReply>(body)
        .map(|reply| reply.error)
        .unwrap_or_else(|_| status.to_string());
    ControlError::Rejected {
        status: status.as_u16(),
        message,
    }
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> ControlError {
    if err.is_timeout() {
        return ControlError::Timeout;
    }
    ControlError::Transport(err.to_string())
}
