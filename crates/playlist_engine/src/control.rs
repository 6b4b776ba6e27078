use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};

use crate::client::{control_client, endpoint, map_reqwest_error, rejection};
use crate::EngineSettings;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControlError {
    #[error("no URL provided")]
    EmptyUrl,
    #[error("invalid server URL: {0}")]
    InvalidBaseUrl(String),
    /// The runner answered with a non-2xx status.
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("request timed out")]
    Timeout,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("unexpected response: {0}")]
    Decode(String),
}

/// The two synchronous calls a job accepts.
#[async_trait::async_trait]
pub trait ControlClient: Send + Sync {
    /// Submits a playlist URL. Yields the runner's job id when it sent one.
    async fn start(&self, url: &str) -> Result<Option<String>, ControlError>;

    /// Asks the runner to stop. Success only means the request was accepted.
    async fn stop(&self, job_id: &str) -> Result<(), ControlError>;
}

#[derive(Serialize)]
struct StartRequest<'a> {
    url: &'a str,
}

#[derive(Deserialize)]
struct StartReply {
    #[serde(default)]
    download_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HttpControlClient {
    settings: EngineSettings,
    client: reqwest::Client,
}

impl HttpControlClient {
    pub fn new(settings: EngineSettings) -> Result<Self, ControlError> {
        let client = control_client(&settings)?;
        Ok(Self { settings, client })
    }
}

#[async_trait::async_trait]
impl ControlClient for HttpControlClient {
    async fn start(&self, url: &str) -> Result<Option<String>, ControlError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ControlError::EmptyUrl);
        }
        let target = endpoint(&self.settings.base_url, &["download"])?;
        let body = serde_json::to_vec(&StartRequest { url })
            .map_err(|err| ControlError::Decode(err.to_string()))?;

        let response = self
            .client
            .post(target)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        if !status.is_success() {
            return Err(rejection(status, &bytes));
        }

        let reply: StartReply = serde_json::from_slice(&bytes)
            .map_err(|err| ControlError::Decode(err.to_string()))?;
        Ok(reply.download_id.filter(|id| !id.is_empty()))
    }

    async fn stop(&self, job_id: &str) -> Result<(), ControlError> {
        let target = endpoint(&self.settings.base_url, &["stop_download", job_id])?;
        let response = self
            .client
            .post(target)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        Err(rejection(status, &bytes))
    }
}
