use std::path::PathBuf;

use engine_logging::{engine_debug, engine_info};
use futures_util::StreamExt;
use serde::Deserialize;

use crate::client::{control_client, download_client, endpoint, map_reqwest_error, rejection};
use crate::{local_artifact_name, AtomicFileWriter, ControlError, EngineSettings, PersistError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RetrieveError {
    #[error("invalid artifact name {0:?}")]
    InvalidFilename(String),
    #[error("{0}")]
    Request(#[from] ControlError),
    #[error("artifact too large (max {max_bytes}, actual {actual:?})")]
    TooLarge { max_bytes: u64, actual: Option<u64> },
    #[error("could not save artifact: {0}")]
    Persist(String),
}

impl From<PersistError> for RetrieveError {
    fn from(err: PersistError) -> Self {
        RetrieveError::Persist(err.to_string())
    }
}

/// A finished file the runner can serve.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArtifactEntry {
    pub filename: String,
    #[serde(default)]
    pub size: u64,
}

#[derive(Deserialize)]
struct ListReply {
    #[serde(default)]
    files: Vec<ArtifactEntry>,
}

/// Where completed items are fetched from, by filename.
#[async_trait::async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Downloads one artifact into the output directory and returns its local path.
    async fn retrieve(&self, filename: &str) -> Result<PathBuf, RetrieveError>;

    async fn list(&self) -> Result<Vec<ArtifactEntry>, ControlError>;
}

#[derive(Debug, Clone)]
pub struct HttpArtifactStore {
    settings: EngineSettings,
    client: reqwest::Client,
    list_client: reqwest::Client,
}

impl HttpArtifactStore {
    pub fn new(settings: EngineSettings) -> Result<Self, ControlError> {
        let client = download_client(&settings)?;
        let list_client = control_client(&settings)?;
        Ok(Self {
            settings,
            client,
            list_client,
        })
    }
}

#[async_trait::async_trait]
impl ArtifactStore for HttpArtifactStore {
    async fn retrieve(&self, filename: &str) -> Result<PathBuf, RetrieveError> {
        let local = local_artifact_name(filename)
            .ok_or_else(|| RetrieveError::InvalidFilename(filename.to_string()))?;
        let url = endpoint(&self.settings.base_url, &["download_file", filename])?;
        engine_debug!("Retrieving {} from {}", filename, url);

        let response = self.client.get(url).send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.map_err(map_reqwest_error)?;
            return Err(rejection(status, &body).into());
        }

        let max_bytes = self.settings.max_artifact_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(RetrieveError::TooLarge {
                    max_bytes,
                    actual: Some(content_len),
                });
            }
        }

        let writer = AtomicFileWriter::new(self.settings.output_dir.clone());
        let mut pending = writer.create(&local)?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = pending.written() + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(RetrieveError::TooLarge {
                    max_bytes,
                    actual: Some(next_len),
                });
            }
            pending.write_chunk(&chunk)?;
        }

        let written = pending.written();
        let path = pending.commit()?;
        engine_info!("Saved {} ({} bytes) to {:?}", filename, written, path);
        Ok(path)
    }

    async fn list(&self) -> Result<Vec<ArtifactEntry>, ControlError> {
        let url = endpoint(&self.settings.base_url, &["list_downloads"])?;
        let response = self
            .list_client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        if !status.is_success() {
            return Err(rejection(status, &body));
        }
        let reply: ListReply =
            serde_json::from_slice(&body).map_err(|err| ControlError::Decode(err.to_string()))?;
        Ok(reply.files)
    }
}
