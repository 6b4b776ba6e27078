use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_warn};
use futures_util::StreamExt;
use reqwest::header::ACCEPT;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::client::{endpoint, stream_client};
use crate::{
    decode_frame, ChannelEvent, ChannelState, ControlError, EngineSettings, SseFrame, SseParser,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    #[error("invalid server URL: {0}")]
    InvalidBaseUrl(String),
    #[error("event stream returned HTTP {0}")]
    Status(u16),
    #[error("event stream failed: {0}")]
    Transport(String),
}

/// Receives typed notifications from an [`EventSource`].
pub trait EventSink: Send + Sync {
    fn emit(&self, event: ChannelEvent);
    fn state_changed(&self, state: ChannelState);
}

/// A push channel connection. `stream` returns when the connection ends.
#[async_trait::async_trait]
pub trait EventSource: Send + Sync {
    async fn stream(&self, sink: &dyn EventSink) -> Result<(), ChannelError>;
}

/// Subscribes to `GET {base}/events` and decodes the six job notifications.
#[derive(Debug, Clone)]
pub struct SseEventSource {
    settings: EngineSettings,
    client: reqwest::Client,
}

impl SseEventSource {
    pub fn new(settings: EngineSettings) -> Result<Self, ControlError> {
        let client = stream_client(&settings)?;
        Ok(Self { settings, client })
    }
}

#[async_trait::async_trait]
impl EventSource for SseEventSource {
    async fn stream(&self, sink: &dyn EventSink) -> Result<(), ChannelError> {
        let url = endpoint(&self.settings.base_url, &["events"])
            .map_err(|err| ChannelError::InvalidBaseUrl(err.to_string()))?;
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(|err| ChannelError::Transport(err.to_string()))?;
        if !response.status().is_success() {
            return Err(ChannelError::Status(response.status().as_u16()));
        }
        sink.state_changed(ChannelState::Connected);

        let mut parser = SseParser::new();
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|err| ChannelError::Transport(err.to_string()))?;
            for frame in parser.push(&chunk) {
                dispatch(&frame, sink);
            }
        }
        if let Some(frame) = parser.finish() {
            dispatch(&frame, sink);
        }
        Ok(())
    }
}

fn dispatch(frame: &SseFrame, sink: &dyn EventSink) {
    if frame.event.is_none() && frame.data.is_empty() {
        return;
    }
    match decode_frame(frame) {
        Ok(event) => sink.emit(event),
        Err(err) => engine_warn!("Skipping push frame: {}", err),
    }
}

/// Owns the push-channel subscription for the lifetime of the app.
pub struct EventChannelClient;

impl EventChannelClient {
    /// Starts the reader task. Must be called inside a tokio runtime.
    ///
    /// The source is re-subscribed after `reconnect_delay` whenever it ends,
    /// until the returned [`Subscription`] is closed or dropped.
    pub fn open(
        source: Arc<dyn EventSource>,
        sink: Arc<dyn EventSink>,
        reconnect_delay: Duration,
    ) -> Subscription {
        let cancel = CancellationToken::new();
        let closed = Arc::new(AtomicBool::new(false));
        let gated = GatedSink {
            inner: sink,
            closed: closed.clone(),
        };
        let token = cancel.clone();
        let task = tokio::spawn(async move {
            loop {
                let outcome = tokio::select! {
                    _ = token.cancelled() => break,
                    outcome = source.stream(&gated) => outcome,
                };
                let reason = match outcome {
                    Ok(()) => "stream ended".to_string(),
                    Err(err) => err.to_string(),
                };
                engine_warn!("Push channel disconnected: {}", reason);
                gated.state_changed(ChannelState::Disconnected { reason });
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(reconnect_delay) => {}
                }
                engine_debug!("Reconnecting push channel");
            }
        });
        engine_info!("Push channel subscription opened");
        Subscription {
            cancel,
            closed,
            task: Some(task),
        }
    }
}

/// Handle to the running subscription. Closing (or dropping) it releases the
/// channel; nothing is forwarded afterwards, even if a frame was mid-decode.
pub struct Subscription {
    cancel: CancellationToken,
    closed: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn close(&mut self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
        engine_info!("Push channel subscription closed");
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.close();
    }
}

struct GatedSink {
    inner: Arc<dyn EventSink>,
    closed: Arc<AtomicBool>,
}

impl EventSink for GatedSink {
    fn emit(&self, event: ChannelEvent) {
        if !self.closed.load(Ordering::SeqCst) {
            self.inner.emit(event);
        }
    }

    fn state_changed(&self, state: ChannelState) {
        if !self.closed.load(Ordering::SeqCst) {
            self.inner.state_changed(state);
        }
    }
}
