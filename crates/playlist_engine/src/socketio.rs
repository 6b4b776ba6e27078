//! Socket.IO push channel, as served by the Flask-SocketIO job runner.

use engine_logging::{engine_debug, engine_warn};
use futures_util::FutureExt;
use rust_socketio::asynchronous::{Client, ClientBuilder};
use rust_socketio::Payload;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::client::endpoint;
use crate::{
    decode_json, ChannelError, ChannelState, EngineSettings, EventKind, EventSink, EventSource,
};

enum SocketMessage {
    Event(EventKind, Payload),
    Closed,
    Failed(String),
}

/// Connects to the runner's Socket.IO endpoint and listens for the six job events.
#[derive(Debug, Clone)]
pub struct SocketIoEventSource {
    settings: EngineSettings,
}

impl SocketIoEventSource {
    pub fn new(settings: EngineSettings) -> Self {
        Self { settings }
    }
}

#[async_trait::async_trait]
impl EventSource for SocketIoEventSource {
    async fn stream(&self, sink: &dyn EventSink) -> Result<(), ChannelError> {
        let url = endpoint(&self.settings.base_url, &[])
            .map_err(|err| ChannelError::InvalidBaseUrl(err.to_string()))?;

        // Callbacks run on the socket's own tasks; they only forward into this stream.
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut builder = ClientBuilder::new(url.as_str());
        for kind in EventKind::ALL {
            let tx = tx.clone();
            builder = builder.on(kind.wire_name(), move |payload: Payload, _: Client| {
                let _ = tx.send(SocketMessage::Event(kind, payload));
                async {}.boxed()
            });
        }
        let close_tx = tx.clone();
        builder = builder.on("close", move |_: Payload, _: Client| {
            let _ = close_tx.send(SocketMessage::Closed);
            async {}.boxed()
        });
        builder = builder.on("error", move |payload: Payload, _: Client| {
            let _ = tx.send(SocketMessage::Failed(format!("{payload:?}")));
            async {}.boxed()
        });

        let client = builder
            .connect()
            .await
            .map_err(|err| ChannelError::Transport(err.to_string()))?;
        let _connection = Disconnect(Some(client));
        sink.state_changed(ChannelState::Connected);

        while let Some(message) = rx.recv().await {
            match message {
                SocketMessage::Event(kind, payload) => {
                    let Some(value) = payload_json(payload) else {
                        engine_warn!("Skipping {} with a non-JSON payload", kind);
                        continue;
                    };
                    match decode_json(kind.wire_name(), value) {
                        Ok(event) => sink.emit(event),
                        Err(err) => engine_warn!("Skipping push event: {}", err),
                    }
                }
                SocketMessage::Closed => return Ok(()),
                SocketMessage::Failed(reason) => return Err(ChannelError::Transport(reason)),
            }
        }
        Ok(())
    }
}

/// The first argument of a text payload; events sent without one read as `null`.
pub(crate) fn payload_json(payload: Payload) -> Option<Value> {
    match payload {
        Payload::Text(mut values) => Some(if values.is_empty() {
            Value::Null
        } else {
            values.swap_remove(0)
        }),
        _ => None,
    }
}

/// Closes the socket when the stream ends or is cancelled.
struct Disconnect(Option<Client>);

impl Drop for Disconnect {
    fn drop(&mut self) {
        let Some(client) = self.0.take() else {
            return;
        };
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(async move {
                if let Err(err) = client.disconnect().await {
                    engine_debug!("Socket disconnect failed: {}", err);
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_payload_yields_first_argument() {
        let payload = Payload::Text(vec![json!({ "current": 1 }), json!("extra")]);
        assert_eq!(payload_json(payload), Some(json!({ "current": 1 })));
    }

    #[test]
    fn empty_text_payload_is_null() {
        assert_eq!(payload_json(Payload::Text(Vec::new())), Some(Value::Null));
    }

    #[test]
    fn binary_payload_is_not_json() {
        assert_eq!(payload_json(Payload::Binary(vec![1, 2, 3].into())), None);
    }

    #[tokio::test]
    async fn malformed_base_url_is_reported() {
        struct Ignore;
        impl EventSink for Ignore {
            fn emit(&self, _event: crate::ChannelEvent) {}
            fn state_changed(&self, _state: ChannelState) {}
        }

        let source = SocketIoEventSource::new(EngineSettings {
            base_url: "not a url".to_string(),
            ..EngineSettings::default()
        });
        let err = source.stream(&Ignore).await.unwrap_err();
        assert!(matches!(err, ChannelError::InvalidBaseUrl(_)));
    }
}
