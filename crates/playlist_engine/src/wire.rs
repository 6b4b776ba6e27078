use std::fmt;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::SseFrame;

/// The six notification kinds the runner pushes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Progress,
    Status,
    ItemCompleted,
    Complete,
    Error,
    Stopped,
}

impl EventKind {
    pub const ALL: [EventKind; 6] = [
        EventKind::Progress,
        EventKind::Status,
        EventKind::ItemCompleted,
        EventKind::Complete,
        EventKind::Error,
        EventKind::Stopped,
    ];

    /// Event name as it appears on the wire.
    pub fn wire_name(self) -> &'static str {
        match self {
            EventKind::Progress => "download_progress",
            EventKind::Status => "download_status",
            EventKind::ItemCompleted => "video_completed",
            EventKind::Complete => "download_complete",
            EventKind::Error => "download_error",
            EventKind::Stopped => "download_stopped",
        }
    }

    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.wire_name() == name)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    Downloading,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProgressPayload {
    pub status: TransferStatus,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub downloaded_bytes: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub total_bytes: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub speed: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub eta: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub download_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatusPayload {
    pub current: u32,
    pub total: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub download_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ItemCompletedPayload {
    pub filename: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub download_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CompletePayload {
    #[serde(default)]
    pub failed: Vec<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub download_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorPayload {
    pub error: String,
    #[serde(default)]
    pub download_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct StoppedPayload {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub download_id: Option<String>,
}

/// A decoded push notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    Progress(ProgressPayload),
    Status(StatusPayload),
    ItemCompleted(ItemCompletedPayload),
    Complete(CompletePayload),
    Error(ErrorPayload),
    Stopped(StoppedPayload),
}

impl ChannelEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ChannelEvent::Progress(_) => EventKind::Progress,
            ChannelEvent::Status(_) => EventKind::Status,
            ChannelEvent::ItemCompleted(_) => EventKind::ItemCompleted,
            ChannelEvent::Complete(_) => EventKind::Complete,
            ChannelEvent::Error(_) => EventKind::Error,
            ChannelEvent::Stopped(_) => EventKind::Stopped,
        }
    }

    /// Explicit job correlation, when the runner included one.
    pub fn job_id(&self) -> Option<&str> {
        let id = match self {
            ChannelEvent::Progress(p) => &p.download_id,
            ChannelEvent::Status(p) => &p.download_id,
            ChannelEvent::ItemCompleted(p) => &p.download_id,
            ChannelEvent::Complete(p) => &p.download_id,
            ChannelEvent::Error(p) => &p.download_id,
            ChannelEvent::Stopped(p) => &p.download_id,
        };
        id.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("unknown event {0:?}")]
    UnknownEvent(String),
    #[error("bad {kind} payload: {message}")]
    Payload { kind: EventKind, message: String },
}

/// Maps an SSE frame onto one of the six typed events.
pub fn decode_frame(frame: &SseFrame) -> Result<ChannelEvent, DecodeError> {
    let name = frame.event.as_deref().unwrap_or("message");
    let kind =
        EventKind::from_wire(name).ok_or_else(|| DecodeError::UnknownEvent(name.to_string()))?;
    // `download_stopped` is often sent without a body.
    let value = match frame.data.trim() {
        "" => Value::Null,
        data => serde_json::from_str(data).map_err(|err| DecodeError::Payload {
            kind,
            message: err.to_string(),
        })?,
    };
    decode_payload(kind, value)
}

/// Maps an already parsed JSON payload onto a typed event, for transports
/// that deliver JSON values rather than text frames.
pub fn decode_json(name: &str, value: Value) -> Result<ChannelEvent, DecodeError> {
    let kind =
        EventKind::from_wire(name).ok_or_else(|| DecodeError::UnknownEvent(name.to_string()))?;
    decode_payload(kind, value)
}

fn decode_payload(kind: EventKind, value: Value) -> Result<ChannelEvent, DecodeError> {
    let value = match value {
        Value::Null => Value::Object(serde_json::Map::new()),
        value => value,
    };
    let payload_error = |err: serde_json::Error| DecodeError::Payload {
        kind,
        message: err.to_string(),
    };

    let event = match kind {
        EventKind::Progress => {
            ChannelEvent::Progress(serde_json::from_value(value).map_err(payload_error)?)
        }
        EventKind::Status => {
            ChannelEvent::Status(serde_json::from_value(value).map_err(payload_error)?)
        }
        EventKind::ItemCompleted => {
            ChannelEvent::ItemCompleted(serde_json::from_value(value).map_err(payload_error)?)
        }
        EventKind::Complete => {
            ChannelEvent::Complete(serde_json::from_value(value).map_err(payload_error)?)
        }
        EventKind::Error => {
            ChannelEvent::Error(serde_json::from_value(value).map_err(payload_error)?)
        }
        EventKind::Stopped => {
            ChannelEvent::Stopped(serde_json::from_value(value).map_err(payload_error)?)
        }
    };
    Ok(event)
}

/// Byte counts arrive as ints, floats or null; anything unusable becomes `None`.
fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(as_u64_lenient))
}

fn as_u64_lenient(value: &Value) -> Option<u64> {
    let Value::Number(number) = value else {
        return None;
    };
    number.as_u64().or_else(|| {
        number
            .as_f64()
            .filter(|f| f.is_finite() && *f >= 0.0)
            .map(|f| f as u64)
    })
}
