//! Playlist engine: job runner clients and effect execution.
mod artifact;
mod channel;
mod client;
mod control;
mod engine;
mod filename;
mod persist;
mod socketio;
mod sse;
mod types;
mod wire;

pub use artifact::{ArtifactEntry, ArtifactStore, HttpArtifactStore, RetrieveError};
pub use channel::{
    ChannelError, EventChannelClient, EventSink, EventSource, SseEventSource, Subscription,
};
pub use client::{ChannelTransport, EngineSettings};
pub use control::{ControlClient, ControlError, HttpControlClient};
pub use engine::{EngineError, EngineEvents, EngineHandle, EngineParts};
pub use filename::local_artifact_name;
pub use persist::{ensure_output_dir, AtomicFileWriter, PendingFile, PersistError};
pub use socketio::SocketIoEventSource;
pub use sse::{SseFrame, SseParser, DEFAULT_MAX_LINE_BYTES};
pub use types::{ChannelState, EngineEvent, Generation};
pub use wire::{
    decode_frame, decode_json, ChannelEvent, CompletePayload, DecodeError, ErrorPayload, EventKind,
    ItemCompletedPayload, ProgressPayload, StatusPayload, StoppedPayload, TransferStatus,
};
