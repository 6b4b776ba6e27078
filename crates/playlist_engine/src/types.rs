use std::path::PathBuf;

use crate::{ArtifactEntry, ChannelEvent, ControlError, RetrieveError};

/// Session generation the coordinator was on when something was requested or received.
pub type Generation = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelState {
    Connected,
    Disconnected { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// A push notification stamped with the generation armed at receipt.
    Channel {
        generation: Generation,
        event: ChannelEvent,
    },
    ChannelState(ChannelState),
    StartResolved {
        generation: Generation,
        result: Result<String, ControlError>,
    },
    StopResolved {
        generation: Generation,
        result: Result<(), ControlError>,
    },
    ArtifactRetrieved {
        filename: String,
        result: Result<PathBuf, RetrieveError>,
    },
    ArtifactsListed(Result<Vec<ArtifactEntry>, ControlError>),
}
