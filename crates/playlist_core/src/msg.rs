use crate::{ChannelStatus, Generation, JobEvent, JobId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the playlist URL input.
    InputChanged(String),
    /// User submitted the current URL input.
    UrlSubmitted,
    /// User clicked Stop.
    StopClicked,
    /// The start control request finished.
    StartResolved {
        generation: Generation,
        result: Result<JobId, String>,
    },
    /// The stop control request finished. Informational only.
    StopResolved {
        generation: Generation,
        result: Result<(), String>,
    },
    /// A push notification, stamped with the generation it was received under.
    Channel {
        generation: Generation,
        job_id: Option<JobId>,
        event: JobEvent,
    },
    /// The push channel connected or dropped.
    ChannelChanged(ChannelStatus),
    /// User ticked or unticked a completed item.
    ItemToggled { filename: String },
    /// User clicked the Select All / Deselect All button.
    SelectAllToggled,
    /// User clicked Download Selected.
    ExportSelectedClicked,
    /// User asked for a single completed item.
    RetrieveClicked { filename: String },
    /// An artifact retrieval finished.
    ArtifactRetrieved {
        filename: String,
        result: Result<String, String>,
    },
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
