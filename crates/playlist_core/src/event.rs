use crate::{BatchStatus, CompletedItem, ProgressSnapshot};

/// The six push notifications a job emits, already decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobEvent {
    Progress(ProgressSnapshot),
    Status(BatchStatus),
    ItemCompleted(CompletedItem),
    Complete { failed: Vec<String> },
    Error { message: String },
    Stopped,
}

impl JobEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            JobEvent::Progress(_) => "progress",
            JobEvent::Status(_) => "status",
            JobEvent::ItemCompleted(_) => "item_completed",
            JobEvent::Complete { .. } => "complete",
            JobEvent::Error { .. } => "error",
            JobEvent::Stopped => "stopped",
        }
    }
}

/// Connection state of the push channel, for display only.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ChannelStatus {
    #[default]
    Connecting,
    Connected,
    Disconnected { reason: String },
}
