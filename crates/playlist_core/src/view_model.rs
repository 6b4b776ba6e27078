use crate::{
    BatchStatus, ChannelStatus, Generation, JobId, ProgressSnapshot, SessionOutcome,
    SessionStatus,
};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub input: String,
    pub status: SessionStatus,
    pub job_id: Option<JobId>,
    pub generation: Generation,
    pub error: Option<String>,
    pub outcome: Option<SessionOutcome>,
    pub progress: Option<ProgressSnapshot>,
    pub batch: Option<BatchStatus>,
    pub completed: Vec<CompletedRowView>,
    pub failed: Vec<String>,
    pub selected_count: usize,
    /// Drives the Select All / Deselect All label.
    pub all_selected: bool,
    pub channel: ChannelStatus,
    pub can_start: bool,
    pub can_stop: bool,
    pub last_notice: Option<String>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedRowView {
    pub filename: String,
    pub title: String,
    pub selected: bool,
}
