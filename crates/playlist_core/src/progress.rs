#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferPhase {
    #[default]
    Downloading,
    Finished,
}

/// Byte-level progress of the item currently being transferred.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgressSnapshot {
    pub downloaded_bytes: Option<u64>,
    pub total_bytes: Option<u64>,
    pub speed_bytes_per_sec: Option<u64>,
    pub eta_seconds: Option<u64>,
    pub phase: TransferPhase,
}

impl ProgressSnapshot {
    /// Completion percentage, when both byte counts are known and non-zero.
    pub fn percent(&self) -> Option<f64> {
        match (self.downloaded_bytes, self.total_bytes) {
            (Some(done), Some(total)) if total > 0 => {
                Some((done.min(total) as f64 / total as f64) * 100.0)
            }
            _ => None,
        }
    }
}

/// Which playlist entry the runner is working on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchStatus {
    pub current_index: u32,
    pub total_count: u32,
    pub current_title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct ProgressModel {
    snapshot: Option<ProgressSnapshot>,
    batch: Option<BatchStatus>,
}

impl ProgressModel {
    pub(crate) fn snapshot(&self) -> Option<&ProgressSnapshot> {
        self.snapshot.as_ref()
    }

    pub(crate) fn batch(&self) -> Option<&BatchStatus> {
        self.batch.as_ref()
    }

    /// Overwrites the snapshot; a `Finished` phase empties it instead.
    pub(crate) fn apply_progress(&mut self, snapshot: ProgressSnapshot) {
        self.snapshot = match snapshot.phase {
            TransferPhase::Downloading => Some(snapshot),
            TransferPhase::Finished => None,
        };
    }

    pub(crate) fn apply_status(&mut self, status: BatchStatus) {
        self.batch = Some(status);
    }

    pub(crate) fn clear(&mut self) {
        self.snapshot = None;
        self.batch = None;
    }
}
