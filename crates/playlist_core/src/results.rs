use std::collections::HashSet;

/// An item the runner finished and can serve by `filename`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedItem {
    pub filename: String,
    pub title: String,
}

/// Completed items in arrival order plus the failed list from the final report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultAggregator {
    completed: Vec<CompletedItem>,
    failed: Vec<String>,
}

impl ResultAggregator {
    pub fn completed(&self) -> &[CompletedItem] {
        &self.completed
    }

    pub fn failed(&self) -> &[String] {
        &self.failed
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.completed.iter().any(|item| item.filename == filename)
    }

    /// Distinct filenames; duplicates reported by the runner collapse here.
    pub fn filenames(&self) -> HashSet<&str> {
        self.completed
            .iter()
            .map(|item| item.filename.as_str())
            .collect()
    }

    pub(crate) fn push_completed(&mut self, item: CompletedItem) {
        self.completed.push(item);
    }

    pub(crate) fn set_failed(&mut self, failed: Vec<String>) {
        self.failed = failed;
    }

    pub(crate) fn reset(&mut self) {
        self.completed.clear();
        self.failed.clear();
    }
}
