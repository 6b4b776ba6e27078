use std::collections::BTreeSet;

use crate::{Effect, ResultAggregator};

/// Filenames the user picked for export. Always a subset of the completed items.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    selected: BTreeSet<String>,
}

impl Selection {
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.selected.contains(filename)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(String::as_str)
    }

    /// Flips membership. Filenames not in `results` are ignored.
    pub fn toggle(&mut self, filename: &str, results: &ResultAggregator) -> bool {
        if !results.contains(filename) {
            return false;
        }
        if !self.selected.remove(filename) {
            self.selected.insert(filename.to_string());
        }
        true
    }

    pub fn select_all(&mut self, results: &ResultAggregator) {
        self.selected = results
            .filenames()
            .into_iter()
            .map(ToOwned::to_owned)
            .collect();
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// True when every distinct completed filename is selected.
    pub fn covers(&self, results: &ResultAggregator) -> bool {
        let all = results.filenames();
        !all.is_empty() && self.selected.len() == all.len()
    }

    /// One retrieval per selected filename; the selection itself is untouched.
    pub fn export_selected(&self) -> Vec<Effect> {
        self.selected
            .iter()
            .map(|filename| Effect::RetrieveArtifact {
                filename: filename.clone(),
            })
            .collect()
    }
}
