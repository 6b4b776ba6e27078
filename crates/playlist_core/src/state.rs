use engine_logging::{engine_debug, engine_info, engine_warn};

use crate::progress::ProgressModel;
use crate::view_model::{AppViewModel, CompletedRowView};
use crate::{
    ChannelStatus, Generation, JobEvent, JobId, ResultAggregator, Selection, Session,
    SessionOutcome, SessionStatus,
};

/// Everything the coordinator knows about the current (or last) job.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    input: String,
    session: Session,
    progress: ProgressModel,
    results: ResultAggregator,
    selection: Selection,
    channel: ChannelStatus,
    last_notice: Option<String>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn status(&self) -> SessionStatus {
        self.session.status()
    }

    pub fn results(&self) -> &ResultAggregator {
        &self.results
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn view(&self) -> AppViewModel {
        let status = self.session.status();
        AppViewModel {
            input: self.input.clone(),
            status,
            job_id: self.session.job_id().cloned(),
            generation: self.session.generation(),
            error: self.session.error().map(ToOwned::to_owned),
            outcome: self.session.outcome(),
            progress: self.progress.snapshot().cloned(),
            batch: self.progress.batch().cloned(),
            completed: self
                .results
                .completed()
                .iter()
                .map(|item| CompletedRowView {
                    filename: item.filename.clone(),
                    title: item.title.clone(),
                    selected: self.selection.contains(&item.filename),
                })
                .collect(),
            failed: self.results.failed().to_vec(),
            selected_count: self.selection.len(),
            all_selected: self.selection.covers(&self.results),
            channel: self.channel.clone(),
            can_start: status == SessionStatus::Idle && !self.input.trim().is_empty(),
            can_stop: status == SessionStatus::Active && self.session.job_id().is_some(),
            last_notice: self.last_notice.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_input(&mut self, input: String) {
        if self.input != input {
            self.input = input;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_notice(&mut self, notice: impl Into<String>) {
        self.last_notice = Some(notice.into());
        self.mark_dirty();
    }

    pub(crate) fn set_channel(&mut self, channel: ChannelStatus) {
        if self.channel != channel {
            self.channel = channel;
            self.mark_dirty();
        }
    }

    pub(crate) fn selection_mut(&mut self) -> (&mut Selection, &ResultAggregator) {
        (&mut self.selection, &self.results)
    }

    /// Idle -> Starting. Wipes everything belonging to the previous job.
    pub(crate) fn start_session(&mut self) -> Generation {
        let generation = self.session.begin();
        self.progress.clear();
        self.results.reset();
        self.selection.clear();
        self.last_notice = None;
        self.mark_dirty();
        engine_info!("Session generation {} starting", generation);
        generation
    }

    /// Starting -> Active once the runner hands back a job id.
    pub(crate) fn apply_start_resolved(
        &mut self,
        generation: Generation,
        result: Result<JobId, String>,
    ) {
        if generation != self.session.generation() || self.status() != SessionStatus::Starting {
            engine_debug!(
                "Dropping start response for generation {} (current {}, status {:?})",
                generation,
                self.session.generation(),
                self.status()
            );
            return;
        }
        match result {
            Ok(job_id) => {
                engine_info!("Job {} active (generation {})", job_id, generation);
                self.session.activate(job_id);
            }
            Err(message) => {
                engine_warn!("Start failed (generation {}): {}", generation, message);
                self.progress.clear();
                self.session.abort(message);
            }
        }
        self.mark_dirty();
    }

    /// Active -> Stopping. The runner confirms with a `stopped` event.
    pub(crate) fn request_stop(&mut self) -> Option<(Generation, JobId)> {
        if self.status() != SessionStatus::Active {
            return None;
        }
        let job_id = self.session.job_id()?.clone();
        self.session.request_stop();
        self.mark_dirty();
        engine_info!("Stop requested for job {}", job_id);
        Some((self.session.generation(), job_id))
    }

    pub(crate) fn apply_stop_resolved(&mut self, generation: Generation, result: Result<(), String>) {
        match result {
            Ok(()) => engine_debug!("Stop acknowledged (generation {})", generation),
            // The `stopped` event is authoritative; a failed request changes nothing.
            Err(message) => {
                engine_warn!("Stop request failed (generation {}): {}", generation, message);
                if generation == self.session.generation() {
                    self.set_notice(format!("Stop request failed: {message}"));
                }
            }
        }
    }

    /// Applies a fenced push notification. Stale or out-of-state events are dropped.
    pub(crate) fn apply_event(
        &mut self,
        generation: Generation,
        job_id: Option<&JobId>,
        event: JobEvent,
    ) {
        if !self.session.is_current(generation, job_id) {
            engine_debug!(
                "Dropping stale {} event (generation {}, current {})",
                event.kind(),
                generation,
                self.session.generation()
            );
            return;
        }

        let status = self.status();
        if !status.is_live() {
            engine_debug!("Dropping {} event while idle", event.kind());
            return;
        }

        match event {
            JobEvent::Progress(snapshot) => self.progress.apply_progress(snapshot),
            JobEvent::Status(batch) => self.progress.apply_status(batch),
            JobEvent::ItemCompleted(item) => {
                engine_info!("Item completed: {}", item.filename);
                self.results.push_completed(item);
            }
            JobEvent::Complete { failed } => {
                engine_info!(
                    "Job complete: {} succeeded, {} failed",
                    self.results.completed().len(),
                    failed.len()
                );
                self.progress.clear();
                self.results.set_failed(failed);
                self.session.finish(SessionOutcome::Completed, None);
            }
            JobEvent::Error { message } => {
                engine_warn!("Job error: {}", message);
                self.progress.clear();
                self.session.finish(SessionOutcome::Failed, Some(message));
            }
            JobEvent::Stopped => {
                engine_info!("Job stopped");
                self.progress.clear();
                self.session.finish(SessionOutcome::Stopped, None);
            }
        }
        self.mark_dirty();
    }
}
