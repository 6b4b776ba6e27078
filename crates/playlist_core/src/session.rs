use std::fmt;

/// Monotonic fencing token; bumped on every accepted start.
pub type Generation = u64;

/// Opaque job identifier assigned by the job runner.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobId(String);

impl JobId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    Idle,
    Starting,
    Active,
    /// Stop requested; events keep applying until `stopped` arrives.
    Stopping,
}

impl SessionStatus {
    /// A job is in flight (or about to be).
    pub fn is_live(self) -> bool {
        !matches!(self, SessionStatus::Idle)
    }
}

/// How the most recent session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The runner reported `complete` (the Done state).
    Completed,
    Stopped,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    status: SessionStatus,
    job_id: Option<JobId>,
    error: Option<String>,
    generation: Generation,
    outcome: Option<SessionOutcome>,
}

impl Session {
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn job_id(&self) -> Option<&JobId> {
        self.job_id.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn outcome(&self) -> Option<SessionOutcome> {
        self.outcome
    }

    /// Idle -> Starting. Returns the generation of the new session.
    pub(crate) fn begin(&mut self) -> Generation {
        self.generation += 1;
        self.status = SessionStatus::Starting;
        self.job_id = None;
        self.error = None;
        self.outcome = None;
        self.generation
    }

    pub(crate) fn activate(&mut self, job_id: JobId) {
        self.status = SessionStatus::Active;
        self.job_id = Some(job_id);
    }

    pub(crate) fn request_stop(&mut self) {
        self.status = SessionStatus::Stopping;
    }

    /// Start request failed before any job existed.
    pub(crate) fn abort(&mut self, message: String) {
        self.status = SessionStatus::Idle;
        self.job_id = None;
        self.error = Some(message);
    }

    pub(crate) fn finish(&mut self, outcome: SessionOutcome, error: Option<String>) {
        self.status = SessionStatus::Idle;
        self.job_id = None;
        self.outcome = Some(outcome);
        if error.is_some() {
            self.error = error;
        }
    }

    /// Fencing check for anything produced on behalf of a session.
    ///
    /// An explicit job id, when both sides have one, must match as well.
    pub(crate) fn is_current(&self, generation: Generation, job_id: Option<&JobId>) -> bool {
        if generation != self.generation {
            return false;
        }
        match (job_id, self.job_id.as_ref()) {
            (Some(incoming), Some(ours)) => incoming == ours,
            _ => true,
        }
    }
}
