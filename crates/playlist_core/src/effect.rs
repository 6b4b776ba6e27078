use crate::{Generation, JobId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartJob { generation: Generation, url: String },
    StopJob { generation: Generation, job_id: JobId },
    RetrieveArtifact { filename: String },
}
