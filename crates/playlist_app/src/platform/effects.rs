use std::sync::mpsc;
use std::thread;

use anyhow::Context;
use engine_logging::{engine_debug, engine_info};
use playlist_core::{
    BatchStatus, ChannelStatus, CompletedItem, Effect, JobEvent, JobId, Msg, ProgressSnapshot,
    TransferPhase,
};
use playlist_engine::{
    ChannelEvent, ChannelState, EngineEvent, EngineHandle, EngineSettings, TransferStatus,
};

use super::app::Inbox;

/// Executes coordinator effects on the engine and feeds its results back as messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(settings: EngineSettings, inbox: mpsc::Sender<Inbox>) -> anyhow::Result<Self> {
        engine_info!("Connecting to job runner at {}", settings.base_url);
        let (engine, events) = EngineHandle::new(settings).context("starting engine")?;
        thread::spawn(move || {
            while let Some(event) = events.recv() {
                if inbox.send(map_engine_event(event)).is_err() {
                    break;
                }
            }
        });
        Ok(Self { engine })
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartJob { generation, url } => {
                    engine_info!("StartJob generation={} url={}", generation, url);
                    self.engine.start_job(generation, url);
                }
                Effect::StopJob { generation, job_id } => {
                    engine_info!("StopJob generation={} job_id={}", generation, job_id);
                    self.engine.stop_job(generation, job_id.as_str());
                }
                Effect::RetrieveArtifact { filename } => {
                    engine_debug!("RetrieveArtifact {}", filename);
                    self.engine.retrieve(filename);
                }
            }
        }
    }

    pub fn list_artifacts(&self) {
        self.engine.list_artifacts();
    }

    pub fn shutdown(self) {
        self.engine.shutdown();
    }
}

fn map_engine_event(event: EngineEvent) -> Inbox {
    let msg = match event {
        EngineEvent::Channel { generation, event } => Msg::Channel {
            generation,
            job_id: event.job_id().map(JobId::new),
            event: map_channel_event(event),
        },
        EngineEvent::ChannelState(state) => Msg::ChannelChanged(match state {
            ChannelState::Connected => ChannelStatus::Connected,
            ChannelState::Disconnected { reason } => ChannelStatus::Disconnected { reason },
        }),
        EngineEvent::StartResolved { generation, result } => Msg::StartResolved {
            generation,
            result: result.map(JobId::new).map_err(|err| err.to_string()),
        },
        EngineEvent::StopResolved { generation, result } => Msg::StopResolved {
            generation,
            result: result.map_err(|err| err.to_string()),
        },
        EngineEvent::ArtifactRetrieved { filename, result } => Msg::ArtifactRetrieved {
            filename,
            result: result
                .map(|path| path.display().to_string())
                .map_err(|err| err.to_string()),
        },
        EngineEvent::ArtifactsListed(result) => {
            return Inbox::Files(result.map_err(|err| err.to_string()));
        }
    };
    Inbox::Ui(msg)
}

fn map_channel_event(event: ChannelEvent) -> JobEvent {
    match event {
        ChannelEvent::Progress(progress) => JobEvent::Progress(ProgressSnapshot {
            downloaded_bytes: progress.downloaded_bytes,
            total_bytes: progress.total_bytes,
            speed_bytes_per_sec: progress.speed,
            eta_seconds: progress.eta,
            phase: match progress.status {
                TransferStatus::Downloading => TransferPhase::Downloading,
                TransferStatus::Finished => TransferPhase::Finished,
            },
        }),
        ChannelEvent::Status(status) => JobEvent::Status(BatchStatus {
            current_index: status.current,
            total_count: status.total,
            current_title: status.title,
        }),
        ChannelEvent::ItemCompleted(item) => JobEvent::ItemCompleted(CompletedItem {
            filename: item.filename,
            title: item.title,
        }),
        ChannelEvent::Complete(complete) => JobEvent::Complete {
            failed: complete.failed,
        },
        ChannelEvent::Error(error) => JobEvent::Error {
            message: error.error,
        },
        ChannelEvent::Stopped(_) => JobEvent::Stopped,
    }
}
