use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_error, engine_info};

use crate::{
    ArtifactStore, ChannelEvent, ChannelState, ChannelTransport, ControlClient, ControlError,
    EngineEvent, EngineSettings, EventChannelClient, EventSink, EventSource, Generation, HttpArtifactStore,
    HttpControlClient, RetrieveError, SocketIoEventSource, SseEventSource,
};

enum EngineCommand {
    Start { generation: Generation, url: String },
    Stop { generation: Generation, job_id: String },
    Retrieve { filename: String },
    ListArtifacts,
    Shutdown,
}

/// The collaborators the engine drives. Swapped for fakes in tests.
#[derive(Clone)]
pub struct EngineParts {
    pub control: Arc<dyn ControlClient>,
    pub events: Arc<dyn EventSource>,
    pub artifacts: Arc<dyn ArtifactStore>,
}

impl EngineParts {
    pub fn http(settings: &EngineSettings) -> Result<Self, ControlError> {
        Ok(Self {
            control: Arc::new(HttpControlClient::new(settings.clone())?),
            events: match settings.transport {
                ChannelTransport::SocketIo => Arc::new(SocketIoEventSource::new(settings.clone())),
                ChannelTransport::Sse => Arc::new(SseEventSource::new(settings.clone())?),
            },
            artifacts: Arc::new(HttpArtifactStore::new(settings.clone())?),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("could not start engine runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error(transparent)]
    Client(#[from] ControlError),
}

/// Runs all network IO on a dedicated thread and reports back as [`EngineEvent`]s.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    /// Used to answer commands the engine thread can no longer take.
    event_tx: mpsc::Sender<EngineEvent>,
    worker: Option<thread::JoinHandle<()>>,
}

/// Receiving side of the engine. Events arrive in the order they were produced.
pub struct EngineEvents {
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineEvents {
    /// Blocks until the next event; `None` once the engine has shut down.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }
}

impl EngineHandle {
    pub fn new(settings: EngineSettings) -> Result<(Self, EngineEvents), EngineError> {
        let parts = EngineParts::http(&settings)?;
        Self::with_parts(settings, parts)
    }

    /// Builds the runtime, spawns the engine thread and opens the push channel subscription.
    pub fn with_parts(
        settings: EngineSettings,
        parts: EngineParts,
    ) -> Result<(Self, EngineEvents), EngineError> {
        let runtime = tokio::runtime::Runtime::new()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        let worker_tx = event_tx.clone();
        let worker =
            thread::spawn(move || run_engine(runtime, settings, parts, cmd_rx, worker_tx));

        Ok((
            Self {
                cmd_tx,
                event_tx,
                worker: Some(worker),
            },
            EngineEvents { event_rx },
        ))
    }

    /// Arms the fence for `generation` and submits the URL.
    pub fn start_job(&self, generation: Generation, url: impl Into<String>) {
        let command = EngineCommand::Start {
            generation,
            url: url.into(),
        };
        self.submit(command);
    }

    pub fn stop_job(&self, generation: Generation, job_id: impl Into<String>) {
        self.submit(EngineCommand::Stop {
            generation,
            job_id: job_id.into(),
        });
    }

    pub fn retrieve(&self, filename: impl Into<String>) {
        self.submit(EngineCommand::Retrieve {
            filename: filename.into(),
        });
    }

    pub fn list_artifacts(&self) {
        self.submit(EngineCommand::ListArtifacts);
    }

    /// Sends a command; if the engine thread is gone, answers it with a failure instead.
    fn submit(&self, command: EngineCommand) {
        let Err(mpsc::SendError(command)) = self.cmd_tx.send(command) else {
            return;
        };
        engine_error!("Engine thread is not running; failing command");
        let gone = || ControlError::Transport("engine is not running".to_string());
        let event = match command {
            EngineCommand::Start { generation, .. } => EngineEvent::StartResolved {
                generation,
                result: Err(gone()),
            },
            EngineCommand::Stop { generation, .. } => EngineEvent::StopResolved {
                generation,
                result: Err(gone()),
            },
            EngineCommand::Retrieve { filename } => EngineEvent::ArtifactRetrieved {
                filename,
                result: Err(RetrieveError::Request(gone())),
            },
            EngineCommand::ListArtifacts => EngineEvent::ArtifactsListed(Err(gone())),
            EngineCommand::Shutdown => return,
        };
        let _ = self.event_tx.send(event);
    }

    /// Closes the push channel and waits for the engine thread to exit.
    pub fn shutdown(mut self) {
        let _ = self.cmd_tx.send(EngineCommand::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(EngineCommand::Shutdown);
    }
}

fn run_engine(
    runtime: tokio::runtime::Runtime,
    settings: EngineSettings,
    parts: EngineParts,
    cmd_rx: mpsc::Receiver<EngineCommand>,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let fence = Arc::new(AtomicU64::new(0));
    let sink = Arc::new(FencedSink {
        tx: event_tx.clone(),
        fence: fence.clone(),
    });
    let mut subscription = {
        let _guard = runtime.enter();
        EventChannelClient::open(parts.events.clone(), sink, settings.reconnect_delay)
    };

    while let Ok(command) = cmd_rx.recv() {
        let event_tx = event_tx.clone();
        match command {
            EngineCommand::Start { generation, url } => {
                // Anything received from here on belongs to the new session.
                fence.store(generation, Ordering::SeqCst);
                engine_info!("Starting job for generation {}", generation);
                let control = parts.control.clone();
                runtime.spawn(async move {
                    let result = control
                        .start(&url)
                        .await
                        .map(|id| id.unwrap_or_else(|| format!("local-{generation}")));
                    let _ = event_tx.send(EngineEvent::StartResolved { generation, result });
                });
            }
            EngineCommand::Stop { generation, job_id } => {
                let control = parts.control.clone();
                runtime.spawn(async move {
                    let result = control.stop(&job_id).await;
                    let _ = event_tx.send(EngineEvent::StopResolved { generation, result });
                });
            }
            EngineCommand::Retrieve { filename } => {
                let artifacts = parts.artifacts.clone();
                runtime.spawn(async move {
                    let result = artifacts.retrieve(&filename).await;
                    let _ = event_tx.send(EngineEvent::ArtifactRetrieved { filename, result });
                });
            }
            EngineCommand::ListArtifacts => {
                let artifacts = parts.artifacts.clone();
                runtime.spawn(async move {
                    let result = artifacts.list().await;
                    let _ = event_tx.send(EngineEvent::ArtifactsListed(result));
                });
            }
            EngineCommand::Shutdown => break,
        }
    }

    subscription.close();
    runtime.shutdown_timeout(Duration::from_secs(1));
    engine_info!("Engine stopped");
}

/// Stamps each notification with the generation armed when it was received.
struct FencedSink {
    tx: mpsc::Sender<EngineEvent>,
    fence: Arc<AtomicU64>,
}

impl EventSink for FencedSink {
    fn emit(&self, event: ChannelEvent) {
        let generation = self.fence.load(Ordering::SeqCst);
        let _ = self.tx.send(EngineEvent::Channel { generation, event });
    }

    fn state_changed(&self, state: ChannelState) {
        let _ = self.tx.send(EngineEvent::ChannelState(state));
    }
}
