use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use recap_capture::CaptureHost;
use recap_capture::ChunkEncoder;
use recap_capture::MediaProvider;
use recap_proto::ContextId;
use recap_proto::Envelope;
use recap_proto::HostCommand;
use recap_store::SaveManager;

use crate::config::ControllerConfig;

const CONTROL_CAPACITY: usize = 4;

/// Context creation was denied by the platform.
#[derive(Debug, Error)]
#[error("context creation denied: {reason}")]
pub struct SpawnError {
    pub reason: String,
}

impl SpawnError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Creates isolated capture-host contexts.
///
/// The seam between the controller and the platform: production spawns a
/// capture-host task, tests substitute a scripted implementation.
pub trait HostSpawner: Send + 'static {
    fn spawn(
        &mut self,
        id: ContextId,
        events: mpsc::Sender<Envelope>,
    ) -> Result<HostHandle, SpawnError>;
}

/// The controller's grip on a live capture-host context.
pub struct HostHandle {
    id: ContextId,
    control: mpsc::Sender<HostCommand>,
    task: JoinHandle<()>,
}

impl HostHandle {
    pub fn new(id: ContextId, control: mpsc::Sender<HostCommand>, task: JoinHandle<()>) -> Self {
        Self { id, control, task }
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    /// Relays a stop instruction. Best-effort and non-blocking: a full or
    /// closed queue means the host is already finalizing or gone.
    pub fn request_stop(&self) {
        let _ = self.control.try_send(HostCommand::Stop);
    }

    /// Tears the context down. Only called on terminal events, so no
    /// artifact can still be mid-write when the task is aborted.
    pub fn destroy(self) {
        debug!(context = %self.id, "destroying capture host context");
        self.task.abort();
    }
}

/// Production spawner: each context is a capture-host task wired to the
/// shared persistence manager.
pub struct CaptureSpawner {
    provider: Arc<dyn MediaProvider>,
    encoder: Arc<dyn ChunkEncoder>,
    store: Arc<SaveManager>,
    flush_interval: Duration,
    save_timeout: Duration,
}

impl CaptureSpawner {
    pub fn new(
        provider: Arc<dyn MediaProvider>,
        encoder: Arc<dyn ChunkEncoder>,
        store: Arc<SaveManager>,
        config: &ControllerConfig,
    ) -> Self {
        Self {
            provider,
            encoder,
            store,
            flush_interval: config.flush_interval,
            save_timeout: config.save_timeout,
        }
    }
}

impl HostSpawner for CaptureSpawner {
    fn spawn(
        &mut self,
        id: ContextId,
        events: mpsc::Sender<Envelope>,
    ) -> Result<HostHandle, SpawnError> {
        let (control_tx, control_rx) = mpsc::channel(CONTROL_CAPACITY);
        let host = CaptureHost::new(
            id,
            Arc::clone(&self.provider),
            Arc::clone(&self.encoder),
            Arc::clone(&self.store),
            events,
            self.flush_interval,
            self.save_timeout,
        );
        let task = tokio::spawn(host.run(control_rx));
        Ok(HostHandle::new(id, control_tx, task))
    }
}
