use chrono::Utc;
use tokio::sync::broadcast;
use tokio::sync::mpsc;
use tokio::sync::oneshot;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use recap_proto::ContextId;
use recap_proto::Envelope;
use recap_proto::HostEvent;
use recap_proto::PanelEvent;
use recap_proto::SessionSnapshot;

use crate::config::ControllerConfig;
use crate::error::ControllerError;
use crate::session::Session;
use crate::spawner::HostHandle;
use crate::spawner::HostSpawner;

enum ControllerCommand {
    StartRecording {
        reply: oneshot::Sender<Result<ContextId, ControllerError>>,
    },
    StopRecording {
        reply: oneshot::Sender<()>,
    },
    GetRecordingState {
        reply: oneshot::Sender<SessionSnapshot>,
    },
}

/// Client-side facade over the controller task.
///
/// Cheap to clone; an ephemeral panel grabs one, drives the session, and
/// drops it without affecting the session itself.
#[derive(Clone)]
pub struct ControllerHandle {
    commands: mpsc::Sender<ControllerCommand>,
    panel: broadcast::Sender<PanelEvent>,
}

impl ControllerHandle {
    /// Requests a new session. Resolves as soon as the spawn is accepted;
    /// streaming confirmation arrives asynchronously as a panel event.
    pub async fn start_recording(&self) -> Result<ContextId, ControllerError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(ControllerCommand::StartRecording { reply })
            .await
            .map_err(|_| ControllerError::Unavailable)?;
        rx.await.map_err(|_| ControllerError::Unavailable)?
    }

    /// Requests a stop. Best-effort and idempotent; the session returns to
    /// idle only once a terminal event is observed.
    pub async fn stop_recording(&self) -> Result<(), ControllerError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(ControllerCommand::StopRecording { reply })
            .await
            .map_err(|_| ControllerError::Unavailable)?;
        rx.await.map_err(|_| ControllerError::Unavailable)
    }

    /// Read-only snapshot of the session.
    pub async fn recording_state(&self) -> Result<SessionSnapshot, ControllerError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(ControllerCommand::GetRecordingState { reply })
            .await
            .map_err(|_| ControllerError::Unavailable)?;
        rx.await.map_err(|_| ControllerError::Unavailable)
    }

    /// Subscribes to the status events the controller relays to panels.
    pub fn subscribe(&self) -> broadcast::Receiver<PanelEvent> {
        self.panel.subscribe()
    }
}

struct Controller<S: HostSpawner> {
    session: Session,
    spawner: S,
    live_host: Option<HostHandle>,
    /// Next arena index; counts every context ever spawned.
    next_context: u64,
    events_tx: mpsc::Sender<Envelope>,
    panel_tx: broadcast::Sender<PanelEvent>,
}

/// Starts the controller context and returns its handle.
pub fn start_controller<S: HostSpawner>(spawner: S, config: &ControllerConfig) -> ControllerHandle {
    let (commands_tx, commands_rx) = mpsc::channel(config.command_capacity);
    let (events_tx, events_rx) = mpsc::channel(config.event_capacity);
    let (panel_tx, _) = broadcast::channel(config.event_capacity);

    let controller = Controller {
        session: Session::new(),
        spawner,
        live_host: None,
        next_context: 0,
        events_tx,
        panel_tx: panel_tx.clone(),
    };
    tokio::spawn(controller.run(commands_rx, events_rx));

    ControllerHandle {
        commands: commands_tx,
        panel: panel_tx,
    }
}

impl<S: HostSpawner> Controller<S> {
    async fn run(
        mut self,
        mut commands: mpsc::Receiver<ControllerCommand>,
        mut events: mpsc::Receiver<Envelope>,
    ) {
        loop {
            tokio::select! {
                // Host events first: a queued terminal event must finish a
                // session before the next command is judged against it.
                biased;
                Some(envelope) = events.recv() => self.handle_event(envelope),
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    // Every handle is gone; shut the controller down.
                    None => break,
                },
            }
        }

        if let Some(host) = self.live_host.take() {
            warn!(context = %host.id(), "controller shutting down with a live session");
            host.destroy();
        }
    }

    fn handle_command(&mut self, command: ControllerCommand) {
        match command {
            ControllerCommand::StartRecording { reply } => {
                let _ = reply.send(self.handle_start());
            }
            ControllerCommand::StopRecording { reply } => {
                self.handle_stop();
                let _ = reply.send(());
            }
            ControllerCommand::GetRecordingState { reply } => {
                let _ = reply.send(self.session.snapshot());
            }
        }
    }

    fn handle_start(&mut self) -> Result<ContextId, ControllerError> {
        if !self.session.is_idle() {
            return Err(ControllerError::AlreadyActive {
                status: self.session.status(),
            });
        }

        let id = ContextId::new(self.next_context);
        self.next_context += 1;

        let handle = self
            .spawner
            .spawn(id, self.events_tx.clone())
            .map_err(|e| {
                warn!(error = %e, "capture host spawn failed");
                ControllerError::SpawnFailed {
                    reason: e.to_string(),
                }
            })?;

        self.live_host = Some(handle);
        self.session.begin_initializing(id);
        info!(
            context = %id,
            recording = ?self.session.recording_id(),
            "capture host spawned"
        );
        Ok(id)
    }

    fn handle_stop(&mut self) {
        match &self.live_host {
            Some(host) => {
                debug!(context = %host.id(), "relaying stop to capture host");
                host.request_stop();
            }
            None => debug!("stop requested with no active session"),
        }
    }

    fn handle_event(&mut self, envelope: Envelope) {
        let Envelope { from, event } = envelope;
        // The only defense against the stale/fresh context race: every
        // inbound event is checked against the live host id.
        if !self.session.is_host(from) {
            warn!(from = %from, event = ?event, "discarding event from stale context");
            return;
        }

        match event {
            HostEvent::StreamReady => {
                let started_at = Utc::now();
                if self.session.mark_streaming(started_at) {
                    info!(context = %from, "recording started");
                    self.publish(PanelEvent::RecordingStarted { started_at });
                }
            }
            HostEvent::RecordingProgress { size } => {
                self.publish(PanelEvent::RecordingProgress { size });
            }
            HostEvent::ProcessingStart => {
                self.session.mark_finalizing();
                self.publish(PanelEvent::ProcessingStart);
            }
            HostEvent::ProcessingComplete { size } => {
                self.session.mark_saving();
                self.publish(PanelEvent::ProcessingComplete { size });
            }
            HostEvent::StreamError { error } => {
                // No artifact exists yet; tear the context down right away.
                error!(context = %from, error = %error, "capture setup failed");
                self.finish_session();
                self.publish(PanelEvent::StreamError { error });
            }
            HostEvent::ProcessingError { error } => {
                error!(context = %from, error = %error, "finalize failed, artifact lost");
                self.finish_session();
                self.publish(PanelEvent::ProcessingError { error });
            }
            HostEvent::SavingComplete { message } => {
                info!(context = %from, "session complete");
                self.finish_session();
                self.publish(PanelEvent::SavingComplete { message });
            }
            HostEvent::SavingError { error } => {
                error!(context = %from, error = %error, "saving failed");
                self.finish_session();
                self.publish(PanelEvent::SavingError { error });
            }
        }
    }

    /// Unconditional terminal cleanup: destroy the host context and return
    /// to idle, regardless of which terminal outcome occurred.
    fn finish_session(&mut self) {
        if let Some(host) = self.live_host.take() {
            host.destroy();
        }
        self.session.reset();
    }

    fn publish(&self, event: PanelEvent) {
        // No panel listening is fine; panels are ephemeral.
        let _ = self.panel_tx.send(event);
    }
}
