use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use recap_proto::ContextId;
use recap_proto::Envelope;
use recap_proto::ErrorKind;
use recap_proto::ErrorPayload;
use recap_proto::HostCommand;
use recap_proto::HostEvent;
use recap_store::SaveManager;

use crate::chunks::ChunkBuffer;
use crate::encoder::ChunkEncoder;
use crate::encoder::EncoderHandle;
use crate::error::CaptureError;
use crate::media::CombinedStream;
use crate::media::MediaProvider;

/// The capture-host context body.
///
/// Runs as its own task, reports every lifecycle event to the controller
/// tagged with its context id, and exits after emitting a terminal event.
pub struct CaptureHost {
    id: ContextId,
    provider: Arc<dyn MediaProvider>,
    encoder: Arc<dyn ChunkEncoder>,
    store: Arc<SaveManager>,
    events: mpsc::Sender<Envelope>,
    flush_interval: Duration,
    save_timeout: Duration,
}

impl CaptureHost {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: ContextId,
        provider: Arc<dyn MediaProvider>,
        encoder: Arc<dyn ChunkEncoder>,
        store: Arc<SaveManager>,
        events: mpsc::Sender<Envelope>,
        flush_interval: Duration,
        save_timeout: Duration,
    ) -> Self {
        Self {
            id,
            provider,
            encoder,
            store,
            events,
            flush_interval,
            save_timeout,
        }
    }

    /// Drives the whole capture lifecycle to a terminal event.
    pub async fn run(self, control: mpsc::Receiver<HostCommand>) {
        let (stream, encoder) = match self.initialize().await {
            Ok(pair) => pair,
            Err(e) => {
                error!(context = %self.id, error = %e, "capture setup failed");
                self.emit(HostEvent::StreamError {
                    error: ErrorPayload::new(ErrorKind::StreamDenied, e.to_string()),
                })
                .await;
                return;
            }
        };

        info!(context = %self.id, tracks = stream.tracks().len(), "stream ready");
        self.emit(HostEvent::StreamReady).await;

        let mut buffer = ChunkBuffer::new();
        let failure = self.capture(control, encoder, &mut buffer).await;

        if let Some(e) = failure {
            warn!(context = %self.id, error = %e, "finalize failed, artifact lost");
            self.emit(HostEvent::ProcessingError {
                error: ErrorPayload::new(ErrorKind::Processing, e.to_string()),
            })
            .await;
            stream.release();
            return;
        }

        self.emit(HostEvent::ProcessingStart).await;
        let artifact = buffer.into_artifact(Utc::now());
        let size = artifact.size();
        debug!(context = %self.id, size, file = artifact.filename(), "artifact assembled");
        self.emit(HostEvent::ProcessingComplete { size }).await;

        let event = match tokio::time::timeout(self.save_timeout, self.store.save(artifact)).await
        {
            Ok(Ok(receipt)) => HostEvent::SavingComplete {
                message: receipt.message,
            },
            Ok(Err(e)) => HostEvent::SavingError {
                error: ErrorPayload::from(&e),
            },
            Err(_) => HostEvent::SavingError {
                error: ErrorPayload::new(
                    ErrorKind::Timeout,
                    format!(
                        "saving did not finish within {}s",
                        self.save_timeout.as_secs()
                    ),
                ),
            },
        };
        self.emit(event).await;

        // Tracks stay attached until the terminal event is out: encoders
        // flush asynchronously and the artifact must be durably stored
        // before the stream goes away.
        stream.release();
    }

    async fn initialize(&self) -> Result<(CombinedStream, EncoderHandle), CaptureError> {
        debug!(context = %self.id, "requesting display capture");
        let display = self.provider.acquire_display().await?;
        debug!(context = %self.id, "requesting microphone capture");
        let microphone = self.provider.acquire_microphone().await?;

        let stream = CombinedStream::combine(display, microphone);
        let encoder = self.encoder.start(&stream, self.flush_interval)?;
        Ok((stream, encoder))
    }

    /// Buffers chunks until the encoder finishes flushing after a stop
    /// request (or fails). Returns the encoder failure, if any.
    async fn capture(
        &self,
        mut control: mpsc::Receiver<HostCommand>,
        mut encoder: EncoderHandle,
        buffer: &mut ChunkBuffer,
    ) -> Option<CaptureError> {
        let mut stopping = false;
        loop {
            tokio::select! {
                cmd = control.recv(), if !stopping => {
                    // A closed control channel means the controller is
                    // tearing us down; finalize in that case too.
                    if matches!(cmd, Some(HostCommand::Stop) | None) {
                        debug!(context = %self.id, "stop requested, finalizing");
                        encoder.signal_stop();
                        stopping = true;
                    }
                }
                item = encoder.next() => match item {
                    Some(Ok(chunk)) => {
                        if chunk.is_empty() {
                            continue;
                        }
                        let total = buffer.push(chunk);
                        self.emit(HostEvent::RecordingProgress { size: total }).await;
                    }
                    Some(Err(e)) => return Some(e),
                    None => return None,
                }
            }
        }
    }

    async fn emit(&self, event: HostEvent) {
        if self
            .events
            .send(Envelope::new(self.id, event))
            .await
            .is_err()
        {
            debug!(context = %self.id, "controller gone, dropping event");
        }
    }
}
