use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::oneshot;

use crate::chunks::Chunk;
use crate::error::CaptureError;
use crate::media::CombinedStream;

/// The chunked media encoder collaborator.
///
/// An implementation samples the stream and emits encoded chunks on the
/// flush cadence rather than only at the end, so progress is observable
/// while the recording runs.
pub trait ChunkEncoder: Send + Sync {
    fn start(
        &self,
        stream: &CombinedStream,
        flush_interval: Duration,
    ) -> Result<EncoderHandle, CaptureError>;
}

/// A running encoder: its chunk stream plus the stop signal.
///
/// Stopping is a request, not an immediate cessation. After `signal_stop`
/// the encoder may keep flushing buffered data; `next` keeps yielding until
/// the encoder closes the channel, which marks the end of the flush.
pub struct EncoderHandle {
    chunks: mpsc::Receiver<Result<Chunk, CaptureError>>,
    stop: Option<oneshot::Sender<()>>,
}

impl EncoderHandle {
    pub fn new(
        chunks: mpsc::Receiver<Result<Chunk, CaptureError>>,
        stop: oneshot::Sender<()>,
    ) -> Self {
        Self {
            chunks,
            stop: Some(stop),
        }
    }

    /// Asks the encoder to finalize. Idempotent.
    pub fn signal_stop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }

    /// Next chunk, or a terminal encoder failure, or `None` once the
    /// encoder has fully flushed and shut down.
    pub async fn next(&mut self) -> Option<Result<Chunk, CaptureError>> {
        self.chunks.recv().await
    }
}
