//! Deterministic stand-ins for the platform capture APIs.
//!
//! Real display/microphone acquisition and media encoding are platform
//! collaborators outside this crate's scope; the synthetic pair generates
//! noise chunks on the flush cadence so the full pipeline runs headless.

use std::time::Duration;

use async_trait::async_trait;
use rand::RngCore;
use tokio::sync::mpsc;
use tokio::sync::oneshot;
use tokio::time::MissedTickBehavior;

use crate::chunks::Chunk;
use crate::encoder::ChunkEncoder;
use crate::encoder::EncoderHandle;
use crate::error::CaptureError;
use crate::media::CombinedStream;
use crate::media::MediaProvider;
use crate::media::MediaStream;
use crate::media::MediaTrack;
use crate::media::TrackKind;

/// Provider that grants synthetic streams, with switchable denials.
#[derive(Debug, Default)]
pub struct SyntheticMediaProvider {
    deny_display: Option<String>,
    deny_microphone: Option<String>,
}

impl SyntheticMediaProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deny_display(mut self, reason: impl Into<String>) -> Self {
        self.deny_display = Some(reason.into());
        self
    }

    pub fn deny_microphone(mut self, reason: impl Into<String>) -> Self {
        self.deny_microphone = Some(reason.into());
        self
    }
}

#[async_trait]
impl MediaProvider for SyntheticMediaProvider {
    async fn acquire_display(&self) -> Result<MediaStream, CaptureError> {
        if let Some(reason) = &self.deny_display {
            return Err(CaptureError::StreamDenied(reason.clone()));
        }
        Ok(MediaStream::new(vec![
            MediaTrack::new(TrackKind::Video, "synthetic-display"),
            MediaTrack::new(TrackKind::Audio, "synthetic-display-audio"),
        ]))
    }

    async fn acquire_microphone(&self) -> Result<MediaStream, CaptureError> {
        if let Some(reason) = &self.deny_microphone {
            return Err(CaptureError::StreamDenied(reason.clone()));
        }
        Ok(MediaStream::new(vec![MediaTrack::new(
            TrackKind::Audio,
            "synthetic-microphone",
        )]))
    }
}

const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Encoder emitting noise chunks on the flush cadence, with one final
/// flush chunk after the stop signal.
#[derive(Debug)]
pub struct SyntheticEncoder {
    chunk_size: usize,
}

impl Default for SyntheticEncoder {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl SyntheticEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }
}

fn noise_chunk(size: usize) -> Chunk {
    let mut data = vec![0u8; size];
    rand::thread_rng().fill_bytes(&mut data);
    Chunk::new(data)
}

impl ChunkEncoder for SyntheticEncoder {
    fn start(
        &self,
        stream: &CombinedStream,
        flush_interval: Duration,
    ) -> Result<EncoderHandle, CaptureError> {
        if stream.tracks().is_empty() {
            return Err(CaptureError::encoder("start", "stream has no tracks"));
        }

        let (tx, rx) = mpsc::channel(16);
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let chunk_size = self.chunk_size;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(flush_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick of an interval completes immediately; consume
            // it so chunks land on the cadence, not at t=0.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = &mut stop_rx => {
                        // Asynchronous flush: one last chunk after stop.
                        let _ = tx.send(Ok(noise_chunk(chunk_size))).await;
                        break;
                    }
                    _ = ticker.tick() => {
                        if tx.send(Ok(noise_chunk(chunk_size))).await.is_err() {
                            break;
                        }
                    }
                }
            }
        });

        Ok(EncoderHandle::new(rx, stop_tx))
    }
}
