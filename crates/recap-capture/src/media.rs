use async_trait::async_trait;
use tracing::debug;

use crate::error::CaptureError;

/// Kind of a captured media track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Video,
    Audio,
}

/// One live track inside an acquired stream.
#[derive(Debug)]
pub struct MediaTrack {
    kind: TrackKind,
    label: String,
}

impl MediaTrack {
    pub fn new(kind: TrackKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
        }
    }

    pub fn kind(&self) -> TrackKind {
        self.kind
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// A stream as returned by the platform capture provider.
#[derive(Debug)]
pub struct MediaStream {
    tracks: Vec<MediaTrack>,
}

impl MediaStream {
    pub fn new(tracks: Vec<MediaTrack>) -> Self {
        Self { tracks }
    }

    pub fn tracks(&self) -> &[MediaTrack] {
        &self.tracks
    }

    pub fn into_tracks(self) -> Vec<MediaTrack> {
        self.tracks
    }
}

/// The single capturable stream fed to the encoder: every display track
/// plus the microphone's audio tracks.
///
/// Exclusively owned by the capture host for the session's duration and
/// released exactly once, after the terminal persistence event. Releasing
/// earlier would detach the tracks while an encoder may still be flushing.
#[derive(Debug)]
pub struct CombinedStream {
    tracks: Vec<MediaTrack>,
}

impl CombinedStream {
    pub fn combine(display: MediaStream, microphone: MediaStream) -> Self {
        let mut tracks = display.into_tracks();
        tracks.extend(
            microphone
                .into_tracks()
                .into_iter()
                .filter(|t| t.kind() == TrackKind::Audio),
        );
        Self { tracks }
    }

    pub fn tracks(&self) -> &[MediaTrack] {
        &self.tracks
    }

    /// Detaches the underlying tracks. Consuming `self` makes the release
    /// linear: it cannot happen twice, and holding the stream keeps every
    /// track alive.
    pub fn release(self) {
        for track in &self.tracks {
            debug!(track = track.label(), "stopping track");
        }
    }
}

/// Platform media acquisition. Display and microphone requests are separate
/// because either may independently be denied or cancelled by the user.
#[async_trait]
pub trait MediaProvider: Send + Sync {
    async fn acquire_display(&self) -> Result<MediaStream, CaptureError>;

    async fn acquire_microphone(&self) -> Result<MediaStream, CaptureError>;
}
