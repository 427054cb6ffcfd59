use std::fmt;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::context::ContextId;

/// Classifies a terminal failure so the panel can react programmatically
/// instead of string-matching error text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// User or platform refused display/microphone capture.
    StreamDenied,
    /// Finalize/assembly failed; the artifact is lost.
    Processing,
    /// User cancelled the directory picker; the save was aborted.
    NoDirectoryAccess,
    /// Every persistence tier failed.
    SaveFailed,
    /// Finalize/save did not complete within the configured deadline.
    Timeout,
}

/// A failure carried inside a protocol event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorPayload {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Instructions relayed from the controller to the live capture host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HostCommand {
    /// Request finalization. The host may keep flushing briefly.
    Stop,
}

/// Lifecycle events emitted by a capture host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostEvent {
    /// Streams acquired and the chunked encoder is running.
    StreamReady,
    /// Capture setup failed; no encoder was started.
    StreamError { error: ErrorPayload },
    /// Cumulative bytes captured so far, not the size of one chunk.
    RecordingProgress { size: u64 },
    /// Finalization began.
    ProcessingStart,
    /// The artifact was assembled; `size` is its total byte length.
    ProcessingComplete { size: u64 },
    /// Assembly/finalize failed. No save follows.
    ProcessingError { error: ErrorPayload },
    /// The artifact was durably stored.
    SavingComplete { message: String },
    /// Every persistence tier failed, or the save timed out.
    SavingError { error: ErrorPayload },
}

impl HostEvent {
    /// Terminal events end the session: the controller must destroy the
    /// host context and return to idle when it sees one. `ProcessingError`
    /// is terminal too, because no save ever follows a failed assembly.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            HostEvent::StreamError { .. }
                | HostEvent::ProcessingError { .. }
                | HostEvent::SavingComplete { .. }
                | HostEvent::SavingError { .. }
        )
    }
}

/// A host event tagged with the context that produced it.
///
/// The controller validates `from` against the live host id before acting;
/// events from torn-down contexts race with fresh ones and are discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub from: ContextId,
    pub event: HostEvent,
}

impl Envelope {
    pub fn new(from: ContextId, event: HostEvent) -> Self {
        Self { from, event }
    }
}

/// Status events relayed by the controller to the control panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PanelEvent {
    RecordingStarted { started_at: DateTime<Utc> },
    RecordingProgress { size: u64 },
    ProcessingStart,
    ProcessingComplete { size: u64 },
    ProcessingError { error: ErrorPayload },
    SavingComplete { message: String },
    SavingError { error: ErrorPayload },
    StreamError { error: ErrorPayload },
}

impl PanelEvent {
    /// True when no further events will arrive for the session.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PanelEvent::StreamError { .. }
                | PanelEvent::ProcessingError { .. }
                | PanelEvent::SavingComplete { .. }
                | PanelEvent::SavingError { .. }
        )
    }

    /// The explanatory failure carried by a terminal error event, if any.
    pub fn error(&self) -> Option<&ErrorPayload> {
        match self {
            PanelEvent::StreamError { error }
            | PanelEvent::ProcessingError { error }
            | PanelEvent::SavingError { error } => Some(error),
            _ => None,
        }
    }
}
