use recap_proto::SessionStatus;
use thiserror::Error;

/// Errors surfaced to the control panel when driving the session lifecycle.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// A session is active; starts are rejected, never queued.
    #[error("a recording session is already active (status: {status})")]
    AlreadyActive { status: SessionStatus },
    /// The platform refused to create the capture-host context; the
    /// session never left idle.
    #[error("failed to spawn the capture host: {reason}")]
    SpawnFailed { reason: String },
    /// The controller task is gone.
    #[error("controller is not running")]
    Unavailable,
}
