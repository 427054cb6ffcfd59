use thiserror::Error;

/// Failures local to the capture host.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// User or platform refused a stream request; no encoder is started.
    #[error("capture denied: {0}")]
    StreamDenied(String),
    /// The encoder failed to start or to flush.
    #[error("encoder failure during {operation}: {reason}")]
    Encoder { operation: String, reason: String },
}

impl CaptureError {
    pub fn encoder(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        CaptureError::Encoder {
            operation: operation.into(),
            reason: reason.into(),
        }
    }
}
