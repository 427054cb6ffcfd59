use recap_proto::ErrorKind;
use recap_proto::ErrorPayload;
use thiserror::Error;

/// Failures reported by the storage collaborators (handles, picker, sink).
///
/// These stay internal to the save pipeline; a tier that fails with a
/// `StoreError` falls through to the next tier rather than surfacing.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("permission check failed: {0}")]
    Permission(String),
    #[error("storage failure during {operation}: {reason}")]
    Io { operation: String, reason: String },
}

impl StoreError {
    pub fn io(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        StoreError::Io {
            operation: operation.into(),
            reason: reason.into(),
        }
    }
}

/// Terminal outcome of a save that could not complete.
///
/// `WriteFailed` never appears here: a failed capability write silently
/// falls back to the download tier, and only tier exhaustion (or a clean
/// picker cancellation) becomes user-visible.
#[derive(Debug, Error)]
pub enum SaveError {
    /// The user cancelled the directory picker. A clean abort, distinct
    /// from an error: no fallback is attempted.
    #[error("no directory access: the folder prompt was cancelled")]
    NoDirectoryAccess,
    /// The download fallback failed too; there is no further tier.
    #[error("saving failed: {reason}")]
    SavingFailed { reason: String },
}

impl SaveError {
    /// Protocol classification of this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SaveError::NoDirectoryAccess => ErrorKind::NoDirectoryAccess,
            SaveError::SavingFailed { .. } => ErrorKind::SaveFailed,
        }
    }

    /// Explanatory text shown to the user on the control panel.
    pub fn user_message(&self) -> String {
        match self {
            SaveError::NoDirectoryAccess => {
                "Recording was not saved: no folder was chosen. Start a new recording to try again.".to_string()
            }
            SaveError::SavingFailed { reason } => {
                format!("Failed to save the recording: {}", reason)
            }
        }
    }
}

impl From<&SaveError> for ErrorPayload {
    fn from(err: &SaveError) -> Self {
        ErrorPayload::new(err.kind(), err.user_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_maps_to_no_directory_access() {
        let err = SaveError::NoDirectoryAccess;
        assert_eq!(err.kind(), ErrorKind::NoDirectoryAccess);
        assert!(err.user_message().contains("no folder"));
    }

    #[test]
    fn exhaustion_maps_to_save_failed() {
        let err = SaveError::SavingFailed {
            reason: "disk full".into(),
        };
        assert_eq!(err.kind(), ErrorKind::SaveFailed);
        let payload = ErrorPayload::from(&err);
        assert!(payload.message.contains("disk full"));
    }
}
