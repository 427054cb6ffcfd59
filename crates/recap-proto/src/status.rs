use std::fmt;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::context::ContextId;

/// Lifecycle state of the single recording session.
///
/// Transitions are owned by the controller and never skip a state:
/// `Idle → Initializing → Streaming → Finalizing → Saving → Idle`, with
/// early returns to `Idle` on setup or processing failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Idle,
    Initializing,
    Streaming,
    Finalizing,
    Saving,
}

impl SessionStatus {
    /// True for every state except `Idle`.
    pub fn is_active(&self) -> bool {
        !matches!(self, SessionStatus::Idle)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Initializing => "initializing",
            SessionStatus::Streaming => "streaming",
            SessionStatus::Finalizing => "finalizing",
            SessionStatus::Saving => "saving",
        };
        write!(f, "{}", name)
    }
}

/// Read-only view of the session, returned by the state poll.
///
/// `host` is present iff the status is active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub host: Option<ContextId>,
    pub started_at: Option<DateTime<Utc>>,
}

impl SessionSnapshot {
    pub fn idle() -> Self {
        Self {
            status: SessionStatus::Idle,
            host: None,
            started_at: None,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.status.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_is_not_active() {
        assert!(!SessionStatus::Idle.is_active());
        assert!(SessionStatus::Initializing.is_active());
        assert!(SessionStatus::Streaming.is_active());
        assert!(SessionStatus::Finalizing.is_active());
        assert!(SessionStatus::Saving.is_active());
    }

    #[test]
    fn idle_snapshot_has_no_host() {
        let snap = SessionSnapshot::idle();
        assert_eq!(snap.status, SessionStatus::Idle);
        assert!(snap.host.is_none());
        assert!(snap.started_at.is_none());
        assert!(!snap.is_recording());
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&SessionStatus::Initializing).unwrap();
        assert_eq!(json, "\"initializing\"");
    }
}
