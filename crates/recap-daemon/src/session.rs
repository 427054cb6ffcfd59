use chrono::DateTime;
use chrono::Utc;
use tracing::warn;
use uuid::Uuid;

use recap_proto::ContextId;
use recap_proto::SessionSnapshot;
use recap_proto::SessionStatus;

/// The single mutable record of recording state.
///
/// Owned exclusively by the controller task; there is deliberately no lock
/// here. Transitions go through the methods below and never skip a state.
/// The host context id is present iff the status is active.
#[derive(Debug)]
pub struct Session {
    status: SessionStatus,
    host: Option<ContextId>,
    started_at: Option<DateTime<Utc>>,
    recording_id: Option<Uuid>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            status: SessionStatus::Idle,
            host: None,
            started_at: None,
            recording_id: None,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_idle(&self) -> bool {
        self.status == SessionStatus::Idle
    }

    /// Whether `id` is the live capture-host context. Messages from any
    /// other context are stale and must be discarded.
    pub fn is_host(&self, id: ContextId) -> bool {
        self.host == Some(id)
    }

    /// Correlation id for the current recording, used in logs.
    pub fn recording_id(&self) -> Option<Uuid> {
        self.recording_id
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status,
            host: self.host,
            started_at: self.started_at,
        }
    }

    /// `Idle → Initializing`, binding the freshly spawned host context.
    pub fn begin_initializing(&mut self, host: ContextId) -> bool {
        if self.status != SessionStatus::Idle {
            warn!(status = %self.status, "refusing to initialize a non-idle session");
            return false;
        }
        self.status = SessionStatus::Initializing;
        self.host = Some(host);
        self.recording_id = Some(Uuid::new_v4());
        true
    }

    /// `Initializing → Streaming`, recording when streaming began.
    pub fn mark_streaming(&mut self, at: DateTime<Utc>) -> bool {
        if self.status != SessionStatus::Initializing {
            warn!(status = %self.status, "unexpected stream-ready");
            return false;
        }
        self.status = SessionStatus::Streaming;
        self.started_at = Some(at);
        true
    }

    /// `Streaming → Finalizing`.
    pub fn mark_finalizing(&mut self) -> bool {
        if self.status != SessionStatus::Streaming {
            warn!(status = %self.status, "unexpected processing-start");
            return false;
        }
        self.status = SessionStatus::Finalizing;
        true
    }

    /// `Finalizing → Saving`.
    pub fn mark_saving(&mut self) -> bool {
        if self.status != SessionStatus::Finalizing {
            warn!(status = %self.status, "unexpected processing-complete");
            return false;
        }
        self.status = SessionStatus::Saving;
        true
    }

    /// Returns to `Idle` from any state, clearing every session field.
    /// Used for all terminal outcomes, success and failure alike.
    pub fn reset(&mut self) {
        self.status = SessionStatus::Idle;
        self.host = None;
        self.started_at = None;
        self.recording_id = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn full_lifecycle_walks_every_state() {
        let mut session = Session::new();
        let host = ContextId::new(0);

        assert!(session.begin_initializing(host));
        assert_eq!(session.status(), SessionStatus::Initializing);
        assert!(session.is_host(host));
        assert!(session.recording_id().is_some());

        assert!(session.mark_streaming(Utc::now()));
        assert!(session.mark_finalizing());
        assert!(session.mark_saving());

        session.reset();
        assert!(session.is_idle());
        assert!(!session.is_host(host));
        assert!(session.snapshot().started_at.is_none());
    }

    #[test]
    fn double_initialize_is_refused() {
        let mut session = Session::new();
        assert!(session.begin_initializing(ContextId::new(0)));
        assert!(!session.begin_initializing(ContextId::new(1)));
        assert!(session.is_host(ContextId::new(0)));
    }

    #[test]
    fn out_of_order_marks_are_refused() {
        let mut session = Session::new();
        assert!(!session.mark_streaming(Utc::now()));
        assert!(!session.mark_finalizing());
        assert!(!session.mark_saving());

        session.begin_initializing(ContextId::new(0));
        assert!(!session.mark_finalizing());
        assert!(!session.mark_saving());
    }

    #[test]
    fn host_is_present_iff_active() {
        let mut session = Session::new();
        assert!(session.snapshot().host.is_none());
        session.begin_initializing(ContextId::new(7));
        assert_eq!(session.snapshot().host, Some(ContextId::new(7)));
        session.reset();
        assert!(session.snapshot().host.is_none());
    }

    #[derive(Debug, Clone, Copy)]
    enum Op {
        Begin,
        Stream,
        Finalize,
        Save,
        Reset,
    }

    fn adjacent(from: SessionStatus, to: SessionStatus) -> bool {
        use SessionStatus::*;
        matches!(
            (from, to),
            (Idle, Initializing)
                | (Initializing, Streaming)
                | (Streaming, Finalizing)
                | (Finalizing, Saving)
                // Terminal events return to idle from any active state.
                | (Initializing, Idle)
                | (Streaming, Idle)
                | (Finalizing, Idle)
                | (Saving, Idle)
        )
    }

    proptest! {
        /// For every operation sequence, the status never skips a state.
        #[test]
        fn status_never_skips_a_state(ops in proptest::collection::vec(
            prop_oneof![
                Just(Op::Begin),
                Just(Op::Stream),
                Just(Op::Finalize),
                Just(Op::Save),
                Just(Op::Reset),
            ],
            0..64,
        )) {
            let mut session = Session::new();
            let mut context = 0u64;

            for op in ops {
                let before = session.status();
                match op {
                    Op::Begin => {
                        session.begin_initializing(ContextId::new(context));
                        context += 1;
                    }
                    Op::Stream => {
                        session.mark_streaming(Utc::now());
                    }
                    Op::Finalize => {
                        session.mark_finalizing();
                    }
                    Op::Save => {
                        session.mark_saving();
                    }
                    Op::Reset => session.reset(),
                }
                let after = session.status();
                prop_assert!(
                    after == before || adjacent(before, after),
                    "illegal transition {before} -> {after}"
                );
                prop_assert_eq!(
                    session.snapshot().host.is_some(),
                    after.is_active(),
                    "host presence must track activity"
                );
            }
        }
    }
}
