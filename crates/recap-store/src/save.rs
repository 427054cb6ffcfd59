use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;
use tracing::debug;
use tracing::info;
use tracing::warn;

use recap_common::mutex_lock_or_recover;

use crate::artifact::Artifact;
use crate::capability::DirectoryCapability;
use crate::capability::DirectoryHandle;
use crate::capability::DirectoryPicker;
use crate::capability::DownloadSink;
use crate::error::SaveError;

/// Outcome of a completed save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReceipt {
    /// Confirmation text for the control panel.
    pub message: String,
    /// Whether the download fallback was the tier that succeeded.
    pub via_fallback: bool,
}

/// Stores finished artifacts, degrading through two tiers.
///
/// Tier 1 writes under a cached, permission-checked directory capability;
/// tier 2 hands the bytes to the download sink. The capability cache is the
/// only state that outlives a recording session.
pub struct SaveManager {
    picker: Arc<dyn DirectoryPicker>,
    sink: Arc<dyn DownloadSink>,
    cached: Mutex<Option<DirectoryCapability>>,
    subfolder: String,
    max_validation_age: Duration,
}

impl SaveManager {
    pub fn new(
        picker: Arc<dyn DirectoryPicker>,
        sink: Arc<dyn DownloadSink>,
        subfolder: impl Into<String>,
        max_validation_age: Duration,
    ) -> Self {
        Self {
            picker,
            sink,
            cached: Mutex::new(None),
            subfolder: subfolder.into(),
            max_validation_age,
        }
    }

    /// Durably stores the artifact.
    ///
    /// A capability write failure silently falls back to the download tier;
    /// picker cancellation aborts the whole save with `NoDirectoryAccess`
    /// and attempts no fallback.
    pub async fn save(&self, artifact: Artifact) -> Result<SaveReceipt, SaveError> {
        if let Some(handle) = self.resolve_capability().await? {
            match handle.write_file(artifact.filename(), artifact.bytes()) {
                Ok(()) => {
                    let location = handle.describe();
                    info!(file = artifact.filename(), %location, "recording saved");
                    return Ok(SaveReceipt {
                        message: format!("Recording saved to {}", location),
                        via_fallback: false,
                    });
                }
                Err(e) => {
                    warn!(error = %e, "capability write failed, falling back to download");
                    self.discard_capability();
                }
            }
        }

        let hint = format!("{}/{}", self.subfolder, artifact.filename());
        self.sink
            .download(&hint, artifact.bytes())
            .await
            .map_err(|e| SaveError::SavingFailed {
                reason: e.to_string(),
            })?;

        info!(path = %hint, "recording saved via download fallback");
        Ok(SaveReceipt {
            message: format!("Recording saved to downloads ({})", hint),
            via_fallback: true,
        })
    }

    /// Resolves a usable directory capability.
    ///
    /// `Ok(None)` means resolution failed for a reason other than user
    /// cancellation; the caller falls through to the download tier.
    async fn resolve_capability(&self) -> Result<Option<Arc<dyn DirectoryHandle>>, SaveError> {
        let now = Utc::now();
        if let Some(handle) = self.reusable_cached(now) {
            return Ok(Some(handle));
        }

        let root = match self.picker.pick().await {
            Ok(Some(root)) => root,
            Ok(None) => {
                info!("directory prompt cancelled, aborting save");
                return Err(SaveError::NoDirectoryAccess);
            }
            Err(e) => {
                warn!(error = %e, "directory prompt failed");
                return Ok(None);
            }
        };

        let chosen = match root.subdirectory(&self.subfolder) {
            Ok(sub) => sub,
            Err(e) => {
                warn!(error = %e, subfolder = %self.subfolder, "using picked root directly");
                root
            }
        };

        let mut guard = mutex_lock_or_recover(&self.cached);
        *guard = Some(DirectoryCapability::new(Arc::clone(&chosen), now));
        Ok(Some(chosen))
    }

    /// Returns the cached capability's handle when it is fresh enough and
    /// still permitted; demotes it otherwise.
    fn reusable_cached(
        &self,
        now: chrono::DateTime<Utc>,
    ) -> Option<Arc<dyn DirectoryHandle>> {
        let mut guard = mutex_lock_or_recover(&self.cached);
        let cap = guard.as_mut()?;

        if cap.is_stale(now, self.max_validation_age) {
            debug!(validated_at = %cap.validated_at(), "cached capability too stale");
            *guard = None;
            return None;
        }

        match cap.revalidate(now) {
            Ok(true) => Some(cap.handle()),
            Ok(false) => {
                warn!("cached capability permission revoked");
                *guard = None;
                None
            }
            Err(e) => {
                warn!(error = %e, "cached capability check failed");
                *guard = None;
                None
            }
        }
    }

    fn discard_capability(&self) {
        let mut guard = mutex_lock_or_recover(&self.cached);
        *guard = None;
    }

    /// Whether a capability is currently cached. Exposed for tests and
    /// diagnostics; never a substitute for the live permission check.
    pub fn has_cached_capability(&self) -> bool {
        mutex_lock_or_recover(&self.cached).is_some()
    }
}
