use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::error::StoreError;

/// A writable storage location granted by the platform.
///
/// Grants are revocable out of band, so holders must re-check permission
/// before every write instead of trusting an old grant.
pub trait DirectoryHandle: Send + Sync {
    /// Live permission check. `Ok(false)` means the grant was revoked.
    fn verify_permission(&self) -> Result<bool, StoreError>;

    /// Locates or creates a child directory under this one.
    fn subdirectory(&self, name: &str) -> Result<Arc<dyn DirectoryHandle>, StoreError>;

    /// Writes a new file under this directory.
    fn write_file(&self, name: &str, bytes: &[u8]) -> Result<(), StoreError>;

    /// Human-readable location, for logs and the saved-confirmation text.
    fn describe(&self) -> String;
}

/// Prompts the user to choose a writable directory.
#[async_trait]
pub trait DirectoryPicker: Send + Sync {
    /// `Ok(None)` means the user cancelled the prompt.
    async fn pick(&self) -> Result<Option<Arc<dyn DirectoryHandle>>, StoreError>;
}

/// The always-available fallback write path.
#[async_trait]
pub trait DownloadSink: Send + Sync {
    /// Hands the bytes to the platform's download mechanism. The suggested
    /// path may carry a subfolder hint (`Recordings/recording_....webm`).
    async fn download(&self, suggested_path: &str, bytes: &[u8]) -> Result<(), StoreError>;
}

/// A cached directory grant plus the time it was last validated.
///
/// Never used for a write without a fresh permission check; staleness or a
/// failed check demotes the capability and forces re-acquisition.
pub struct DirectoryCapability {
    handle: Arc<dyn DirectoryHandle>,
    validated_at: DateTime<Utc>,
}

impl DirectoryCapability {
    pub fn new(handle: Arc<dyn DirectoryHandle>, validated_at: DateTime<Utc>) -> Self {
        Self {
            handle,
            validated_at,
        }
    }

    pub fn handle(&self) -> Arc<dyn DirectoryHandle> {
        Arc::clone(&self.handle)
    }

    pub fn validated_at(&self) -> DateTime<Utc> {
        self.validated_at
    }

    /// Whether the last validation is older than the allowed age.
    pub fn is_stale(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        match chrono::Duration::from_std(max_age) {
            Ok(max) => now.signed_duration_since(self.validated_at) > max,
            // A max age too large to represent never goes stale.
            Err(_) => false,
        }
    }

    /// Runs the live permission check, refreshing the validation timestamp
    /// on success.
    pub fn revalidate(&mut self, now: DateTime<Utc>) -> Result<bool, StoreError> {
        let permitted = self.handle.verify_permission()?;
        if permitted {
            self.validated_at = now;
        }
        Ok(permitted)
    }
}

impl std::fmt::Debug for DirectoryCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryCapability")
            .field("location", &self.handle.describe())
            .field("validated_at", &self.validated_at)
            .finish()
    }
}
