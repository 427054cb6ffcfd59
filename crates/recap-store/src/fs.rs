//! Filesystem-backed storage collaborators.
//!
//! A chosen directory stands in for a platform capability grant: the
//! permission check probes that the directory still exists and is writable,
//! which covers grants revoked by deletion or permission changes.

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::capability::DirectoryHandle;
use crate::capability::DirectoryPicker;
use crate::capability::DownloadSink;
use crate::error::StoreError;

fn io_err(operation: &str, path: &Path, e: std::io::Error) -> StoreError {
    StoreError::io(operation, format!("{}: {}", path.display(), e))
}

/// A directory on the local filesystem acting as a capability.
pub struct FsDirectoryHandle {
    path: PathBuf,
}

impl FsDirectoryHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DirectoryHandle for FsDirectoryHandle {
    fn verify_permission(&self) -> Result<bool, StoreError> {
        match fs::metadata(&self.path) {
            Ok(md) => Ok(md.is_dir() && !md.permissions().readonly()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_err("verify_permission", &self.path, e)),
        }
    }

    fn subdirectory(&self, name: &str) -> Result<Arc<dyn DirectoryHandle>, StoreError> {
        let child = self.path.join(name);
        fs::create_dir_all(&child).map_err(|e| io_err("subdirectory", &child, e))?;
        Ok(Arc::new(FsDirectoryHandle::new(child)))
    }

    fn write_file(&self, name: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let target = self.path.join(name);
        fs::write(&target, bytes).map_err(|e| io_err("write_file", &target, e))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Non-interactive picker that offers one configured directory.
///
/// A headless environment has no prompt to show; choosing the configured
/// library directory (creating it on first use) is the grant, and an
/// unconfigured picker behaves as a cancelled prompt.
pub struct FsDirectoryPicker {
    root: Option<PathBuf>,
}

impl FsDirectoryPicker {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    /// A picker with no directory to offer; every prompt cancels.
    pub fn unconfigured() -> Self {
        Self { root: None }
    }
}

#[async_trait]
impl DirectoryPicker for FsDirectoryPicker {
    async fn pick(&self) -> Result<Option<Arc<dyn DirectoryHandle>>, StoreError> {
        let Some(root) = &self.root else {
            debug!("no library directory configured, treating prompt as cancelled");
            return Ok(None);
        };
        fs::create_dir_all(root).map_err(|e| io_err("pick", root, e))?;
        Ok(Some(Arc::new(FsDirectoryHandle::new(root.clone()))))
    }
}

/// Download sink writing under a downloads directory.
pub struct FsDownloadSink {
    dir: PathBuf,
}

impl FsDownloadSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl DownloadSink for FsDownloadSink {
    async fn download(&self, suggested_path: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let target = self.dir.join(suggested_path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| io_err("download", parent, e))?;
        }
        fs::write(&target, bytes).map_err(|e| io_err("download", &target, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_directory_fails_permission_check() {
        let tmp = tempfile::tempdir().unwrap();
        let gone = tmp.path().join("vanished");
        let handle = FsDirectoryHandle::new(&gone);
        assert!(!handle.verify_permission().unwrap());

        fs::create_dir_all(&gone).unwrap();
        assert!(handle.verify_permission().unwrap());
    }

    #[test]
    fn writes_land_under_the_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let handle = FsDirectoryHandle::new(tmp.path());
        handle.write_file("clip.webm", b"data").unwrap();
        assert_eq!(fs::read(tmp.path().join("clip.webm")).unwrap(), b"data");
    }

    #[test]
    fn subdirectory_is_created_on_demand() {
        let tmp = tempfile::tempdir().unwrap();
        let handle = FsDirectoryHandle::new(tmp.path());
        let sub = handle.subdirectory("Recordings").unwrap();
        sub.write_file("clip.webm", b"x").unwrap();
        assert!(tmp.path().join("Recordings/clip.webm").is_file());
    }

    #[tokio::test]
    async fn unconfigured_picker_cancels() {
        let picker = FsDirectoryPicker::unconfigured();
        assert!(picker.pick().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn picker_creates_and_grants_the_library() {
        let tmp = tempfile::tempdir().unwrap();
        let lib = tmp.path().join("library");
        let picker = FsDirectoryPicker::new(&lib);
        let handle = picker.pick().await.unwrap().expect("granted");
        assert!(lib.is_dir());
        assert!(handle.verify_permission().unwrap());
    }

    #[tokio::test]
    async fn sink_writes_the_suggested_path() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = FsDownloadSink::new(tmp.path());
        sink.download("Recordings/clip.webm", b"bytes").await.unwrap();
        assert_eq!(
            fs::read(tmp.path().join("Recordings/clip.webm")).unwrap(),
            b"bytes"
        );
    }
}
