//! Scripted storage collaborators for tests.
//!
//! These mirror the real trait contracts closely enough to exercise every
//! tier of the save pipeline: revocable permissions, failing writes,
//! cancelled prompts, and a sink that never resolves (for timeout paths).

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;

use recap_common::mutex_lock_or_recover;

use crate::capability::DirectoryHandle;
use crate::capability::DirectoryPicker;
use crate::capability::DownloadSink;
use crate::error::StoreError;

#[derive(Default)]
struct MockDirInner {
    files: HashMap<String, Vec<u8>>,
    children: HashMap<String, MockDirectoryHandle>,
    revoked: bool,
    fail_writes: bool,
    fail_subdirectories: bool,
    permission_checks: usize,
}

/// In-memory directory with switchable failure modes.
#[derive(Clone)]
pub struct MockDirectoryHandle {
    label: String,
    inner: Arc<Mutex<MockDirInner>>,
}

impl MockDirectoryHandle {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            inner: Arc::new(Mutex::new(MockDirInner::default())),
        }
    }

    /// Simulates the platform revoking the grant out of band.
    pub fn revoke_permission(&self) {
        mutex_lock_or_recover(&self.inner).revoked = true;
    }

    pub fn fail_writes(&self) {
        mutex_lock_or_recover(&self.inner).fail_writes = true;
    }

    pub fn fail_subdirectories(&self) {
        mutex_lock_or_recover(&self.inner).fail_subdirectories = true;
    }

    pub fn file(&self, name: &str) -> Option<Vec<u8>> {
        mutex_lock_or_recover(&self.inner).files.get(name).cloned()
    }

    pub fn file_count(&self) -> usize {
        mutex_lock_or_recover(&self.inner).files.len()
    }

    pub fn child(&self, name: &str) -> Option<MockDirectoryHandle> {
        mutex_lock_or_recover(&self.inner).children.get(name).cloned()
    }

    pub fn permission_checks(&self) -> usize {
        mutex_lock_or_recover(&self.inner).permission_checks
    }
}

impl DirectoryHandle for MockDirectoryHandle {
    fn verify_permission(&self) -> Result<bool, StoreError> {
        let mut inner = mutex_lock_or_recover(&self.inner);
        inner.permission_checks += 1;
        Ok(!inner.revoked)
    }

    fn subdirectory(&self, name: &str) -> Result<Arc<dyn DirectoryHandle>, StoreError> {
        let mut inner = mutex_lock_or_recover(&self.inner);
        if inner.fail_subdirectories {
            return Err(StoreError::io("subdirectory", "cannot create subfolder"));
        }
        let child = inner
            .children
            .entry(name.to_string())
            .or_insert_with(|| MockDirectoryHandle::new(format!("{}/{}", self.label, name)))
            .clone();
        Ok(Arc::new(child))
    }

    fn write_file(&self, name: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let mut inner = mutex_lock_or_recover(&self.inner);
        if inner.revoked {
            return Err(StoreError::Permission("grant revoked".into()));
        }
        if inner.fail_writes {
            return Err(StoreError::io("write_file", "write refused"));
        }
        inner.files.insert(name.to_string(), bytes.to_vec());
        Ok(())
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}

/// One scripted response from the picker.
pub enum PickOutcome {
    Grant(MockDirectoryHandle),
    Cancel,
    Fail(String),
    /// Never resolves; used to exercise save timeouts.
    Hang,
}

#[derive(Default)]
struct PickerInner {
    script: VecDeque<PickOutcome>,
    picks: usize,
}

/// Picker that replays a script of outcomes, cancelling once exhausted.
#[derive(Clone, Default)]
pub struct MockDirectoryPicker {
    inner: Arc<Mutex<PickerInner>>,
}

impl MockDirectoryPicker {
    pub fn with_script(script: Vec<PickOutcome>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(PickerInner {
                script: script.into(),
                picks: 0,
            })),
        }
    }

    pub fn always_cancel() -> Self {
        Self::default()
    }

    pub fn pick_count(&self) -> usize {
        mutex_lock_or_recover(&self.inner).picks
    }
}

#[async_trait]
impl DirectoryPicker for MockDirectoryPicker {
    async fn pick(&self) -> Result<Option<Arc<dyn DirectoryHandle>>, StoreError> {
        let outcome = {
            let mut inner = mutex_lock_or_recover(&self.inner);
            inner.picks += 1;
            inner.script.pop_front()
        };
        match outcome {
            Some(PickOutcome::Grant(handle)) => Ok(Some(Arc::new(handle))),
            Some(PickOutcome::Fail(reason)) => Err(StoreError::io("pick", reason)),
            Some(PickOutcome::Hang) => {
                std::future::pending::<()>().await;
                unreachable!("pending future resolved")
            }
            Some(PickOutcome::Cancel) | None => Ok(None),
        }
    }
}

#[derive(Default)]
struct SinkInner {
    downloads: Vec<(String, Vec<u8>)>,
    fail: Option<String>,
}

/// Download sink that records every handoff.
#[derive(Clone, Default)]
pub struct MockDownloadSink {
    inner: Arc<Mutex<SinkInner>>,
}

impl MockDownloadSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SinkInner {
                downloads: Vec::new(),
                fail: Some(reason.into()),
            })),
        }
    }

    pub fn downloads(&self) -> Vec<(String, Vec<u8>)> {
        mutex_lock_or_recover(&self.inner).downloads.clone()
    }

    pub fn download_count(&self) -> usize {
        mutex_lock_or_recover(&self.inner).downloads.len()
    }
}

#[async_trait]
impl DownloadSink for MockDownloadSink {
    async fn download(&self, suggested_path: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let mut inner = mutex_lock_or_recover(&self.inner);
        if let Some(reason) = &inner.fail {
            return Err(StoreError::io("download", reason.clone()));
        }
        inner
            .downloads
            .push((suggested_path.to_string(), bytes.to_vec()));
        Ok(())
    }
}
