//! Scripted host spawner for controller tests.
//!
//! Spawned "hosts" are inert tasks; tests drive the controller by injecting
//! envelopes through the captured event sender and observe the stop relay
//! through the captured control receiver.

use std::sync::Arc;
use std::sync::Mutex;

use tokio::sync::mpsc;

use recap_common::mutex_lock_or_recover;
use recap_proto::ContextId;
use recap_proto::Envelope;
use recap_proto::HostCommand;

use crate::spawner::HostHandle;
use crate::spawner::HostSpawner;
use crate::spawner::SpawnError;

/// What the mock captured for one spawned context.
pub struct SpawnedHost {
    pub id: ContextId,
    /// Sender the real host would use to report events.
    pub events: mpsc::Sender<Envelope>,
    /// Receiver on which stop relays arrive; closes when the controller
    /// destroys the context.
    pub control: mpsc::Receiver<HostCommand>,
}

#[derive(Clone, Default)]
pub struct SpawnedHosts(Arc<Mutex<Vec<SpawnedHost>>>);

impl SpawnedHosts {
    pub fn count(&self) -> usize {
        mutex_lock_or_recover(&self.0).len()
    }

    /// Takes ownership of the most recently spawned host's channels.
    pub fn take_latest(&self) -> Option<SpawnedHost> {
        mutex_lock_or_recover(&self.0).pop()
    }
}

/// Spawner that records every spawn instead of starting a capture host.
#[derive(Default)]
pub struct MockSpawner {
    fail_reason: Option<String>,
    hosts: SpawnedHosts,
}

impl MockSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    /// A spawner whose every attempt is denied by the platform.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            fail_reason: Some(reason.into()),
            hosts: SpawnedHosts::default(),
        }
    }

    /// Shared view of the spawned hosts; keep a clone before handing the
    /// spawner to the controller.
    pub fn hosts(&self) -> SpawnedHosts {
        self.hosts.clone()
    }
}

impl HostSpawner for MockSpawner {
    fn spawn(
        &mut self,
        id: ContextId,
        events: mpsc::Sender<Envelope>,
    ) -> Result<HostHandle, SpawnError> {
        if let Some(reason) = &self.fail_reason {
            return Err(SpawnError::new(reason.clone()));
        }

        let (control_tx, control_rx) = mpsc::channel(4);
        let task = tokio::spawn(std::future::pending::<()>());
        mutex_lock_or_recover(&self.hosts.0).push(SpawnedHost {
            id,
            events,
            control: control_rx,
        });
        Ok(HostHandle::new(id, control_tx, task))
    }
}
