#![deny(clippy::all)]

//! Persistence for finished recordings.
//!
//! Saving degrades through two tiers: a cached, permission-checked directory
//! capability first, then an always-available download sink. The capability
//! cache is the only state shared across recording sessions.

mod artifact;
mod capability;
mod error;
mod fs;
mod mock;
mod save;

pub use artifact::Artifact;
pub use capability::DirectoryCapability;
pub use capability::DirectoryHandle;
pub use capability::DirectoryPicker;
pub use capability::DownloadSink;
pub use error::SaveError;
pub use error::StoreError;
pub use fs::FsDirectoryHandle;
pub use fs::FsDirectoryPicker;
pub use fs::FsDownloadSink;
pub use mock::MockDirectoryHandle;
pub use mock::MockDirectoryPicker;
pub use mock::MockDownloadSink;
pub use mock::PickOutcome;
pub use save::SaveManager;
pub use save::SaveReceipt;

pub type Result<T> = std::result::Result<T, SaveError>;
