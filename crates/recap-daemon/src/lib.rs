#![deny(clippy::all)]

//! The session controller context.
//!
//! Long-lived owner of the single recording session: it spawns and destroys
//! capture-host contexts, relays protocol messages between the panel and the
//! host, and enforces that at most one session is ever active. Cleanup is
//! unconditional on terminal events, success and failure alike, so no
//! orphaned context survives an error.

mod config;
mod controller;
mod error;
mod session;
mod spawner;
pub mod test_support;

pub use config::ControllerConfig;
pub use controller::ControllerHandle;
pub use controller::start_controller;
pub use error::ControllerError;
pub use session::Session;
pub use spawner::CaptureSpawner;
pub use spawner::HostHandle;
pub use spawner::HostSpawner;
pub use spawner::SpawnError;

pub type Result<T> = std::result::Result<T, ControllerError>;
