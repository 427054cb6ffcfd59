#![deny(clippy::all)]

//! The shared vocabulary of typed messages exchanged between the recap
//! contexts: controller, control panel, and capture host. Contract only;
//! behavior lives in the component crates.

mod context;
mod messages;
mod status;

pub use context::ContextId;
pub use messages::Envelope;
pub use messages::ErrorKind;
pub use messages::ErrorPayload;
pub use messages::HostCommand;
pub use messages::HostEvent;
pub use messages::PanelEvent;
pub use status::SessionSnapshot;
pub use status::SessionStatus;
