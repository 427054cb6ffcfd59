#![deny(clippy::all)]

//! The capture host context.
//!
//! The only context allowed to acquire media streams and run the chunked
//! encoder. Spawned per session by the controller, it buffers chunks in
//! memory, assembles them into one artifact on stop, hands the artifact to
//! the persistence manager, and releases the stream tracks only after the
//! terminal persistence event.

mod chunks;
mod encoder;
mod error;
mod host;
mod media;
mod synthetic;

pub use chunks::Chunk;
pub use chunks::ChunkBuffer;
pub use encoder::ChunkEncoder;
pub use encoder::EncoderHandle;
pub use error::CaptureError;
pub use host::CaptureHost;
pub use media::CombinedStream;
pub use media::MediaProvider;
pub use media::MediaStream;
pub use media::MediaTrack;
pub use media::TrackKind;
pub use synthetic::SyntheticEncoder;
pub use synthetic::SyntheticMediaProvider;

pub type Result<T> = std::result::Result<T, CaptureError>;
