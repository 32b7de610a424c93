//! Recording value objects: chunks, artifacts, containers and durations

pub mod artifact;
pub mod chunk;
pub mod container;
pub mod duration;

pub use artifact::{ArtifactUrl, RecordingArtifact};
pub use chunk::Chunk;
pub use container::VideoContainer;
pub use duration::Duration;
