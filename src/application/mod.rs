//! Application layer - Use cases and port interfaces
//!
//! Contains the core business operations and trait definitions
//! for external system interactions.

pub mod collector;
pub mod finalizer;
pub mod ports;
pub mod session;
pub mod upload;

// Re-export use cases
pub use collector::{collect_events, ChunkCollector};
pub use finalizer::{ArtifactFinalizer, PublishedArtifact};
pub use session::{SessionConfig, SessionController, SessionError};
pub use upload::{
    FetchUploadError, FetchUploadUseCase, FetchedUpload, UploadArtifactError, UploadArtifactUseCase,
};
