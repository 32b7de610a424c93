//! Domain layer - Core business logic
//!
//! Contains value objects, entities, and domain errors.
//! This layer has no dependencies on external systems.

pub mod capture;
pub mod config;
pub mod error;
pub mod recording;
pub mod session;
pub mod upload;

// Re-export common types
pub use capture::{CaptureRequest, StreamDescriptor};
pub use config::AppConfig;
pub use error::*;
pub use recording::{ArtifactUrl, Chunk, Duration, RecordingArtifact, VideoContainer};
pub use session::{ControlState, SessionLifecycle, SessionState};
pub use upload::UploadReceipt;
