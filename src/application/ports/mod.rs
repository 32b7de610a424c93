//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod artifact_store;
pub mod capture;
pub mod config;
pub mod notifier;
pub mod recorder;
pub mod surface;
pub mod uploader;

// Re-export common types
pub use artifact_store::{ArtifactStore, ArtifactStoreError};
pub use capture::{CaptureError, CaptureSource, CaptureStream};
pub use config::ConfigStore;
pub use notifier::{NotificationError, NotificationIcon, Notifier, SilentNotifier};
pub use recorder::{MediaRecorder, RecorderEvent, RecordingError};
pub use surface::ControlSurface;
pub use uploader::{UploadError, Uploader};
