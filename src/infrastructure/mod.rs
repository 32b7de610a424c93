//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with external systems like FFmpeg, the filesystem and
//! the upload service.

pub mod artifact;
pub mod capture;
pub mod config;
pub mod logging;
pub mod notification;
pub mod recording;
pub mod upload;

// Re-export adapters
pub use artifact::FsArtifactStore;
pub use capture::{FfmpegCapture, FfmpegCaptureStream};
pub use config::XdgConfigStore;
pub use logging::{init_logging, Verbosity};
pub use notification::{create_notifier, NotifyRustNotifier};
pub use recording::FfmpegRecorder;
pub use upload::UploadServiceClient;
