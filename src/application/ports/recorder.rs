//! Media recorder port interface

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::recording::{Chunk, VideoContainer};

use super::capture::CaptureStream;

/// Recording errors
#[derive(Debug, Clone, Error)]
pub enum RecordingError {
    #[error("FFmpeg not found. Please install FFmpeg.")]
    FfmpegNotFound,

    #[error("Failed to start recording: {0}")]
    StartFailed(String),

    #[error("Recording failed: {0}")]
    RecordingFailed(String),

    #[error("No recording in progress")]
    NotRecording,
}

/// Events a recorder delivers while it runs.
///
/// `Stopped` is sent exactly once, after the last `Data` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecorderEvent {
    /// A fragment of encoded output
    Data(Chunk),
    /// Non-fatal encoder problem
    Failed(String),
    /// The recorder has flushed everything it will ever emit
    Stopped,
}

/// Port for encoding a capture stream into container fragments
#[async_trait]
pub trait MediaRecorder: Send + Sync {
    /// Start recording a stream.
    ///
    /// # Arguments
    /// * `stream` - The capture stream to encode
    /// * `events` - Channel the recorder delivers fragments and its final
    ///   `Stopped` event on
    async fn start(
        &self,
        stream: &dyn CaptureStream,
        events: mpsc::UnboundedSender<RecorderEvent>,
    ) -> Result<(), RecordingError>;

    /// Ask the recorder to finalize. Remaining data and the `Stopped`
    /// event arrive on the events channel.
    async fn stop(&self) -> Result<(), RecordingError>;

    /// Container the emitted fragments belong to
    fn container(&self) -> VideoContainer;

    /// Check if currently recording
    fn is_recording(&self) -> bool;

    /// Get elapsed recording time in milliseconds
    fn elapsed_ms(&self) -> u64;
}
