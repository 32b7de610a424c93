//! Capture port interfaces

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::capture::{CaptureRequest, StreamDescriptor};

/// Capture acquisition errors
#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    #[error("Screen capture permission denied: {0}")]
    PermissionDenied(String),

    #[error("No capture source available: {0}")]
    NoSource(String),

    #[error("Screen capture is not supported here: {0}")]
    Unsupported(String),

    #[error("Failed to acquire capture stream: {0}")]
    Failed(String),
}

/// A live capture stream handed out by a [`CaptureSource`].
pub trait CaptureStream: Send + Sync + fmt::Debug {
    /// Tracks carried by this stream
    fn descriptor(&self) -> &StreamDescriptor;

    /// Stop every track of the stream. Calling it again has no effect.
    fn release(&self);

    /// Whether the tracks are still live
    fn is_live(&self) -> bool;
}

/// Port for acquiring screen + audio capture streams from the host
#[async_trait]
pub trait CaptureSource: Send + Sync {
    /// Request a capture stream.
    ///
    /// # Arguments
    /// * `request` - Which display and audio device to capture
    ///
    /// # Returns
    /// A live stream owned by the caller, or why it could not be acquired
    async fn acquire(
        &self,
        request: &CaptureRequest,
    ) -> Result<Box<dyn CaptureStream>, CaptureError>;
}
