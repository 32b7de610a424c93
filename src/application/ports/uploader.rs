//! Upload port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::recording::RecordingArtifact;
use crate::domain::upload::UploadReceipt;

/// Upload errors
#[derive(Debug, Clone, Error)]
pub enum UploadError {
    #[error("Upload endpoint not configured. Set SCREENCAST_UPLOAD_ENDPOINT or run 'screencast config set upload_endpoint <url>'")]
    NotConfigured,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Upload service error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid response from upload service: {0}")]
    InvalidResponse(String),
}

/// Port for sending finished recordings to remote storage
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Upload an artifact.
    ///
    /// # Returns
    /// Where the artifact was stored
    async fn upload(&self, artifact: &RecordingArtifact) -> Result<UploadReceipt, UploadError>;

    /// Fetch a previously uploaded file by its key
    async fn fetch(&self, key: &str) -> Result<Vec<u8>, UploadError>;
}
