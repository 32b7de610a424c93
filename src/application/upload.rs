//! Artifact upload use case

use thiserror::Error;
use tracing::info;

use crate::domain::recording::RecordingArtifact;
use crate::domain::upload::{key_file_name, validate_upload, UploadReceipt, UploadRejection};

use super::ports::{UploadError, Uploader};

/// Errors from the upload use case
#[derive(Debug, Error)]
pub enum UploadArtifactError {
    #[error("Recording cannot be uploaded: {0}")]
    Rejected(#[from] UploadRejection),

    #[error("Upload failed: {0}")]
    Upload(#[from] UploadError),
}

/// Validates a recording against the upload service limits, then uploads it
pub struct UploadArtifactUseCase<U: Uploader> {
    uploader: U,
}

impl<U: Uploader> UploadArtifactUseCase<U> {
    pub fn new(uploader: U) -> Self {
        Self { uploader }
    }

    pub async fn execute(
        &self,
        artifact: &RecordingArtifact,
    ) -> Result<UploadReceipt, UploadArtifactError> {
        validate_upload(artifact)?;
        let receipt = self.uploader.upload(artifact).await?;
        info!(bucket = %receipt.bucket, key = %receipt.key, "recording uploaded");
        Ok(receipt)
    }
}

/// Errors from fetching an uploaded file
#[derive(Debug, Error)]
pub enum FetchUploadError {
    #[error("Not a file key: '{0}'")]
    InvalidKey(String),

    #[error("Fetch failed: {0}")]
    Upload(#[from] UploadError),
}

/// A file fetched back from the upload service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedUpload {
    /// Local name for the file, taken from its key
    pub file_name: String,
    pub data: Vec<u8>,
}

/// Fetches a previously uploaded file by key
pub struct FetchUploadUseCase<U: Uploader> {
    uploader: U,
}

impl<U: Uploader> FetchUploadUseCase<U> {
    pub fn new(uploader: U) -> Self {
        Self { uploader }
    }

    pub async fn execute(&self, key: &str) -> Result<FetchedUpload, FetchUploadError> {
        let file_name = key_file_name(key)
            .ok_or_else(|| FetchUploadError::InvalidKey(key.to_string()))?
            .to_string();
        let data = self.uploader.fetch(key.trim()).await?;
        info!(key = key.trim(), size = data.len(), "upload fetched");
        Ok(FetchedUpload { file_name, data })
    }
}
