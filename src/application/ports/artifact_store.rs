//! Artifact store port interface

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::recording::{ArtifactUrl, RecordingArtifact};

/// Artifact store errors
#[derive(Debug, Clone, Error)]
pub enum ArtifactStoreError {
    #[error("Failed to publish recording: {0}")]
    PublishFailed(String),

    #[error("Unknown or revoked artifact: {0}")]
    NotFound(String),

    #[error("Failed to revoke artifact: {0}")]
    RevokeFailed(String),

    #[error("Failed to save recording: {0}")]
    ExportFailed(String),
}

/// Port for publishing finished recordings behind revocable URLs
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Publish an artifact and return the URL it can be reached at
    async fn publish(&self, artifact: &RecordingArtifact) -> Result<ArtifactUrl, ArtifactStoreError>;

    /// Invalidate a URL returned by `publish`
    async fn revoke(&self, url: &ArtifactUrl) -> Result<(), ArtifactStoreError>;

    /// Write the artifact behind `url` to `dest`.
    ///
    /// # Returns
    /// The number of bytes written
    async fn export(&self, url: &ArtifactUrl, dest: &Path) -> Result<u64, ArtifactStoreError>;
}
