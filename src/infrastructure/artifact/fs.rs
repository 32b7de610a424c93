//! Filesystem artifact store adapter
//!
//! Finished recordings are staged as files in a cache directory and
//! addressed by `file://` URLs. Revoking a URL deletes its file.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::application::ports::{ArtifactStore, ArtifactStoreError};
use crate::domain::recording::{ArtifactUrl, RecordingArtifact};

/// Artifact store backed by a staging directory
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    dir: PathBuf,
}

impl FsArtifactStore {
    /// Stage under the user cache directory
    pub fn new() -> Self {
        let dir = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("screencast");
        Self { dir }
    }

    /// Stage under a custom directory
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Resolve a URL to a staged file this store owns
    fn staged_path(&self, url: &ArtifactUrl) -> Result<PathBuf, ArtifactStoreError> {
        url.to_file_path()
            .filter(|p| p.starts_with(&self.dir))
            .ok_or_else(|| ArtifactStoreError::NotFound(url.to_string()))
    }
}

impl Default for FsArtifactStore {
    fn default() -> Self {
        Self::new()
    }
}

fn timestamp_nanos() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0)
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn publish(&self, artifact: &RecordingArtifact) -> Result<ArtifactUrl, ArtifactStoreError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| ArtifactStoreError::PublishFailed(e.to_string()))?;

        let path = self.dir.join(artifact.file_name(timestamp_nanos()));
        fs::write(&path, artifact.data())
            .await
            .map_err(|e| ArtifactStoreError::PublishFailed(format!("{}: {}", path.display(), e)))?;

        debug!(path = %path.display(), "artifact staged");
        Ok(ArtifactUrl::from_path(&path))
    }

    async fn revoke(&self, url: &ArtifactUrl) -> Result<(), ArtifactStoreError> {
        let path = self.staged_path(url)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(path = %path.display(), "artifact revoked");
                Ok(())
            }
            // Already gone
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ArtifactStoreError::RevokeFailed(e.to_string())),
        }
    }

    async fn export(&self, url: &ArtifactUrl, dest: &Path) -> Result<u64, ArtifactStoreError> {
        let source = self.staged_path(url)?;
        if !source.exists() {
            return Err(ArtifactStoreError::NotFound(url.to_string()));
        }

        let target = if dest.is_dir() {
            match source.file_name() {
                Some(name) => dest.join(name),
                None => return Err(ArtifactStoreError::NotFound(url.to_string())),
            }
        } else {
            dest.to_path_buf()
        };

        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ArtifactStoreError::ExportFailed(e.to_string()))?;
        }

        fs::copy(&source, &target)
            .await
            .map_err(|e| ArtifactStoreError::ExportFailed(format!("{}: {}", target.display(), e)))
    }
}
