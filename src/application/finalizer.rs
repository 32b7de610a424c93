//! Artifact finalization

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::recording::{ArtifactUrl, RecordingArtifact, VideoContainer};

use super::collector::ChunkCollector;
use super::ports::{ArtifactStore, ArtifactStoreError, ControlSurface};

/// A finished recording together with the URL it was published under
#[derive(Debug, Clone)]
pub struct PublishedArtifact {
    pub artifact: Arc<RecordingArtifact>,
    pub url: ArtifactUrl,
}

/// Turns the chunks of a stopped session into a published artifact and
/// binds it to the preview and download controls.
pub struct ArtifactFinalizer<'a, S, F>
where
    S: ArtifactStore,
    F: ControlSurface,
{
    store: &'a S,
    surface: &'a F,
}

impl<'a, S, F> ArtifactFinalizer<'a, S, F>
where
    S: ArtifactStore,
    F: ControlSurface,
{
    pub fn new(store: &'a S, surface: &'a F) -> Self {
        Self { store, surface }
    }

    /// Concatenate, publish and bind. Runs once per session.
    pub async fn finalize(
        &self,
        collector: ChunkCollector,
        container: VideoContainer,
    ) -> Result<PublishedArtifact, ArtifactStoreError> {
        if collector.is_empty() {
            warn!("recorder produced no data, publishing an empty recording");
        }
        let artifact = collector.into_artifact(container);
        let url = self.store.publish(&artifact).await?;

        info!(
            %url,
            size = artifact.size_bytes(),
            chunks = artifact.chunk_count(),
            mime = artifact.mime_type(),
            "recording finalized"
        );

        self.surface.bind_preview(&url);
        self.surface.show_download(&url);

        Ok(PublishedArtifact {
            artifact: Arc::new(artifact),
            url,
        })
    }
}
