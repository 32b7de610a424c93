//! Chunk collection for an active recording session
//!
//! Fragments are buffered entirely in memory for the lifetime of the
//! session. There is no cap: memory grows linearly with recording length.

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::domain::recording::{Chunk, RecordingArtifact, VideoContainer};

use super::ports::RecorderEvent;

/// Ordered, append-only buffer of the fragments a recorder emitted.
#[derive(Debug, Default)]
pub struct ChunkCollector {
    chunks: Vec<Chunk>,
    total_bytes: usize,
    skipped_empty: usize,
}

impl ChunkCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment. Empty fragments are skipped.
    ///
    /// # Returns
    /// Whether the fragment was retained
    pub fn push(&mut self, chunk: Chunk) -> bool {
        if chunk.is_empty() {
            self.skipped_empty += 1;
            return false;
        }
        self.total_bytes += chunk.size();
        self.chunks.push(chunk);
        true
    }

    /// Number of retained fragments
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Sum of the sizes of retained fragments
    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    /// Number of zero-size fragments that were dropped
    pub fn skipped_empty(&self) -> usize {
        self.skipped_empty
    }

    /// Concatenate every retained fragment, in order, into an artifact
    pub fn into_artifact(self, container: VideoContainer) -> RecordingArtifact {
        let chunk_count = self.chunks.len();
        let mut data = Vec::with_capacity(self.total_bytes);
        for chunk in self.chunks {
            data.extend_from_slice(chunk.data());
        }
        RecordingArtifact::new(data, container, chunk_count)
    }
}

/// Drain recorder events into a collector until the recorder reports it
/// has stopped. A closed channel counts as stopped.
pub async fn collect_events(mut events: mpsc::UnboundedReceiver<RecorderEvent>) -> ChunkCollector {
    let mut collector = ChunkCollector::new();

    while let Some(event) = events.recv().await {
        match event {
            RecorderEvent::Data(chunk) => {
                collector.push(chunk);
            }
            RecorderEvent::Failed(reason) => {
                warn!(%reason, "recorder reported a failure");
            }
            RecorderEvent::Stopped => break,
        }
    }

    debug!(
        chunks = collector.len(),
        bytes = collector.total_bytes(),
        skipped = collector.skipped_empty(),
        "chunk collection finished"
    );
    collector
}
