//! Recording artifact value object and its reference URL

use std::fmt;
use std::path::{Path, PathBuf};

use super::container::VideoContainer;

/// The finished recording: every retained chunk concatenated in order,
/// tagged with the container type. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingArtifact {
    data: Vec<u8>,
    container: VideoContainer,
    chunk_count: usize,
}

impl RecordingArtifact {
    /// Build an artifact from already concatenated bytes
    pub fn new(data: Vec<u8>, container: VideoContainer, chunk_count: usize) -> Self {
        Self {
            data,
            container,
            chunk_count,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn container(&self) -> VideoContainer {
        self.container
    }

    /// The MIME type the bytes are labelled with
    pub fn mime_type(&self) -> &'static str {
        self.container.mime_type()
    }

    /// Number of chunks the artifact was assembled from
    pub fn chunk_count(&self) -> usize {
        self.chunk_count
    }

    /// Get the size in bytes
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get human-readable size
    pub fn human_readable_size(&self) -> String {
        let bytes = self.size_bytes();
        if bytes < 1024 {
            format!("{} B", bytes)
        } else if bytes < 1024 * 1024 {
            format!("{:.1} KB", bytes as f64 / 1024.0)
        } else if bytes < 1024 * 1024 * 1024 {
            format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
        } else {
            format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
        }
    }

    /// Default file name for a download of this artifact
    pub fn file_name(&self, stamp: u128) -> String {
        format!("screencast-{}.{}", stamp, self.container.extension())
    }
}

/// Revocable reference to a published artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactUrl {
    url: String,
}

impl ArtifactUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Build a `file://` URL for a staged file
    pub fn from_path(path: &Path) -> Self {
        Self {
            url: format!("file://{}", path.display()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// Local path for `file://` URLs
    pub fn to_file_path(&self) -> Option<PathBuf> {
        self.url.strip_prefix("file://").map(PathBuf::from)
    }
}

impl fmt::Display for ArtifactUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn human_readable_size() {
        let small = RecordingArtifact::new(vec![0u8; 500], VideoContainer::Mp4, 1);
        assert_eq!(small.human_readable_size(), "500 B");

        let kb = RecordingArtifact::new(vec![0u8; 2048], VideoContainer::Mp4, 1);
        assert_eq!(kb.human_readable_size(), "2.0 KB");

        let mb = RecordingArtifact::new(vec![0u8; 3 * 1024 * 1024], VideoContainer::Mp4, 2);
        assert_eq!(mb.human_readable_size(), "3.0 MB");
    }

    #[test]
    fn mime_type_follows_container() {
        let artifact = RecordingArtifact::new(vec![1], VideoContainer::Webm, 1);
        assert_eq!(artifact.mime_type(), "video/webm");
        assert_eq!(artifact.file_name(42), "screencast-42.webm");
    }

    #[test]
    fn url_from_path_round_trips() {
        let url = ArtifactUrl::from_path(Path::new("/tmp/a.mp4"));
        assert_eq!(url.as_str(), "file:///tmp/a.mp4");
        assert_eq!(url.to_file_path(), Some(PathBuf::from("/tmp/a.mp4")));
    }

    #[test]
    fn non_file_url_has_no_path() {
        assert!(ArtifactUrl::new("mem://1").to_file_path().is_none());
    }
}
