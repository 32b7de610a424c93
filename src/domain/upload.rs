//! Upload limits and receipts

use serde::{Deserialize, Serialize};

use crate::domain::recording::RecordingArtifact;

pub const KB: usize = 1024;
pub const MB: usize = 1024 * KB;

/// Largest file the upload service accepts
pub const MAX_UPLOAD_BYTES: usize = 100 * MB;

/// Content types the upload service accepts, with their file extensions
pub const SUPPORTED_UPLOAD_TYPES: &[(&str, &str)] = &[
    ("image/png", "png"),
    ("image/jpeg", "jpg"),
    ("application/pdf", "pdf"),
    ("video/mp4", "mp4"),
    ("video/webm", "webm"),
];

/// Why an artifact cannot be uploaded
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadRejection {
    #[error("Recording is empty")]
    Empty,

    #[error("Recording is {size} bytes, supported file size is 0 - 100 MB")]
    TooLarge { size: usize },

    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),
}

/// Check an artifact against the upload service limits
pub fn validate_upload(artifact: &RecordingArtifact) -> Result<(), UploadRejection> {
    let size = artifact.size_bytes();
    if size == 0 {
        return Err(UploadRejection::Empty);
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(UploadRejection::TooLarge { size });
    }
    if !is_supported_type(artifact.mime_type()) {
        return Err(UploadRejection::UnsupportedType(
            artifact.mime_type().to_string(),
        ));
    }
    Ok(())
}

/// Check whether a content type is accepted by the upload service
pub fn is_supported_type(mime: &str) -> bool {
    SUPPORTED_UPLOAD_TYPES.iter().any(|(m, _)| *m == mime)
}

/// How an artifact is sent to the upload service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadRoute {
    /// Presigned URL from the service, then a `PUT` straight to storage.
    /// The service only presigns MP4 objects.
    Presigned,
    /// Multipart `POST` through the service itself
    Multipart,
}

/// Pick the upload route for a content type
pub fn upload_route(mime: &str) -> UploadRoute {
    if mime == "video/mp4" {
        UploadRoute::Presigned
    } else {
        UploadRoute::Multipart
    }
}

/// Local file name for a stored object key: its last path segment.
///
/// Returns `None` for keys that do not name a file.
pub fn key_file_name(key: &str) -> Option<&str> {
    key.trim()
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
}

/// Where an uploaded artifact ended up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub bucket: String,
    pub key: String,
}
