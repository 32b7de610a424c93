//! Video container types

use std::fmt;
use std::str::FromStr;

use crate::domain::error::InvalidContainerError;

/// Container a recording is muxed into.
///
/// The artifact is only tagged with this type; no validation of the
/// produced bytes happens here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VideoContainer {
    #[default]
    Mp4,
    Webm,
    Matroska,
}

impl VideoContainer {
    /// All supported containers, in display order
    pub const ALL: [VideoContainer; 3] = [Self::Mp4, Self::Webm, Self::Matroska];

    /// Get the MIME type string
    pub const fn mime_type(&self) -> &'static str {
        match self {
            Self::Mp4 => "video/mp4",
            Self::Webm => "video/webm",
            Self::Matroska => "video/x-matroska",
        }
    }

    /// Get the file extension
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Webm => "webm",
            Self::Matroska => "mkv",
        }
    }

    /// Short name used in config files and on the command line
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Webm => "webm",
            Self::Matroska => "mkv",
        }
    }
}

impl fmt::Display for VideoContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mime_type())
    }
}

impl FromStr for VideoContainer {
    type Err = InvalidContainerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mp4" | "video/mp4" => Ok(Self::Mp4),
            "webm" | "video/webm" => Ok(Self::Webm),
            "mkv" | "matroska" | "video/x-matroska" => Ok(Self::Matroska),
            _ => Err(InvalidContainerError {
                input: s.to_string(),
            }),
        }
    }
}
