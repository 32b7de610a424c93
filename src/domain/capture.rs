//! Capture request and stream description value objects

use std::fmt;

/// Default capture framerate
pub const DEFAULT_FRAMERATE: u32 = 30;

/// What the caller asks the host environment for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRequest {
    /// Capture audio alongside the screen
    pub audio: bool,
    /// Display to capture; platform default when `None`
    pub display: Option<String>,
    /// Audio input device; platform default when `None`
    pub audio_device: Option<String>,
    pub framerate: u32,
}

impl Default for CaptureRequest {
    fn default() -> Self {
        Self {
            audio: true,
            display: None,
            audio_device: None,
            framerate: DEFAULT_FRAMERATE,
        }
    }
}

/// Host facility a track is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptureBackend {
    X11,
    PulseAudio,
    AvFoundation,
}

impl CaptureBackend {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::X11 => "x11",
            Self::PulseAudio => "pulseaudio",
            Self::AvFoundation => "avfoundation",
        }
    }
}

impl fmt::Display for CaptureBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One live track of a capture stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackSource {
    pub backend: CaptureBackend,
    pub device: String,
}

impl fmt::Display for TrackSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.backend, self.device)
    }
}

/// Description of an acquired capture stream: the tracks it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamDescriptor {
    pub video: TrackSource,
    pub audio: Option<TrackSource>,
    pub framerate: u32,
}

impl StreamDescriptor {
    pub fn has_audio(&self) -> bool {
        self.audio.is_some()
    }
}

impl fmt::Display for StreamDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "video={} @{}fps", self.video, self.framerate)?;
        if let Some(audio) = &self.audio {
            write!(f, " audio={}", audio)?;
        }
        Ok(())
    }
}
