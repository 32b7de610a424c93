//! Application configuration value object

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::capture::{CaptureRequest, DEFAULT_FRAMERATE};
use crate::domain::recording::{Duration, VideoContainer};

/// Capture settings (`[capture]` table).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureConfig {
    pub display: Option<String>,
    pub audio: Option<bool>,
    pub audio_device: Option<String>,
    pub framerate: Option<u32>,
    pub container: Option<String>,
}

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub duration: Option<String>,
    pub max_duration: Option<String>,
    pub output_dir: Option<String>,
    pub notify: Option<bool>,
    pub upload_endpoint: Option<String>,
    pub capture: Option<CaptureConfig>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            duration: None,
            max_duration: Some(Duration::default_max_duration().to_string()),
            output_dir: None,
            notify: Some(false),
            upload_endpoint: None,
            capture: Some(CaptureConfig {
                display: None,
                audio: Some(true),
                audio_device: None,
                framerate: Some(DEFAULT_FRAMERATE),
                container: Some(VideoContainer::default().as_str().to_string()),
            }),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            duration: other.duration.or(self.duration),
            max_duration: other.max_duration.or(self.max_duration),
            output_dir: other.output_dir.or(self.output_dir),
            notify: other.notify.or(self.notify),
            upload_endpoint: other.upload_endpoint.or(self.upload_endpoint),
            capture: Self::merge_capture_config(self.capture, other.capture),
        }
    }

    fn merge_capture_config(
        base: Option<CaptureConfig>,
        other: Option<CaptureConfig>,
    ) -> Option<CaptureConfig> {
        match (base, other) {
            (None, None) => None,
            (Some(b), None) => Some(b),
            (None, Some(o)) => Some(o),
            (Some(b), Some(o)) => Some(CaptureConfig {
                display: o.display.or(b.display),
                audio: o.audio.or(b.audio),
                audio_device: o.audio_device.or(b.audio_device),
                framerate: o.framerate.or(b.framerate),
                container: o.container.or(b.container),
            }),
        }
    }

    /// Get max_duration as parsed Duration, or default if not set/invalid
    pub fn max_duration_or_default(&self) -> Duration {
        self.max_duration
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(Duration::default_max_duration)
    }

    /// Get the output directory, falling back to the user's video directory
    pub fn output_dir_or_default(&self) -> PathBuf {
        self.output_dir
            .as_ref()
            .map(PathBuf::from)
            .or_else(dirs::video_dir)
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Get notify setting, or false if not set
    pub fn notify_or_default(&self) -> bool {
        self.notify.unwrap_or(false)
    }

    /// Get the container, or mp4 if not set/invalid
    pub fn container_or_default(&self) -> VideoContainer {
        self.capture
            .as_ref()
            .and_then(|c| c.container.as_ref())
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    /// Get audio capture setting, or true if not set
    pub fn audio_or_default(&self) -> bool {
        self.capture
            .as_ref()
            .and_then(|c| c.audio)
            .unwrap_or(true)
    }

    /// Get framerate, or the default if not set or zero
    pub fn framerate_or_default(&self) -> u32 {
        self.capture
            .as_ref()
            .and_then(|c| c.framerate)
            .filter(|f| *f > 0)
            .unwrap_or(DEFAULT_FRAMERATE)
    }

    /// Build the capture request described by this config
    pub fn capture_request(&self) -> CaptureRequest {
        let capture = self.capture.clone().unwrap_or_default();
        CaptureRequest {
            audio: self.audio_or_default(),
            display: capture.display,
            audio_device: capture.audio_device,
            framerate: self.framerate_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_have_expected_values() {
        let config = AppConfig::defaults();
        assert!(config.duration.is_none());
        assert_eq!(config.max_duration, Some("1h".to_string()));
        assert_eq!(config.notify, Some(false));
        assert!(config.upload_endpoint.is_none());
        let capture = config.capture.as_ref().unwrap();
        assert_eq!(capture.audio, Some(true));
        assert_eq!(capture.framerate, Some(30));
        assert_eq!(capture.container, Some("mp4".to_string()));
    }

    #[test]
    fn empty_has_all_none() {
        let config = AppConfig::empty();
        assert!(config.max_duration.is_none());
        assert!(config.output_dir.is_none());
        assert!(config.capture.is_none());
    }

    #[test]
    fn merge_other_takes_precedence() {
        let base = AppConfig {
            max_duration: Some("10m".to_string()),
            output_dir: Some("/base".to_string()),
            ..Default::default()
        };

        let other = AppConfig {
            max_duration: None,
            output_dir: Some("/other".to_string()),
            ..Default::default()
        };

        let merged = base.merge(other);

        assert_eq!(merged.max_duration, Some("10m".to_string()));
        assert_eq!(merged.output_dir, Some("/other".to_string()));
    }

    #[test]
    fn merge_layers_in_order() {
        let file = AppConfig {
            upload_endpoint: Some("http://file".to_string()),
            notify: Some(true),
            ..Default::default()
        };
        let env = AppConfig {
            upload_endpoint: Some("http://env".to_string()),
            ..Default::default()
        };
        let cli = AppConfig {
            notify: Some(false),
            ..Default::default()
        };

        let merged = AppConfig::defaults().merge(file).merge(env).merge(cli);
        assert_eq!(merged.upload_endpoint, Some("http://env".to_string()));
        assert!(!merged.notify_or_default());
    }

    #[test]
    fn merge_capture_config() {
        let base = AppConfig::defaults();
        let other = AppConfig {
            capture: Some(CaptureConfig {
                container: Some("webm".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let merged = base.merge(other);
        assert_eq!(merged.container_or_default(), VideoContainer::Webm);
        assert_eq!(merged.framerate_or_default(), 30);
        assert!(merged.audio_or_default());
    }

    #[test]
    fn max_duration_or_default_parses() {
        let config = AppConfig {
            max_duration: Some("5m".to_string()),
            ..Default::default()
        };
        assert_eq!(config.max_duration_or_default().as_secs(), 300);
    }

    #[test]
    fn max_duration_or_default_on_invalid() {
        let config = AppConfig {
            max_duration: Some("forever".to_string()),
            ..Default::default()
        };
        assert_eq!(config.max_duration_or_default().as_secs(), 3600);
    }

    #[test]
    fn container_or_default_on_invalid() {
        let config = AppConfig {
            capture: Some(CaptureConfig {
                container: Some("avi".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(config.container_or_default(), VideoContainer::Mp4);
    }

    #[test]
    fn output_dir_uses_configured_value() {
        let config = AppConfig {
            output_dir: Some("/videos".to_string()),
            ..Default::default()
        };
        assert_eq!(config.output_dir_or_default(), PathBuf::from("/videos"));
    }

    #[test]
    fn capture_request_from_config() {
        let config = AppConfig {
            capture: Some(CaptureConfig {
                display: Some(":1".to_string()),
                audio: Some(false),
                framerate: Some(0),
                ..Default::default()
            }),
            ..Default::default()
        };
        let request = config.capture_request();
        assert_eq!(request.display, Some(":1".to_string()));
        assert!(!request.audio);
        assert_eq!(request.framerate, DEFAULT_FRAMERATE);
    }
}
