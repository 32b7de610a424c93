//! FFmpeg-backed capture source
//!
//! Resolves the host display and audio input FFmpeg will read from. The
//! returned stream is a claim on those devices; the recorder opens them.

use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::application::ports::{CaptureError, CaptureSource, CaptureStream};
use crate::domain::capture::{CaptureBackend, CaptureRequest, StreamDescriptor, TrackSource};

const DEFAULT_PULSE_SOURCE: &str = "default";
#[cfg(target_os = "macos")]
const DEFAULT_AVFOUNDATION_SCREEN: &str = "1";
#[cfg(target_os = "macos")]
const DEFAULT_AVFOUNDATION_AUDIO: &str = "0";

/// Capture source that hands display and audio devices to FFmpeg
#[derive(Debug, Clone)]
pub struct FfmpegCapture {
    ffmpeg: String,
}

impl FfmpegCapture {
    pub fn new() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
        }
    }

    /// Use a specific ffmpeg binary
    pub fn with_binary(ffmpeg: impl Into<String>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
        }
    }

    async fn ensure_ffmpeg(&self) -> Result<(), CaptureError> {
        let status = Command::new(&self.ffmpeg)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    CaptureError::NoSource("FFmpeg not found. Please install FFmpeg.".to_string())
                } else {
                    CaptureError::Failed(e.to_string())
                }
            })?;

        if !status.success() {
            return Err(CaptureError::Failed(format!(
                "{} -version exited with {}",
                self.ffmpeg, status
            )));
        }
        Ok(())
    }

    #[cfg(not(target_os = "macos"))]
    fn describe(request: &CaptureRequest) -> Result<StreamDescriptor, CaptureError> {
        let display = resolve_x11_display(
            request.display.as_deref(),
            std::env::var("DISPLAY").ok(),
            std::env::var("WAYLAND_DISPLAY").ok(),
        )?;

        let audio = request.audio.then(|| TrackSource {
            backend: CaptureBackend::PulseAudio,
            device: request
                .audio_device
                .clone()
                .unwrap_or_else(|| DEFAULT_PULSE_SOURCE.to_string()),
        });

        Ok(StreamDescriptor {
            video: TrackSource {
                backend: CaptureBackend::X11,
                device: display,
            },
            audio,
            framerate: request.framerate,
        })
    }

    #[cfg(target_os = "macos")]
    fn describe(request: &CaptureRequest) -> Result<StreamDescriptor, CaptureError> {
        let audio = request.audio.then(|| TrackSource {
            backend: CaptureBackend::AvFoundation,
            device: request
                .audio_device
                .clone()
                .unwrap_or_else(|| DEFAULT_AVFOUNDATION_AUDIO.to_string()),
        });

        Ok(StreamDescriptor {
            video: TrackSource {
                backend: CaptureBackend::AvFoundation,
                device: request
                    .display
                    .clone()
                    .unwrap_or_else(|| DEFAULT_AVFOUNDATION_SCREEN.to_string()),
            },
            audio,
            framerate: request.framerate,
        })
    }
}

impl Default for FfmpegCapture {
    fn default() -> Self {
        Self::new()
    }
}

/// Pick the X11 display to grab.
///
/// An explicit display wins, then `$DISPLAY`. A Wayland-only session has
/// nothing x11grab can read.
pub fn resolve_x11_display(
    requested: Option<&str>,
    display_env: Option<String>,
    wayland_env: Option<String>,
) -> Result<String, CaptureError> {
    if let Some(display) = requested.filter(|d| !d.is_empty()) {
        return Ok(display.to_string());
    }
    if let Some(display) = display_env.filter(|d| !d.is_empty()) {
        return Ok(display);
    }
    if wayland_env.is_some_and(|w| !w.is_empty()) {
        return Err(CaptureError::Unsupported(
            "Wayland session without XWayland; set DISPLAY or capture.display".to_string(),
        ));
    }
    Err(CaptureError::NoSource(
        "No X11 display found; set DISPLAY or capture.display".to_string(),
    ))
}

#[async_trait]
impl CaptureSource for FfmpegCapture {
    async fn acquire(
        &self,
        request: &CaptureRequest,
    ) -> Result<Box<dyn CaptureStream>, CaptureError> {
        let descriptor = Self::describe(request)?;
        self.ensure_ffmpeg().await?;
        debug!(%descriptor, "capture devices resolved");
        Ok(Box::new(FfmpegCaptureStream::new(descriptor)))
    }
}

/// Claim on the devices described by a [`StreamDescriptor`].
///
/// FFmpeg opens the devices itself, so the OS handles belong to the
/// recorder's child process and close when it exits. `release` ends the
/// claim: the session calls it only after the recorder has stopped, and it
/// takes effect once however often it is called.
#[derive(Debug)]
pub struct FfmpegCaptureStream {
    descriptor: StreamDescriptor,
    live: AtomicBool,
}

impl FfmpegCaptureStream {
    pub fn new(descriptor: StreamDescriptor) -> Self {
        Self {
            descriptor,
            live: AtomicBool::new(true),
        }
    }
}

impl CaptureStream for FfmpegCaptureStream {
    fn descriptor(&self) -> &StreamDescriptor {
        &self.descriptor
    }

    fn release(&self) {
        if self.live.swap(false, Ordering::SeqCst) {
            info!(stream = %self.descriptor, "capture stream released");
        }
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }
}

impl Drop for FfmpegCaptureStream {
    fn drop(&mut self) {
        self.release();
    }
}
