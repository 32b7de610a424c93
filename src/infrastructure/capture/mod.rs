//! Capture infrastructure module

mod ffmpeg;

pub use ffmpeg::{resolve_x11_display, FfmpegCapture, FfmpegCaptureStream};
