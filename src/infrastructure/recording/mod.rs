//! Recording infrastructure module
//!
//! Screen and audio are encoded by an FFmpeg child process.

mod ffmpeg;

pub use ffmpeg::FfmpegRecorder;
