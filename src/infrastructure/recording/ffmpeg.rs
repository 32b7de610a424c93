//! FFmpeg-based screen recorder adapter
//!
//! FFmpeg writes a streamable container to stdout; a reader task turns
//! the pipe into `RecorderEvent::Data` fragments as they arrive.

use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Instant;

use async_trait::async_trait;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout, Duration as TokioDuration};
use tracing::{debug, warn};

use crate::application::ports::{CaptureStream, MediaRecorder, RecorderEvent, RecordingError};
use crate::domain::capture::{CaptureBackend, StreamDescriptor};
use crate::domain::recording::{Chunk, VideoContainer};

/// Size of each read from FFmpeg's stdout
const READ_CHUNK_BYTES: usize = 64 * 1024;
/// How long FFmpeg gets to fail on bad devices before start reports success
const STARTUP_GRACE: TokioDuration = TokioDuration::from_millis(250);
/// How long FFmpeg gets to flush after SIGINT before it is killed
const DEFAULT_STOP_TIMEOUT: TokioDuration = TokioDuration::from_secs(10);

/// A running FFmpeg process and its pipe reader
struct RunningProcess {
    child: Child,
    reader: JoinHandle<()>,
}

/// FFmpeg recorder streaming container fragments
pub struct FfmpegRecorder {
    ffmpeg: String,
    container: VideoContainer,
    stop_timeout: TokioDuration,
    process: Mutex<Option<RunningProcess>>,
    is_recording: Arc<AtomicBool>,
    start_time: StdMutex<Option<Instant>>,
}

impl FfmpegRecorder {
    /// Create a new FFmpeg recorder
    pub fn new(container: VideoContainer) -> Self {
        Self::with_binary("ffmpeg", container)
    }

    /// Use a specific ffmpeg binary
    pub fn with_binary(ffmpeg: impl Into<String>, container: VideoContainer) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            container,
            stop_timeout: DEFAULT_STOP_TIMEOUT,
            process: Mutex::new(None),
            is_recording: Arc::new(AtomicBool::new(false)),
            start_time: StdMutex::new(None),
        }
    }

    /// Change how long `stop` waits for FFmpeg to exit on its own
    pub fn with_stop_timeout(mut self, stop_timeout: TokioDuration) -> Self {
        self.stop_timeout = stop_timeout;
        self
    }

    /// Input args for the tracks of a stream
    fn input_args(descriptor: &StreamDescriptor) -> Vec<String> {
        let framerate = descriptor.framerate.to_string();
        let mut args = Vec::new();

        match descriptor.video.backend {
            CaptureBackend::AvFoundation => {
                // avfoundation opens screen and audio as one "video:audio" input
                let audio = descriptor
                    .audio
                    .as_ref()
                    .map(|a| a.device.as_str())
                    .unwrap_or("none");
                args.extend([
                    "-f".to_string(),
                    "avfoundation".to_string(),
                    "-framerate".to_string(),
                    framerate,
                    "-capture_cursor".to_string(),
                    "1".to_string(),
                    "-i".to_string(),
                    format!("{}:{}", descriptor.video.device, audio),
                ]);
            }
            _ => {
                args.extend([
                    "-f".to_string(),
                    "x11grab".to_string(),
                    "-thread_queue_size".to_string(),
                    "512".to_string(),
                    "-framerate".to_string(),
                    framerate,
                    "-i".to_string(),
                    descriptor.video.device.clone(),
                ]);
                if let Some(audio) = &descriptor.audio {
                    args.extend([
                        "-f".to_string(),
                        "pulse".to_string(),
                        "-thread_queue_size".to_string(),
                        "512".to_string(),
                        "-i".to_string(),
                        audio.device.clone(),
                    ]);
                }
            }
        }

        args
    }

    /// Encoder and muxer args. Every container is written in a form that
    /// can be produced on a pipe and concatenated back together.
    fn output_args(container: VideoContainer, with_audio: bool) -> Vec<String> {
        let mut args: Vec<String> = match container {
            VideoContainer::Mp4 | VideoContainer::Matroska => vec![
                "-c:v".into(),
                "libx264".into(),
                "-preset".into(),
                "ultrafast".into(),
                "-pix_fmt".into(),
                "yuv420p".into(),
            ],
            VideoContainer::Webm => vec![
                "-c:v".into(),
                "libvpx".into(),
                "-deadline".into(),
                "realtime".into(),
                "-cpu-used".into(),
                "8".into(),
                "-b:v".into(),
                "2M".into(),
            ],
        };

        if with_audio {
            let codec = match container {
                VideoContainer::Webm => "libopus",
                _ => "aac",
            };
            args.extend(["-c:a".into(), codec.into(), "-b:a".into(), "128k".into()]);
        } else {
            args.push("-an".into());
        }

        match container {
            VideoContainer::Mp4 => args.extend([
                "-f".into(),
                "mp4".into(),
                "-movflags".into(),
                "frag_keyframe+empty_moov+default_base_moof".into(),
            ]),
            VideoContainer::Webm => args.extend(["-f".into(), "webm".into()]),
            VideoContainer::Matroska => args.extend(["-f".into(), "matroska".into()]),
        }

        args.push("pipe:1".into());
        args
    }

    /// Build FFmpeg args for recording a stream
    fn build_ffmpeg_args(descriptor: &StreamDescriptor, container: VideoContainer) -> Vec<String> {
        let mut args = vec![
            "-hide_banner".to_string(),
            "-nostdin".to_string(),
            "-loglevel".to_string(),
            "warning".to_string(),
        ];
        args.extend(Self::input_args(descriptor));
        args.extend(Self::output_args(container, descriptor.has_audio()));
        args
    }

    /// Spawn FFmpeg process
    fn spawn_ffmpeg(&self, args: &[String]) -> Result<Child, RecordingError> {
        Command::new(&self.ffmpeg)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    RecordingError::FfmpegNotFound
                } else {
                    RecordingError::StartFailed(e.to_string())
                }
            })
    }

    /// Send signal to FFmpeg process
    fn send_signal(child: &Child, sig: Signal) -> Result<(), RecordingError> {
        if let Some(id) = child.id() {
            signal::kill(Pid::from_raw(id as i32), sig)
                .map_err(|e| RecordingError::RecordingFailed(format!("Signal failed: {}", e)))?;
        }
        Ok(())
    }

    fn set_start_time(&self, value: Option<Instant>) {
        if let Ok(mut guard) = self.start_time.lock() {
            *guard = value;
        }
    }
}

/// Forward everything read from `pipe` as data events, then `Stopped`
async fn pump_output<Rd>(mut pipe: Rd, events: mpsc::UnboundedSender<RecorderEvent>)
where
    Rd: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; READ_CHUNK_BYTES];
    loop {
        match pipe.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                if events
                    .send(RecorderEvent::Data(Chunk::from_bytes(&buf[..n])))
                    .is_err()
                {
                    debug!("event receiver dropped, discarding recorder output");
                    break;
                }
            }
            Err(e) => {
                let _ = events.send(RecorderEvent::Failed(format!(
                    "Failed reading FFmpeg output: {}",
                    e
                )));
                break;
            }
        }
    }
    let _ = events.send(RecorderEvent::Stopped);
}

/// Log FFmpeg diagnostics
async fn log_stderr<Rd>(pipe: Rd)
where
    Rd: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(pipe).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        debug!(target: "screencast::ffmpeg", "{}", line);
    }
}

#[async_trait]
impl MediaRecorder for FfmpegRecorder {
    async fn start(
        &self,
        stream: &dyn CaptureStream,
        events: mpsc::UnboundedSender<RecorderEvent>,
    ) -> Result<(), RecordingError> {
        let mut process_guard = self.process.lock().await;
        if process_guard.is_some() {
            return Err(RecordingError::StartFailed(
                "Recording already in progress".to_string(),
            ));
        }

        let args = Self::build_ffmpeg_args(stream.descriptor(), self.container);
        debug!(args = ?args, "spawning ffmpeg");
        let mut child = self.spawn_ffmpeg(&args)?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| RecordingError::StartFailed("FFmpeg stdout not captured".to_string()))?;
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(log_stderr(stderr));
        }

        // Bad devices make FFmpeg exit right away
        sleep(STARTUP_GRACE).await;
        if let Some(status) = child
            .try_wait()
            .map_err(|e| RecordingError::StartFailed(e.to_string()))?
        {
            return Err(RecordingError::StartFailed(format!(
                "FFmpeg exited during startup with {}",
                status
            )));
        }

        let reader = tokio::spawn(pump_output(stdout, events));
        *process_guard = Some(RunningProcess { child, reader });
        self.is_recording.store(true, Ordering::SeqCst);
        self.set_start_time(Some(Instant::now()));

        Ok(())
    }

    async fn stop(&self) -> Result<(), RecordingError> {
        let mut process_guard = self.process.lock().await;
        let RunningProcess { mut child, reader } =
            process_guard.take().ok_or(RecordingError::NotRecording)?;

        self.is_recording.store(false, Ordering::SeqCst);
        self.set_start_time(None);

        // SIGINT lets FFmpeg write its trailing fragments
        Self::send_signal(&child, Signal::SIGINT)?;

        match timeout(self.stop_timeout, child.wait()).await {
            Ok(Ok(status)) => debug!(%status, "ffmpeg exited"),
            Ok(Err(e)) => warn!(error = %e, "failed waiting for ffmpeg"),
            Err(_) => {
                warn!("ffmpeg did not exit after SIGINT, killing it");
                let _ = child.kill().await;
            }
        }

        reader
            .await
            .map_err(|e| RecordingError::RecordingFailed(format!("Output reader failed: {}", e)))
    }

    fn container(&self) -> VideoContainer {
        self.container
    }

    fn is_recording(&self) -> bool {
        self.is_recording.load(Ordering::SeqCst)
    }

    fn elapsed_ms(&self) -> u64 {
        self.start_time
            .lock()
            .ok()
            .and_then(|guard| *guard)
            .map(|start| start.elapsed().as_millis() as u64)
            .unwrap_or(0)
    }
}
