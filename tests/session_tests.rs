//! Session integration tests against the filesystem store and the
//! terminal control surface. Capture and encoding are scripted.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use screencast::application::ports::{
    CaptureError, CaptureSource, CaptureStream, MediaRecorder, RecorderEvent, RecordingError,
    SilentNotifier,
};
use screencast::application::{SessionConfig, SessionController};
use screencast::cli::TerminalSurface;
use screencast::domain::capture::{CaptureBackend, CaptureRequest, StreamDescriptor, TrackSource};
use screencast::domain::recording::{Chunk, VideoContainer};
use screencast::domain::session::SessionState;
use screencast::infrastructure::{FfmpegCaptureStream, FsArtifactStore};

struct ScriptedCapture {
    acquired: Arc<AtomicUsize>,
}

#[async_trait]
impl CaptureSource for ScriptedCapture {
    async fn acquire(
        &self,
        request: &CaptureRequest,
    ) -> Result<Box<dyn CaptureStream>, CaptureError> {
        self.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FfmpegCaptureStream::new(StreamDescriptor {
            video: TrackSource {
                backend: CaptureBackend::X11,
                device: ":0".to_string(),
            },
            audio: None,
            framerate: request.framerate,
        })))
    }
}

/// Emits its script as soon as it starts, then `Stopped` on stop
struct ScriptedRecorder {
    script: Vec<Vec<u8>>,
    events: Mutex<Option<mpsc::UnboundedSender<RecorderEvent>>>,
}

impl ScriptedRecorder {
    fn new(script: Vec<Vec<u8>>) -> Self {
        Self {
            script,
            events: Mutex::new(None),
        }
    }
}

#[async_trait]
impl MediaRecorder for ScriptedRecorder {
    async fn start(
        &self,
        _stream: &dyn CaptureStream,
        events: mpsc::UnboundedSender<RecorderEvent>,
    ) -> Result<(), RecordingError> {
        for data in &self.script {
            let _ = events.send(RecorderEvent::Data(Chunk::from_bytes(data)));
        }
        *self.events.lock().unwrap() = Some(events);
        Ok(())
    }

    async fn stop(&self) -> Result<(), RecordingError> {
        let events = self
            .events
            .lock()
            .unwrap()
            .take()
            .ok_or(RecordingError::NotRecording)?;
        let _ = events.send(RecorderEvent::Stopped);
        Ok(())
    }

    fn container(&self) -> VideoContainer {
        VideoContainer::Webm
    }

    fn is_recording(&self) -> bool {
        self.events.lock().unwrap().is_some()
    }

    fn elapsed_ms(&self) -> u64 {
        0
    }
}

type Controller = SessionController<
    ScriptedCapture,
    ScriptedRecorder,
    FsArtifactStore,
    TerminalSurface,
    SilentNotifier,
>;

fn controller(
    staging: &std::path::Path,
    script: Vec<Vec<u8>>,
) -> (Controller, TerminalSurface, Arc<AtomicUsize>) {
    let acquired = Arc::new(AtomicUsize::new(0));
    let surface = TerminalSurface::new(false);
    let controller = SessionController::new(
        ScriptedCapture {
            acquired: acquired.clone(),
        },
        ScriptedRecorder::new(script),
        FsArtifactStore::with_dir(staging),
        surface.clone(),
        SilentNotifier,
        SessionConfig::default(),
    );
    (controller, surface, acquired)
}

#[tokio::test]
async fn recording_is_staged_bound_and_downloadable() {
    let staging = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let (controller, surface, acquired) =
        controller(staging.path(), vec![vec![7u8; 100], Vec::new(), vec![9u8; 20]]);

    assert_eq!(surface.snapshot().state_word(), "idle");
    controller.start().await.unwrap();
    assert_eq!(surface.snapshot().state_word(), "recording");
    assert_eq!(acquired.load(Ordering::SeqCst), 1);

    let published = controller.stop().await.unwrap().expect("artifact");
    assert_eq!(published.artifact.size_bytes(), 120);
    assert_eq!(published.artifact.chunk_count(), 2);
    assert_eq!(published.artifact.mime_type(), "video/webm");

    let snapshot = surface.snapshot();
    assert_eq!(snapshot.state_word(), "idle");
    assert_eq!(snapshot.preview.as_ref(), Some(&published.url));
    assert_eq!(snapshot.download.as_ref(), Some(&published.url));

    let staged = published.url.to_file_path().expect("file url");
    assert!(staged.starts_with(staging.path()));
    assert_eq!(std::fs::read(&staged).unwrap().len(), 120);

    let dest = out.path().join("take.webm");
    assert_eq!(controller.download(&dest).await.unwrap(), 120);
    assert_eq!(std::fs::read(&dest).unwrap()[..100], [7u8; 100]);
}

#[tokio::test]
async fn second_stop_is_a_no_op() {
    let staging = tempfile::tempdir().unwrap();
    let (controller, _surface, _acquired) = controller(staging.path(), vec![vec![1u8; 100]]);

    controller.start().await.unwrap();
    assert!(controller.stop().await.unwrap().is_some());
    assert!(controller.stop().await.unwrap().is_none());
    assert_eq!(controller.state().await, SessionState::Idle);
    assert_eq!(std::fs::read_dir(staging.path()).unwrap().count(), 1);
}

#[tokio::test]
async fn new_session_revokes_previous_recording() {
    let staging = tempfile::tempdir().unwrap();
    let (controller, surface, _acquired) = controller(staging.path(), vec![vec![1u8; 10]]);

    controller.start().await.unwrap();
    let first = controller.stop().await.unwrap().expect("artifact");
    let first_path = first.url.to_file_path().unwrap();
    assert!(first_path.exists());

    controller.start().await.unwrap();
    assert!(!first_path.exists());
    assert!(surface.snapshot().download.is_none());

    let second = controller.stop().await.unwrap().expect("artifact");
    assert_ne!(first.url, second.url);
}

#[tokio::test]
async fn shutdown_removes_staged_recording() {
    let staging = tempfile::tempdir().unwrap();
    let (controller, _surface, _acquired) = controller(staging.path(), vec![vec![1u8; 10]]);

    controller.start().await.unwrap();
    controller.shutdown().await.unwrap();

    assert_eq!(controller.state().await, SessionState::Idle);
    assert!(controller.latest_artifact().await.is_none());
    assert_eq!(std::fs::read_dir(staging.path()).unwrap().count(), 0);
}
