//! Recording session use case
//!
//! Owns the single recording session: acquires the capture stream, feeds
//! it to the recorder, collects fragments on a sequential task and hands
//! them to the finalizer on stop.

use std::path::Path;

use thiserror::Error;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::domain::capture::CaptureRequest;
use crate::domain::recording::Duration;
use crate::domain::session::{ControlState, InvalidStateTransition, SessionLifecycle, SessionState};

use super::collector::{collect_events, ChunkCollector};
use super::finalizer::{ArtifactFinalizer, PublishedArtifact};
use super::ports::{
    ArtifactStore, ArtifactStoreError, CaptureError, CaptureSource, CaptureStream,
    ControlSurface, MediaRecorder, NotificationIcon, Notifier, RecordingError,
};

const NOTIFY_TITLE: &str = "Screencast";

/// Errors from the session use case
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Error accessing capture devices: {0}")]
    Capture(#[from] CaptureError),

    #[error("Recording failed: {0}")]
    Recording(#[from] RecordingError),

    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactStoreError),

    #[error("{0}")]
    InvalidState(#[from] InvalidStateTransition),

    #[error("Chunk collection task failed: {0}")]
    Collector(String),

    #[error("Nothing has been recorded yet")]
    NothingRecorded,
}

/// Configuration for the session controller
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// What to capture
    pub request: CaptureRequest,
    /// Recording safety limit
    pub max_duration: Duration,
    /// Whether to show notifications
    pub enable_notify: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            request: CaptureRequest::default(),
            max_duration: Duration::default_max_duration(),
            enable_notify: false,
        }
    }
}

/// Resources owned by the active session
struct ActiveSession {
    stream: Box<dyn CaptureStream>,
    collector: JoinHandle<ChunkCollector>,
}

#[derive(Default)]
struct ControllerState {
    lifecycle: SessionLifecycle,
    active: Option<ActiveSession>,
    published: Option<PublishedArtifact>,
}

/// Session controller: the Idle/Recording state machine plus the
/// resources of the current session and the last published artifact.
pub struct SessionController<C, R, S, F, N>
where
    C: CaptureSource,
    R: MediaRecorder,
    S: ArtifactStore,
    F: ControlSurface,
    N: Notifier,
{
    capture: C,
    recorder: R,
    store: S,
    surface: F,
    notifier: N,
    config: SessionConfig,
    state: Mutex<ControllerState>,
}

impl<C, R, S, F, N> SessionController<C, R, S, F, N>
where
    C: CaptureSource,
    R: MediaRecorder,
    S: ArtifactStore,
    F: ControlSurface,
    N: Notifier,
{
    /// Create a new controller in idle state
    pub fn new(
        capture: C,
        recorder: R,
        store: S,
        surface: F,
        notifier: N,
        config: SessionConfig,
    ) -> Self {
        surface.set_controls(ControlState::idle());
        Self {
            capture,
            recorder,
            store,
            surface,
            notifier,
            config,
            state: Mutex::new(ControllerState::default()),
        }
    }

    /// Get current session state
    pub async fn state(&self) -> SessionState {
        self.state.lock().await.lifecycle.state()
    }

    /// Current enabled flags of the start/stop controls
    pub async fn controls(&self) -> ControlState {
        self.state().await.controls()
    }

    /// The last published recording, if any
    pub async fn latest_artifact(&self) -> Option<PublishedArtifact> {
        self.state.lock().await.published.clone()
    }

    /// Start a new recording session.
    ///
    /// A failed acquisition is logged and returned; controls and state are
    /// left exactly as they were.
    pub async fn start(&self) -> Result<(), SessionError> {
        let mut state = self.state.lock().await;
        state.lifecycle.can_start()?;

        let stream = match self.capture.acquire(&self.config.request).await {
            Ok(stream) => stream,
            Err(e) => {
                error!(error = %e, "Error accessing capture devices");
                self.notify("Could not start recording", NotificationIcon::Error)
                    .await;
                return Err(e.into());
            }
        };
        info!(stream = %stream.descriptor(), "capture stream acquired");

        let (tx, rx) = mpsc::unbounded_channel();
        if let Err(e) = self.recorder.start(stream.as_ref(), tx).await {
            error!(error = %e, "recorder failed to start");
            stream.release();
            return Err(e.into());
        }

        // The previous recording's URL lives until a new session begins
        self.revoke_published(&mut state).await;

        let collector = tokio::spawn(collect_events(rx));
        state.lifecycle.start()?;
        state.active = Some(ActiveSession { stream, collector });
        self.surface.set_controls(state.lifecycle.state().controls());

        self.notify("Recording started", NotificationIcon::Recording)
            .await;
        Ok(())
    }

    /// Stop the active session and publish its recording.
    ///
    /// Without an active session this is a no-op returning `None`, so a
    /// repeated stop never produces a second artifact.
    pub async fn stop(&self) -> Result<Option<PublishedArtifact>, SessionError> {
        let mut state = self.state.lock().await;
        let Some(active) = state.active.take() else {
            debug!("stop requested with no active session");
            return Ok(None);
        };

        state.lifecycle.stop()?;
        self.surface.set_controls(state.lifecycle.state().controls());

        if let Err(e) = self.recorder.stop().await {
            // The recorder may already have exited; its channel still closes
            warn!(error = %e, "recorder did not stop cleanly");
        }

        let collected = active.collector.await;
        active.stream.release();
        let collector = collected.map_err(|e| SessionError::Collector(e.to_string()))?;

        let published = ArtifactFinalizer::new(&self.store, &self.surface)
            .finalize(collector, self.recorder.container())
            .await?;
        state.published = Some(published.clone());

        self.notify(
            &format!(
                "Recording saved ({})",
                published.artifact.human_readable_size()
            ),
            NotificationIcon::Success,
        )
        .await;
        Ok(Some(published))
    }

    /// Start if idle, stop if recording
    pub async fn toggle(&self) -> Result<Option<PublishedArtifact>, SessionError> {
        match self.state().await {
            SessionState::Idle => self.start().await.map(|_| None),
            SessionState::Recording => self.stop().await,
        }
    }

    /// Save the last recording to `dest`.
    ///
    /// # Returns
    /// The number of bytes written
    pub async fn download(&self, dest: &Path) -> Result<u64, SessionError> {
        let state = self.state.lock().await;
        let published = state.published.as_ref().ok_or(SessionError::NothingRecorded)?;
        let written = self.store.export(&published.url, dest).await?;
        info!(dest = %dest.display(), bytes = written, "recording downloaded");
        Ok(written)
    }

    /// Stop any active session and revoke the published artifact
    pub async fn shutdown(&self) -> Result<(), SessionError> {
        let stopped = self.stop().await;
        let mut state = self.state.lock().await;
        self.revoke_published(&mut state).await;
        stopped.map(|_| ())
    }

    /// Check if the active recording has exceeded max duration
    pub fn check_max_duration(&self) -> bool {
        self.recorder.is_recording() && self.elapsed_ms() >= self.config.max_duration.as_millis()
    }

    /// Get elapsed recording time in milliseconds
    pub fn elapsed_ms(&self) -> u64 {
        self.recorder.elapsed_ms()
    }

    /// Maximum recording duration
    pub fn max_duration(&self) -> Duration {
        self.config.max_duration
    }

    async fn revoke_published(&self, state: &mut ControllerState) {
        if let Some(previous) = state.published.take() {
            self.surface.hide_download();
            if let Err(e) = self.store.revoke(&previous.url).await {
                warn!(url = %previous.url, error = %e, "failed to revoke artifact");
            }
        }
    }

    async fn notify(&self, message: &str, icon: NotificationIcon) {
        if self.config.enable_notify {
            let _ = self.notifier.notify(NOTIFY_TITLE, message, icon).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{NotificationError, RecorderEvent};
    use crate::domain::capture::{CaptureBackend, StreamDescriptor, TrackSource};
    use crate::domain::recording::{ArtifactUrl, Chunk, RecordingArtifact, VideoContainer};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex as StdMutex};

    type CallLog = Arc<StdMutex<Vec<&'static str>>>;

    #[derive(Debug)]
    struct MockStream {
        descriptor: StreamDescriptor,
        releases: Arc<AtomicUsize>,
        log: CallLog,
    }

    impl CaptureStream for MockStream {
        fn descriptor(&self) -> &StreamDescriptor {
            &self.descriptor
        }

        fn release(&self) {
            self.releases.fetch_add(1, Ordering::SeqCst);
            self.log.lock().unwrap().push("stream released");
        }

        fn is_live(&self) -> bool {
            self.releases.load(Ordering::SeqCst) == 0
        }
    }

    #[derive(Clone, Default)]
    struct MockCapture {
        deny: Arc<AtomicBool>,
        acquired: Arc<AtomicUsize>,
        releases: Arc<AtomicUsize>,
        log: CallLog,
    }

    #[async_trait]
    impl CaptureSource for MockCapture {
        async fn acquire(
            &self,
            request: &CaptureRequest,
        ) -> Result<Box<dyn CaptureStream>, CaptureError> {
            if self.deny.load(Ordering::SeqCst) {
                return Err(CaptureError::PermissionDenied("user dismissed".to_string()));
            }
            self.acquired.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(MockStream {
                descriptor: StreamDescriptor {
                    video: TrackSource {
                        backend: CaptureBackend::X11,
                        device: ":0.0".to_string(),
                    },
                    audio: None,
                    framerate: request.framerate,
                },
                releases: Arc::clone(&self.releases),
                log: Arc::clone(&self.log),
            }))
        }
    }

    /// Emits its scripted fragments when stopped, then `Stopped`
    #[derive(Clone, Default)]
    struct MockRecorder {
        script: Arc<StdMutex<Vec<Vec<u8>>>>,
        sender: Arc<StdMutex<Option<mpsc::UnboundedSender<RecorderEvent>>>>,
        fail_start: Arc<AtomicBool>,
        stops: Arc<AtomicUsize>,
        log: CallLog,
    }

    impl MockRecorder {
        fn script(&self, sizes: &[usize]) {
            *self.script.lock().unwrap() = sizes.iter().map(|s| vec![0xAB; *s]).collect();
        }
    }

    #[async_trait]
    impl MediaRecorder for MockRecorder {
        async fn start(
            &self,
            _stream: &dyn CaptureStream,
            events: mpsc::UnboundedSender<RecorderEvent>,
        ) -> Result<(), RecordingError> {
            if self.fail_start.load(Ordering::SeqCst) {
                return Err(RecordingError::StartFailed("encoder missing".to_string()));
            }
            *self.sender.lock().unwrap() = Some(events);
            Ok(())
        }

        async fn stop(&self) -> Result<(), RecordingError> {
            self.stops.fetch_add(1, Ordering::SeqCst);
            self.log.lock().unwrap().push("recorder stopped");
            let sender = self
                .sender
                .lock()
                .unwrap()
                .take()
                .ok_or(RecordingError::NotRecording)?;
            for data in self.script.lock().unwrap().drain(..) {
                let _ = sender.send(RecorderEvent::Data(Chunk::new(data)));
            }
            let _ = sender.send(RecorderEvent::Stopped);
            Ok(())
        }

        fn container(&self) -> VideoContainer {
            VideoContainer::Mp4
        }

        fn is_recording(&self) -> bool {
            self.sender.lock().unwrap().is_some()
        }

        fn elapsed_ms(&self) -> u64 {
            0
        }
    }

    #[derive(Clone, Default)]
    struct MockStore {
        artifacts: Arc<StdMutex<HashMap<String, RecordingArtifact>>>,
        revoked: Arc<StdMutex<Vec<ArtifactUrl>>>,
        counter: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ArtifactStore for MockStore {
        async fn publish(
            &self,
            artifact: &RecordingArtifact,
        ) -> Result<ArtifactUrl, ArtifactStoreError> {
            let id = self.counter.fetch_add(1, Ordering::SeqCst);
            let url = ArtifactUrl::new(format!("mem://{}", id));
            self.artifacts
                .lock()
                .unwrap()
                .insert(url.as_str().to_string(), artifact.clone());
            Ok(url)
        }

        async fn revoke(&self, url: &ArtifactUrl) -> Result<(), ArtifactStoreError> {
            self.artifacts.lock().unwrap().remove(url.as_str());
            self.revoked.lock().unwrap().push(url.clone());
            Ok(())
        }

        async fn export(&self, url: &ArtifactUrl, _dest: &Path) -> Result<u64, ArtifactStoreError> {
            self.artifacts
                .lock()
                .unwrap()
                .get(url.as_str())
                .map(|a| a.size_bytes() as u64)
                .ok_or_else(|| ArtifactStoreError::NotFound(url.to_string()))
        }
    }

    #[derive(Clone, Default)]
    struct MockSurface {
        controls: Arc<StdMutex<Vec<ControlState>>>,
        preview: Arc<StdMutex<Option<ArtifactUrl>>>,
        download: Arc<StdMutex<Option<ArtifactUrl>>>,
    }

    impl MockSurface {
        fn current(&self) -> ControlState {
            *self.controls.lock().unwrap().last().unwrap()
        }
    }

    impl ControlSurface for MockSurface {
        fn set_controls(&self, controls: ControlState) {
            self.controls.lock().unwrap().push(controls);
        }

        fn bind_preview(&self, url: &ArtifactUrl) {
            *self.preview.lock().unwrap() = Some(url.clone());
        }

        fn show_download(&self, url: &ArtifactUrl) {
            *self.download.lock().unwrap() = Some(url.clone());
        }

        fn hide_download(&self) {
            *self.download.lock().unwrap() = None;
        }
    }

    struct MockNotifier;

    #[async_trait]
    impl Notifier for MockNotifier {
        async fn notify(
            &self,
            _title: &str,
            _message: &str,
            _icon: NotificationIcon,
        ) -> Result<(), NotificationError> {
            Ok(())
        }
    }

    struct Harness {
        capture: MockCapture,
        recorder: MockRecorder,
        store: MockStore,
        surface: MockSurface,
        controller:
            SessionController<MockCapture, MockRecorder, MockStore, MockSurface, MockNotifier>,
    }

    fn harness() -> Harness {
        let log = CallLog::default();
        let capture = MockCapture {
            log: Arc::clone(&log),
            ..Default::default()
        };
        let recorder = MockRecorder {
            log,
            ..Default::default()
        };
        let store = MockStore::default();
        let surface = MockSurface::default();
        let controller = SessionController::new(
            capture.clone(),
            recorder.clone(),
            store.clone(),
            surface.clone(),
            MockNotifier,
            SessionConfig::default(),
        );
        Harness {
            capture,
            recorder,
            store,
            surface,
            controller,
        }
    }

    #[tokio::test]
    async fn starts_idle_with_start_enabled() {
        let h = harness();
        assert_eq!(h.controller.state().await, SessionState::Idle);
        assert_eq!(h.surface.current(), ControlState::idle());
    }

    #[tokio::test]
    async fn start_flips_controls() {
        let h = harness();
        h.controller.start().await.unwrap();

        assert_eq!(h.controller.state().await, SessionState::Recording);
        assert_eq!(h.surface.current(), ControlState::recording());
        assert!(h.surface.current().stop_enabled);
        assert!(!h.surface.current().start_enabled);
    }

    #[tokio::test]
    async fn stop_flips_controls_back() {
        let h = harness();
        h.controller.start().await.unwrap();
        h.controller.stop().await.unwrap();

        assert_eq!(h.controller.state().await, SessionState::Idle);
        assert_eq!(h.surface.current(), ControlState::idle());
    }

    #[tokio::test]
    async fn hundred_and_zero_byte_chunks_yield_hundred_bytes() {
        let h = harness();
        h.recorder.script(&[100, 0]);
        h.controller.start().await.unwrap();

        let published = h.controller.stop().await.unwrap().unwrap();
        assert_eq!(published.artifact.size_bytes(), 100);
        assert_eq!(published.artifact.mime_type(), "video/mp4");
        assert_eq!(*h.surface.preview.lock().unwrap(), Some(published.url.clone()));
        assert_eq!(*h.surface.download.lock().unwrap(), Some(published.url));
    }

    #[tokio::test]
    async fn artifact_length_is_sum_of_non_empty_chunks() {
        let h = harness();
        let sizes = [3usize, 0, 4096, 0, 1, 250];
        h.recorder.script(&sizes);
        h.controller.start().await.unwrap();

        let published = h.controller.stop().await.unwrap().unwrap();
        assert_eq!(published.artifact.size_bytes(), sizes.iter().sum::<usize>());
        assert_eq!(published.artifact.chunk_count(), 4);
    }

    #[tokio::test]
    async fn start_while_recording_is_rejected() {
        let h = harness();
        h.controller.start().await.unwrap();

        let err = h.controller.start().await.unwrap_err();
        assert!(matches!(err, SessionError::InvalidState(_)));
        assert_eq!(h.capture.acquired.load(Ordering::SeqCst), 1);
        assert_eq!(h.controller.state().await, SessionState::Recording);
    }

    #[tokio::test]
    async fn denied_capture_leaves_idle_controls() {
        let h = harness();
        h.capture.deny.store(true, Ordering::SeqCst);

        let err = h.controller.start().await.unwrap_err();
        assert!(matches!(err, SessionError::Capture(CaptureError::PermissionDenied(_))));
        assert_eq!(h.controller.state().await, SessionState::Idle);
        assert_eq!(*h.surface.controls.lock().unwrap(), vec![ControlState::idle()]);
        assert!(!h.recorder.is_recording());

        // Nothing to stop afterwards
        assert!(h.controller.stop().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn recorder_start_failure_releases_stream() {
        let h = harness();
        h.recorder.fail_start.store(true, Ordering::SeqCst);

        let err = h.controller.start().await.unwrap_err();
        assert!(matches!(err, SessionError::Recording(_)));
        assert_eq!(h.capture.releases.load(Ordering::SeqCst), 1);
        assert_eq!(h.controller.state().await, SessionState::Idle);
    }

    #[tokio::test]
    async fn stop_without_start_is_noop() {
        let h = harness();
        assert!(h.controller.stop().await.unwrap().is_none());
        assert_eq!(h.recorder.stops.load(Ordering::SeqCst), 0);
        assert!(h.store.artifacts.lock().unwrap().is_empty());
        assert!(h.controller.latest_artifact().await.is_none());
    }

    #[tokio::test]
    async fn double_stop_produces_one_artifact_and_one_release() {
        let h = harness();
        h.recorder.script(&[10]);
        h.controller.start().await.unwrap();

        assert!(h.controller.stop().await.unwrap().is_some());
        assert!(h.controller.stop().await.unwrap().is_none());

        assert_eq!(h.store.counter.load(Ordering::SeqCst), 1);
        assert_eq!(h.capture.releases.load(Ordering::SeqCst), 1);
        assert_eq!(h.recorder.stops.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn new_session_revokes_previous_artifact() {
        let h = harness();
        h.recorder.script(&[10]);
        h.controller.start().await.unwrap();
        let first = h.controller.stop().await.unwrap().unwrap();

        h.controller.start().await.unwrap();
        assert_eq!(*h.store.revoked.lock().unwrap(), vec![first.url]);
        assert!(h.surface.download.lock().unwrap().is_none());
        assert!(h.controller.latest_artifact().await.is_none());
    }

    #[tokio::test]
    async fn denied_restart_keeps_previous_artifact() {
        let h = harness();
        h.recorder.script(&[10]);
        h.controller.start().await.unwrap();
        let first = h.controller.stop().await.unwrap().unwrap();

        h.capture.deny.store(true, Ordering::SeqCst);
        assert!(h.controller.start().await.is_err());

        assert!(h.store.revoked.lock().unwrap().is_empty());
        assert_eq!(h.controller.latest_artifact().await.unwrap().url, first.url);
    }

    #[tokio::test]
    async fn toggle_cycles() {
        let h = harness();
        assert!(h.controller.toggle().await.unwrap().is_none());
        assert_eq!(h.controller.state().await, SessionState::Recording);
        assert!(h.controller.toggle().await.unwrap().is_some());
        assert_eq!(h.controller.state().await, SessionState::Idle);
    }

    #[tokio::test]
    async fn download_requires_a_recording() {
        let h = harness();
        let err = h.controller.download(Path::new("/tmp/x.mp4")).await.unwrap_err();
        assert!(matches!(err, SessionError::NothingRecorded));

        h.recorder.script(&[42]);
        h.controller.start().await.unwrap();
        h.controller.stop().await.unwrap();
        assert_eq!(h.controller.download(Path::new("/tmp/x.mp4")).await.unwrap(), 42);
    }

    #[tokio::test]
    async fn shutdown_stops_and_revokes() {
        let h = harness();
        h.recorder.script(&[5]);
        h.controller.start().await.unwrap();

        h.controller.shutdown().await.unwrap();
        assert_eq!(h.controller.state().await, SessionState::Idle);
        assert_eq!(h.capture.releases.load(Ordering::SeqCst), 1);
        assert_eq!(h.store.revoked.lock().unwrap().len(), 1);
        assert!(h.store.artifacts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn recorder_closes_devices_before_stream_is_released() {
        let h = harness();
        h.controller.start().await.unwrap();
        h.controller.stop().await.unwrap();

        assert_eq!(
            *h.capture.log.lock().unwrap(),
            vec!["recorder stopped", "stream released"]
        );
    }
}
