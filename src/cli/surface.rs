//! Terminal control surface
//!
//! Stands in for the record/stop buttons, the preview player and the
//! download link. The current bindings are kept in a snapshot that the
//! daemon serves over IPC.

use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::application::ports::ControlSurface;
use crate::domain::recording::ArtifactUrl;
use crate::domain::session::ControlState;

use super::presenter::Presenter;

/// What the surface currently shows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurfaceSnapshot {
    pub controls: ControlState,
    pub preview: Option<ArtifactUrl>,
    pub download: Option<ArtifactUrl>,
}

impl SurfaceSnapshot {
    /// State word served to `status` queries
    pub fn state_word(&self) -> &'static str {
        if self.controls.stop_enabled {
            "recording"
        } else {
            "idle"
        }
    }
}

/// Control surface rendered to the terminal
#[derive(Clone)]
pub struct TerminalSurface {
    snapshot: Arc<Mutex<SurfaceSnapshot>>,
    echo: bool,
}

impl TerminalSurface {
    /// Create a surface. With `echo` off nothing is printed.
    pub fn new(echo: bool) -> Self {
        Self {
            snapshot: Arc::new(Mutex::new(SurfaceSnapshot::default())),
            echo,
        }
    }

    /// Copy of the current bindings
    pub fn snapshot(&self) -> SurfaceSnapshot {
        self.snapshot
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn update(&self, apply: impl FnOnce(&mut SurfaceSnapshot)) {
        let mut guard = self.snapshot.lock().unwrap_or_else(|e| e.into_inner());
        apply(&mut guard);
    }
}

impl ControlSurface for TerminalSurface {
    fn set_controls(&self, controls: ControlState) {
        debug!(%controls, "controls updated");
        self.update(|s| s.controls = controls);
        if self.echo {
            Presenter::new().controls(&controls);
        }
    }

    fn bind_preview(&self, url: &ArtifactUrl) {
        self.update(|s| s.preview = Some(url.clone()));
        if self.echo {
            Presenter::new().info(&format!("Preview: {}", url));
        }
    }

    fn show_download(&self, url: &ArtifactUrl) {
        self.update(|s| s.download = Some(url.clone()));
        if self.echo {
            Presenter::new().info(&format!("Download ready: {}", url));
        }
    }

    fn hide_download(&self) {
        self.update(|s| {
            s.download = None;
            s.preview = None;
        });
    }
}
