//! Control surface port interface

use std::sync::Arc;

use crate::domain::recording::ArtifactUrl;
use crate::domain::session::ControlState;

/// The user-facing controls: start/stop triggers, a preview of the last
/// recording and a download control.
pub trait ControlSurface: Send + Sync {
    /// Update which trigger controls are enabled
    fn set_controls(&self, controls: ControlState);

    /// Render the recording behind `url` in the preview
    fn bind_preview(&self, url: &ArtifactUrl);

    /// Point the download control at `url` and make it visible
    fn show_download(&self, url: &ArtifactUrl);

    /// Hide the download control
    fn hide_download(&self);
}

/// Shared surfaces, so the same surface can be observed elsewhere
impl<T: ControlSurface + ?Sized> ControlSurface for Arc<T> {
    fn set_controls(&self, controls: ControlState) {
        self.as_ref().set_controls(controls)
    }

    fn bind_preview(&self, url: &ArtifactUrl) {
        self.as_ref().bind_preview(url)
    }

    fn show_download(&self, url: &ArtifactUrl) {
        self.as_ref().show_download(url)
    }

    fn hide_download(&self) {
        self.as_ref().hide_download()
    }
}
