//! Desktop notification adapter using notify-rust

use async_trait::async_trait;
use notify_rust::{Notification, Timeout};

use crate::application::ports::{NotificationError, NotificationIcon, Notifier};

const APP_NAME: &str = "Screencast";

/// Recording started/saved popups stay briefly; failures stay until dismissed.
const BRIEF_TIMEOUT_MS: u32 = 4_000;

/// Session notifications through the desktop notification service
#[derive(Debug, Default, Clone, Copy)]
pub struct NotifyRustNotifier;

impl NotifyRustNotifier {
    pub fn new() -> Self {
        Self
    }

    fn build(title: &str, message: &str, icon: NotificationIcon) -> Notification {
        let timeout = match icon {
            NotificationIcon::Error => Timeout::Never,
            _ => Timeout::Milliseconds(BRIEF_TIMEOUT_MS),
        };

        let mut notification = Notification::new();
        notification
            .appname(APP_NAME)
            .summary(title)
            .body(message)
            .icon(icon.icon_name())
            .timeout(timeout);

        #[cfg(all(unix, not(target_os = "macos")))]
        if icon == NotificationIcon::Error {
            notification.urgency(notify_rust::Urgency::Critical);
        }

        notification
    }
}

#[async_trait]
impl Notifier for NotifyRustNotifier {
    async fn notify(
        &self,
        title: &str,
        message: &str,
        icon: NotificationIcon,
    ) -> Result<(), NotificationError> {
        let notification = Self::build(title, message, icon);

        // show() waits on D-Bus
        tokio::task::spawn_blocking(move || {
            notification
                .show()
                .map(|_| ())
                .map_err(|e| NotificationError::SendFailed(e.to_string()))
        })
        .await
        .map_err(|e| NotificationError::SendFailed(format!("Task join error: {}", e)))?
    }
}
