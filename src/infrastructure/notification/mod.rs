//! Notification infrastructure module

mod notify_rust;

pub use notify_rust::NotifyRustNotifier;

use crate::application::ports::{Notifier, SilentNotifier};

/// Create the notifier for the given setting
pub fn create_notifier(enabled: bool) -> Box<dyn Notifier> {
    if enabled {
        Box::new(NotifyRustNotifier::new())
    } else {
        Box::new(SilentNotifier)
    }
}
