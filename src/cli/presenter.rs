//! CLI presenter for output formatting

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::domain::session::ControlState;

/// Presenter for CLI output formatting
pub struct Presenter {
    spinner: Option<ProgressBar>,
    is_spinner_active: Arc<AtomicBool>,
}

impl Presenter {
    /// Create a new presenter
    pub fn new() -> Self {
        Self {
            spinner: None,
            is_spinner_active: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start a spinner with message
    pub fn start_spinner(&mut self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.red} {msg}")
        {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        self.spinner = Some(spinner);
        self.is_spinner_active.store(true, Ordering::SeqCst);
    }

    /// Update spinner message
    pub fn update_spinner(&self, message: &str) {
        if let Some(ref spinner) = self.spinner {
            spinner.set_message(message.to_string());
        }
    }

    /// Mark spinner as success and finish
    pub fn spinner_success(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✓".green(), message));
        }
        self.is_spinner_active.store(false, Ordering::SeqCst);
    }

    /// Mark spinner as failed and finish
    pub fn spinner_fail(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✗".red(), message));
        }
        self.is_spinner_active.store(false, Ordering::SeqCst);
    }

    pub fn is_spinner_active(&self) -> bool {
        self.is_spinner_active.load(Ordering::SeqCst)
    }

    /// Print info message to stderr
    pub fn info(&self, message: &str) {
        eprintln!("{} {}", "ℹ".cyan(), message);
    }

    /// Print success message to stderr
    pub fn success(&self, message: &str) {
        eprintln!("{} {}", "✓".green(), message);
    }

    /// Print warning message to stderr
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Output text to stdout (saved paths, config values)
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// Format elapsed recording time, with the limit when there is one
    pub fn format_progress(&self, elapsed_ms: u64, total_ms: Option<u64>) -> String {
        let elapsed_secs = elapsed_ms / 1000;
        let clock = format!("{:02}:{:02}", elapsed_secs / 60, elapsed_secs % 60);

        let Some(total_ms) = total_ms.filter(|t| *t > 0) else {
            return clock;
        };

        let percent = (elapsed_ms as f64 / total_ms as f64 * 100.0).min(100.0);
        let bar_width = 20;
        let filled = ((percent / 100.0) * bar_width as f64) as usize;
        let empty = bar_width - filled;
        let total_secs = total_ms / 1000;

        format!(
            "[{}{}] {} / {:02}:{:02}",
            "█".repeat(filled).red(),
            "░".repeat(empty),
            clock,
            total_secs / 60,
            total_secs % 60
        )
    }

    /// Update recording progress
    pub fn update_recording_progress(&self, elapsed_ms: u64, total_ms: Option<u64>) {
        let progress = self.format_progress(elapsed_ms, total_ms);
        self.update_spinner(&format!("Recording... {}", progress));
    }

    /// Print which controls are enabled
    pub fn controls(&self, controls: &ControlState) {
        let mark = |enabled: bool| if enabled { "●".green() } else { "○".dimmed() };
        eprintln!(
            "{} start  {} stop",
            mark(controls.start_enabled),
            mark(controls.stop_enabled)
        );
    }

    /// Print daemon status
    pub fn daemon_status(&self, state: &str) {
        eprintln!("{} Daemon: {}", "●".cyan(), state);
    }

    /// Print a key-value pair (for config list)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_progress_without_limit_is_clock() {
        let presenter = Presenter::new();
        assert_eq!(presenter.format_progress(0, None), "00:00");
        assert_eq!(presenter.format_progress(125_000, None), "02:05");
    }

    #[test]
    fn format_progress_with_limit() {
        let presenter = Presenter::new();
        let progress = presenter.format_progress(5000, Some(10000));
        assert!(progress.contains("00:05 / 00:10"));
    }

    #[test]
    fn format_progress_caps_at_limit() {
        let presenter = Presenter::new();
        let progress = presenter.format_progress(20000, Some(10000));
        assert!(progress.contains("00:20 / 00:10"));
        assert!(!progress.contains('░'));
    }

    #[test]
    fn spinner_lifecycle() {
        let mut presenter = Presenter::new();
        assert!(!presenter.is_spinner_active());
        presenter.start_spinner("Recording...");
        assert!(presenter.is_spinner_active());
        presenter.spinner_success("done");
        assert!(!presenter.is_spinner_active());
    }
}
