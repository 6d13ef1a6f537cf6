//! Spinner shown while a question is pending

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner shown while a backend call is in flight. Clears itself when
/// finished so the answer prints on a clean line.
pub struct PendingSpinner {
    bar: ProgressBar,
}

impl PendingSpinner {
    pub fn start(message: impl Into<String>) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        bar.set_message(message.into());
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar }
    }

    pub fn finish(self) {
        self.bar.finish_and_clear();
    }
}
