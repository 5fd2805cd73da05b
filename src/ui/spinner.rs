use std::time::Duration;

use console::style;
use indicatif::{HumanBytes, ProgressBar, ProgressStyle};

use crate::domain::Progress;

/// Terminal spinner with a status line, finished with a check or a cross.
pub struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    pub fn start(message: impl Into<String>) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.magenta} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.into());
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar }
    }

    pub fn set_message(&self, message: impl Into<String>) {
        self.bar.set_message(message.into());
    }

    pub fn succeed(&self, message: &str) {
        self.bar.finish_and_clear();
        println!("{} {}", style("✔").green(), message);
    }

    pub fn fail(&self, message: &str) {
        self.bar.finish_and_clear();
        println!("{} {}", style("✖").red(), message);
    }
}

pub fn progress_message(progress: Progress) -> String {
    match progress {
        Progress::Percent(percent) => format!("Downloading video... Progress: {}%", percent),
        Progress::Bytes(bytes) => format!("Downloading video... Received: {}", HumanBytes(bytes)),
    }
}
