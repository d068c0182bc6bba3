//! Progress display for whole-tree operations
//!
//! The plugins walk a tree in a single blocking call, so there is nothing to
//! count; a spinner on stderr shows the run is alive.

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner shown while a recursive plugin call runs
pub struct TreeSpinner {
    bar: Option<ProgressBar>,
}

impl TreeSpinner {
    /// Start a spinner, or a no-op when `enabled` is false
    pub fn start(enabled: bool, message: &str) -> Self {
        if !enabled {
            return Self { bar: None };
        }

        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg} [{elapsed}]")
        {
            bar.set_style(style);
        }
        bar.set_message(message.bold().to_string());
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar: Some(bar) }
    }

    pub fn is_visible(&self) -> bool {
        self.bar.is_some()
    }

    /// Remove the spinner before report lines are written
    pub fn finish(self) {
        if let Some(bar) = self.bar {
            bar.finish_and_clear();
        }
    }
}
