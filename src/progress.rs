//! # Progress Bar Module
//!
//! Feedback visivo in tempo reale con `indicatif`, collegato a `RunSummary`
//! come `ProgressObserver`.
//!
//! ```text
//! ⠋ [00:02:15] [========================================] 150/150 (100%) [OK] cat.gif
//! ```

use crate::processor::ProcessingResult;
use crate::summary::{ProgressObserver, SummaryReport};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress bar observer for interactive runs
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(total_files: u64) -> Self {
        let bar = ProgressBar::new(total_files);

        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
        {
            bar.set_style(style.progress_chars("=>-"));
        }

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Progress manager that draws nothing
    pub fn hidden(total_files: u64) -> Self {
        let bar = ProgressBar::hidden();
        bar.set_length(total_files);
        Self { bar }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn message(&self) -> String {
        self.bar.message()
    }
}

impl ProgressObserver for ProgressManager {
    fn on_result(&self, result: &ProcessingResult, _progress: &SummaryReport) {
        let name = result.item.display_name();
        let message = if result.ok {
            format!("[OK] {}", name)
        } else {
            format!("[ERROR] {}", name)
        };
        self.bar.inc(1);
        self.bar.set_message(message);
    }

    fn on_finish(&self, report: &SummaryReport) {
        self.bar.finish_with_message(format!("Finished: {}", report));
    }
}
