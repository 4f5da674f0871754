use dupindex_core::{ProgressReporter, ProgressSnapshot, ScanError, ScanPhase, ScanResult};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// CLI progress reporter using indicatif progress bars.
///
/// - Counting phase: spinner (total unknown)
/// - Scanning/draining: bar sized to the counted files
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        let guard = self.bar.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(pb) = guard.as_ref() {
            f(pb);
        }
    }

    /// Swap in a new bar (or none), clearing whatever was drawn before.
    fn replace_bar(&self, next: Option<ProgressBar>) {
        let previous = {
            let mut guard = self.bar.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *guard, next)
        };
        if let Some(pb) = previous {
            pb.finish_and_clear();
        }
    }
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

impl ProgressReporter for CliReporter {
    fn on_phase(&self, phase: ScanPhase) {
        match phase {
            ScanPhase::Counting => self.replace_bar(Some(spinner("Counting files..."))),
            ScanPhase::Draining => {
                self.with_bar(|pb| pb.set_message("flushing remaining batches"));
            }
            _ => {}
        }
    }

    fn on_count_complete(&self, total_files: u64) {
        let pb = ProgressBar::new(total_files);
        if let Ok(style) = ProgressStyle::with_template(
            "  {spinner:.cyan} Indexing [{bar:30.cyan/dim}] {pos}/{len} files {msg}",
        ) {
            pb.set_style(style.progress_chars("━╸─").tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
        }
        pb.enable_steady_tick(Duration::from_millis(80));
        self.replace_bar(Some(pb));
    }

    fn on_batch_committed(&self, progress: &ProgressSnapshot) {
        self.with_bar(|pb| {
            pb.set_position(progress.processed_files.min(progress.total_files));
            pb.set_message(format!("({:.2}%)", progress.percent()));
        });
    }

    fn on_error(&self, error: &ScanError) {
        let message = format!("  \x1b[31m✗\x1b[0m {}", error);
        let guard = self.bar.lock().unwrap_or_else(PoisonError::into_inner);
        match guard.as_ref() {
            Some(pb) => pb.println(message),
            None => eprintln!("{}", message),
        }
    }

    fn on_scan_complete(&self, _result: &ScanResult) {
        // The summary itself is printed by the scan command.
        self.replace_bar(None);
    }
}
