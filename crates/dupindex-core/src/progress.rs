use crate::engine::{ScanPhase, ScanResult};
use crate::error::ScanError;
use std::sync::{Mutex, PoisonError};

/// Trait for reporting scan progress.
///
/// The CLI implements it with indicatif. All methods have default no-op
/// implementations. Calls may arrive from any pipeline thread.
pub trait ProgressReporter: Send + Sync {
    fn on_phase(&self, _phase: ScanPhase) {}
    fn on_count_complete(&self, _total_files: u64) {}
    fn on_batch_committed(&self, _progress: &ProgressSnapshot) {}
    fn on_error(&self, _error: &ScanError) {}
    fn on_scan_complete(&self, _result: &ScanResult) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub processed_files: u64,
    pub batches: u64,
    pub total_files: u64,
}

impl ProgressSnapshot {
    /// Percentage complete, capped at 100. An empty scan counts as done.
    pub fn percent(&self) -> f64 {
        if self.total_files == 0 {
            return 100.0;
        }
        (self.processed_files as f64 / self.total_files as f64 * 100.0).min(100.0)
    }
}

#[derive(Debug, Default)]
struct Counters {
    processed_files: u64,
    batches: u64,
}

/// Shared completion counter for one scan, owned by the orchestrator and
/// lent to every persistence worker.
pub struct ScanProgress<'a> {
    total_files: u64,
    counters: Mutex<Counters>,
    reporter: &'a dyn ProgressReporter,
}

impl<'a> ScanProgress<'a> {
    pub fn new(total_files: u64, reporter: &'a dyn ProgressReporter) -> Self {
        Self {
            total_files,
            counters: Mutex::new(Counters::default()),
            reporter,
        }
    }

    /// Record one flushed batch of `files` records and emit the new status.
    /// The reporter runs inside the lock so emitted percentages never go
    /// backwards.
    pub fn record_batch(&self, files: u64) -> ProgressSnapshot {
        let mut counters = self
            .counters
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        counters.processed_files += files;
        counters.batches += 1;
        let snapshot = ProgressSnapshot {
            processed_files: counters.processed_files,
            batches: counters.batches,
            total_files: self.total_files,
        };
        self.reporter.on_batch_committed(&snapshot);
        snapshot
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        let counters = self
            .counters
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        ProgressSnapshot {
            processed_files: counters.processed_files,
            batches: counters.batches,
            total_files: self.total_files,
        }
    }
}
