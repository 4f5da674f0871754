use crate::config::{self, ScanConfig};
use crate::error::{Error, ScanError};
use crate::progress::{ProgressReporter, ScanProgress};
use crate::scanner::{WalkStats, Walker};
use crate::storage::{Database, FileRecord, IndexStore};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Lifecycle of one scan. Phases only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    Idle,
    Counting,
    Scanning,
    Draining,
    Closed,
}

#[derive(Debug, Default, Clone)]
pub struct ScanResult {
    pub root: PathBuf,
    pub total_files: u64,
    pub records_sent: u64,
    pub records_inserted: u64,
    pub batches_committed: u64,
    pub batches_failed: u64,
    pub skipped_empty: u64,
    pub errors: u64,
    pub elapsed: Duration,
}

pub struct ScanEngine {
    config: ScanConfig,
}

#[derive(Debug, Default, Clone, Copy)]
struct WorkerTally {
    records_inserted: u64,
    batches_committed: u64,
    batches_failed: u64,
}

impl WorkerTally {
    fn merge(&mut self, other: WorkerTally) {
        self.records_inserted += other.records_inserted;
        self.batches_committed += other.batches_committed;
        self.batches_failed += other.batches_failed;
    }
}

impl ScanEngine {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Open the index database named by the configuration.
    pub fn open_store(&self) -> Result<Database, Error> {
        Database::open(&self.config.db_path)
    }

    /// Scan one root into `store`.
    ///
    /// Counts the files under `root`, starts the persistence workers and the
    /// error consumer, streams every file through the record queue, then
    /// waits for the workers to flush their final batches. Only an invalid
    /// root or configuration fails the call; per-file and per-batch failures
    /// are reported and counted in [`ScanResult::errors`].
    pub fn scan<S>(
        &self,
        store: &S,
        root: &Path,
        reporter: &dyn ProgressReporter,
    ) -> Result<ScanResult, Error>
    where
        S: IndexStore + ?Sized,
    {
        self.config.validate()?;
        reporter.on_phase(ScanPhase::Idle);
        let root = validate_root(root)?;

        let start = Instant::now();
        info!("Starting scan of {}", root.display());
        let walker = Walker::new(&root, &self.config.ignore_patterns);

        reporter.on_phase(ScanPhase::Counting);
        let total_files = walker.count_files();
        info!("{} files to process", total_files);
        reporter.on_count_complete(total_files);

        let progress = ScanProgress::new(total_files, reporter);
        let (record_tx, record_rx) = bounded::<FileRecord>(self.config.record_queue_capacity);
        let (error_tx, error_rx) = bounded::<ScanError>(self.config.error_queue_capacity);
        let batch_size = self.config.batch_size;

        let (walk, tally, errors) = thread::scope(|s| {
            let error_consumer = s.spawn(move || drain_errors(error_rx, reporter));

            let workers: Vec<_> = (0..self.config.workers)
                .map(|id| {
                    let records = record_rx.clone();
                    let errors = error_tx.clone();
                    let progress = &progress;
                    s.spawn(move || {
                        persist_worker(id, records, store, batch_size, &errors, progress)
                    })
                })
                .collect();
            drop(record_rx);

            reporter.on_phase(ScanPhase::Scanning);
            let walk = walker.stream(&record_tx, &error_tx);
            drop(record_tx);
            debug!(
                "Walk finished: {} files seen, {} records queued",
                walk.files_seen, walk.records_sent
            );

            reporter.on_phase(ScanPhase::Draining);
            let mut tally = WorkerTally::default();
            for worker in workers {
                match worker.join() {
                    Ok(worker_tally) => tally.merge(worker_tally),
                    Err(_) => error!("Persistence worker panicked"),
                }
            }

            drop(error_tx);
            let errors = error_consumer.join().unwrap_or_else(|_| {
                error!("Error consumer panicked");
                0
            });

            (walk, tally, errors)
        });

        reporter.on_phase(ScanPhase::Closed);
        let result = summarize(root, total_files, walk, tally, errors, start.elapsed());
        info!(
            "Scan completed in {:.2?}: {} records queued, {} new, {} batches ({} failed), {} errors",
            result.elapsed,
            result.records_sent,
            result.records_inserted,
            result.batches_committed + result.batches_failed,
            result.batches_failed,
            result.errors,
        );
        reporter.on_scan_complete(&result);

        Ok(result)
    }

    /// Scan every configured root, skipping roots nested under another.
    pub fn scan_configured<S>(
        &self,
        store: &S,
        reporter: &dyn ProgressReporter,
    ) -> Result<Vec<ScanResult>, Error>
    where
        S: IndexStore + ?Sized,
    {
        let roots = config::non_overlapping_directories(self.config.root_paths.clone());
        if roots.is_empty() {
            return Err(Error::Other("No root paths configured".to_string()));
        }
        info!("Processing directories: {:?}", roots);

        roots
            .iter()
            .map(|root| self.scan(store, Path::new(root), reporter))
            .collect()
    }
}

/// Setup check: the root must be an existing, listable directory. Returns
/// the canonical path so re-scans from another working directory hit the
/// same `(name, directory)` keys.
fn validate_root(root: &Path) -> Result<PathBuf, Error> {
    let invalid = |reason: String| Error::InvalidRoot {
        path: root.to_path_buf(),
        reason,
    };

    let canonical = fs::canonicalize(root).map_err(|e| invalid(e.to_string()))?;
    if !canonical.is_dir() {
        return Err(invalid("not a directory".to_string()));
    }
    fs::read_dir(&canonical).map_err(|e| invalid(e.to_string()))?;
    Ok(canonical)
}

fn summarize(
    root: PathBuf,
    total_files: u64,
    walk: WalkStats,
    tally: WorkerTally,
    errors: u64,
    elapsed: Duration,
) -> ScanResult {
    ScanResult {
        root,
        total_files,
        records_sent: walk.records_sent,
        records_inserted: tally.records_inserted,
        batches_committed: tally.batches_committed,
        batches_failed: tally.batches_failed,
        skipped_empty: walk.skipped_empty,
        errors,
        elapsed,
    }
}

/// Drain the record queue into batches of `batch_size`, flushing each full
/// batch and the final partial one. Returns once the queue is closed and
/// empty.
fn persist_worker<S>(
    id: usize,
    records: Receiver<FileRecord>,
    store: &S,
    batch_size: usize,
    errors: &Sender<ScanError>,
    progress: &ScanProgress<'_>,
) -> WorkerTally
where
    S: IndexStore + ?Sized,
{
    let mut tally = WorkerTally::default();
    let mut batch = Vec::with_capacity(batch_size);

    for record in records.iter() {
        batch.push(record);
        if batch.len() >= batch_size {
            flush_batch(store, &mut batch, errors, progress, &mut tally);
        }
    }
    if !batch.is_empty() {
        flush_batch(store, &mut batch, errors, progress, &mut tally);
    }

    debug!(
        worker = id,
        committed = tally.batches_committed,
        failed = tally.batches_failed,
        "Worker drained"
    );
    tally
}

fn flush_batch<S>(
    store: &S,
    batch: &mut Vec<FileRecord>,
    errors: &Sender<ScanError>,
    progress: &ScanProgress<'_>,
    tally: &mut WorkerTally,
) where
    S: IndexStore + ?Sized,
{
    match store.persist_batch(batch) {
        Ok(inserted) => {
            tally.batches_committed += 1;
            tally.records_inserted += inserted as u64;
        }
        Err(source) => {
            tally.batches_failed += 1;
            let err = ScanError::Persist {
                batch_len: batch.len(),
                source,
            };
            if let Err(unsent) = errors.send(err) {
                error!("Error queue closed, dropping: {}", unsent.into_inner());
            }
        }
    }
    progress.record_batch(batch.len() as u64);
    batch.clear();
}

/// Report every queued error until all senders are gone.
fn drain_errors(errors: Receiver<ScanError>, reporter: &dyn ProgressReporter) -> u64 {
    let mut count = 0;
    for err in errors.iter() {
        error!("Error during scan: {}", err);
        reporter.on_error(&err);
        count += 1;
    }
    count
}
