use super::metadata;
use crate::error::ScanError;
use crate::storage::models::FileRecord;
use crossbeam_channel::Sender;
use glob::Pattern;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{error, trace};
use walkdir::{DirEntry, WalkDir};

/// Recursive, sequential traversal of one root in the filesystem's natural
/// order. Entries matching an ignore pattern are skipped; an ignored
/// directory is not descended into.
pub struct Walker {
    root: PathBuf,
    ignore_patterns: Vec<Pattern>,
}

/// Tallies from one streaming pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WalkStats {
    pub files_seen: u64,
    pub records_sent: u64,
    pub skipped_empty: u64,
    pub skipped_dir_links: u64,
    pub failures: u64,
}

impl Walker {
    pub fn new(root: impl Into<PathBuf>, ignore_globs: &[String]) -> Self {
        let ignore_patterns = ignore_globs
            .iter()
            .filter_map(|glob| match Pattern::new(glob) {
                Ok(p) => Some(p),
                Err(e) => {
                    error!("Invalid glob pattern '{}': {}", glob, e);
                    None
                }
            })
            .collect();

        Self {
            root: root.into(),
            ignore_patterns,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_ignored(&self, path: &Path) -> bool {
        self.ignore_patterns
            .iter()
            .any(|pattern| pattern.matches_path(path))
    }

    fn entries(&self) -> impl Iterator<Item = walkdir::Result<DirEntry>> + '_ {
        WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_entry(move |entry| !self.is_ignored(entry.path()))
    }

    /// Counting pass: number of non-directory entries under the root.
    /// Unreadable entries are skipped here; the streaming pass reports them.
    pub fn count_files(&self) -> u64 {
        let mut count = 0;
        for entry in self.entries() {
            match entry {
                Ok(entry) if !entry.file_type().is_dir() => count += 1,
                Ok(_) => {}
                Err(err) => trace!("Skipping unreadable entry while counting: {}", err),
            }
        }
        count
    }

    /// Visit every non-directory entry, and every traversal error, in walk
    /// order. The visitor returns `false` to stop early; after an error the
    /// walk continues with the next sibling.
    pub fn for_each_file(&self, mut visit: impl FnMut(WalkEvent<'_>) -> bool) {
        for entry in self.entries() {
            let keep_going = match entry {
                Ok(entry) if entry.file_type().is_dir() => true,
                Ok(entry) => visit(WalkEvent::File(entry.path())),
                Err(err) => {
                    let path = err
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| self.root.clone());
                    visit(WalkEvent::Error(ScanError::Traversal {
                        path,
                        source: io::Error::from(err),
                    }))
                }
            };
            if !keep_going {
                return;
            }
        }
    }

    /// Streaming pass: extract every file and forward non-empty records.
    ///
    /// Blocks whenever `records` is full. Stops early only if every receiver
    /// of `records` has gone away.
    pub fn stream(&self, records: &Sender<FileRecord>, errors: &Sender<ScanError>) -> WalkStats {
        let mut stats = WalkStats::default();

        let report = |stats: &mut WalkStats, err: ScanError| {
            stats.failures += 1;
            if let Err(unsent) = errors.send(err) {
                error!("Error queue closed, dropping: {}", unsent.into_inner());
            }
        };

        self.for_each_file(|event| match event {
            WalkEvent::Error(err) => {
                report(&mut stats, err);
                true
            }
            WalkEvent::File(path) => {
                stats.files_seen += 1;
                match metadata::extract(path) {
                    Ok(None) => {
                        stats.skipped_dir_links += 1;
                        true
                    }
                    Ok(Some(record)) if record.size == 0 => {
                        stats.skipped_empty += 1;
                        trace!("Skipping empty file {}", path.display());
                        true
                    }
                    Ok(Some(record)) => {
                        if records.send(record).is_err() {
                            error!("Record queue closed, stopping walk of {}", self.root.display());
                            return false;
                        }
                        stats.records_sent += 1;
                        true
                    }
                    Err(err) => {
                        report(&mut stats, err);
                        true
                    }
                }
            }
        });

        stats
    }
}

/// One step of a streaming walk.
#[derive(Debug)]
pub enum WalkEvent<'a> {
    File(&'a Path),
    Error(ScanError),
}
