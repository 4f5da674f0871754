use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Invalid scan root {}: {reason}", path.display())]
    InvalidRoot { path: PathBuf, reason: String },

    #[error("Index store lock poisoned")]
    LockPoisoned,

    #[error("{0}")]
    Other(String),
}

/// A failure scoped to a single path or a single batch.
///
/// These travel through the pipeline's error queue and are only ever
/// reported; none of them stops a running scan.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Error accessing {}: {source}", path.display())]
    Traversal {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Error opening {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Error reading metadata for {}: {source}", path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Error hashing {}: {source}", path.display())]
    Fingerprint {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Not a regular file: {}", path.display())]
    NotAFile { path: PathBuf },

    #[error("Error saving batch of {batch_len} records: {source}")]
    Persist {
        batch_len: usize,
        #[source]
        source: Error,
    },
}

impl ScanError {
    /// The file this error covers, if it is file-scoped.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            ScanError::Traversal { path, .. }
            | ScanError::Open { path, .. }
            | ScanError::Stat { path, .. }
            | ScanError::Fingerprint { path, .. }
            | ScanError::NotAFile { path } => Some(path),
            ScanError::Persist { .. } => None,
        }
    }
}
