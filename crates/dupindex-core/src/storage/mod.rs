pub mod models;
mod queries;
mod sqlite;

pub use models::{group_by_fingerprint, DuplicateGroup, FileRecord};
pub use sqlite::Database;

use crate::error::Error;

/// The capabilities the scan pipeline and the duplicate queries need from an
/// index store. Implementations must tolerate concurrent calls from several
/// persistence workers.
pub trait IndexStore: Send + Sync {
    /// Persist `records` atomically, skipping locations already indexed.
    /// Returns the number of newly created records.
    fn persist_batch(&self, records: &[FileRecord]) -> Result<usize, Error>;

    fn find_by_fingerprint(&self, fingerprint: &str) -> Result<Vec<FileRecord>, Error>;

    fn find_duplicate_groups(&self) -> Result<Vec<FileRecord>, Error>;

    fn count_duplicate_groups(&self) -> Result<usize, Error>;
}

impl IndexStore for Database {
    fn persist_batch(&self, records: &[FileRecord]) -> Result<usize, Error> {
        self.insert_batch(records)
    }

    fn find_by_fingerprint(&self, fingerprint: &str) -> Result<Vec<FileRecord>, Error> {
        Database::find_by_fingerprint(self, fingerprint)
    }

    fn find_duplicate_groups(&self) -> Result<Vec<FileRecord>, Error> {
        Database::find_duplicate_groups(self)
    }

    fn count_duplicate_groups(&self) -> Result<usize, Error> {
        Database::count_duplicate_groups(self)
    }
}
