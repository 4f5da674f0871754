use crate::scanner::category::FileCategory;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// One file observed during a scan.
///
/// `id`, `created_at` and `updated_at` are assigned by the store on insert;
/// an unsaved record carries `id == 0` and empty timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub id: i64,
    pub name: String,
    pub extension: String,
    pub category: FileCategory,
    pub directory: String,
    pub size: i64,
    pub fingerprint: String,
    pub has_preview: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl FileRecord {
    /// Full path of the file at the time it was indexed.
    pub fn path(&self) -> PathBuf {
        PathBuf::from(&self.directory).join(&self.name)
    }
}

/// Records sharing one fingerprint. Derived on demand, never stored.
#[derive(Debug, Clone)]
pub struct DuplicateGroup {
    pub fingerprint: String,
    pub records: Vec<FileRecord>,
}

impl DuplicateGroup {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Bytes that would be reclaimed by keeping a single copy.
    pub fn wasted_bytes(&self) -> i64 {
        let size = self.records.first().map(|r| r.size).unwrap_or(0);
        size * (self.records.len() as i64 - 1).max(0)
    }
}

/// Fold a flat record list into groups keyed by fingerprint, keeping only
/// groups with at least two members. Groups come out ordered by fingerprint.
pub fn group_by_fingerprint(records: Vec<FileRecord>) -> Vec<DuplicateGroup> {
    let mut by_fingerprint: BTreeMap<String, Vec<FileRecord>> = BTreeMap::new();
    for record in records {
        by_fingerprint
            .entry(record.fingerprint.clone())
            .or_default()
            .push(record);
    }

    by_fingerprint
        .into_iter()
        .filter(|(_, records)| records.len() > 1)
        .map(|(fingerprint, records)| DuplicateGroup {
            fingerprint,
            records,
        })
        .collect()
}
