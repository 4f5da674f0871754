use super::category::FileCategory;
use crate::error::ScanError;
use crate::hasher;
use crate::storage::models::FileRecord;
use std::fs::{self, File};
use std::path::Path;
use tracing::trace;

/// Build an unsaved [`FileRecord`] for the file at `path`.
///
/// The entry is stat'ed (following symlinks) before it is opened, so pipes,
/// sockets and devices are rejected without blocking. A symlink whose target
/// is a directory yields `Ok(None)` and is skipped without an error.
///
/// Each failure is scoped to this one path: the caller reports it and moves
/// on to the next entry.
pub fn extract(path: &Path) -> Result<Option<FileRecord>, ScanError> {
    let metadata = fs::metadata(path).map_err(|source| ScanError::Stat {
        path: path.to_path_buf(),
        source,
    })?;

    if metadata.is_dir() {
        trace!("Skipping link to directory {}", path.display());
        return Ok(None);
    }
    if !metadata.is_file() {
        return Err(ScanError::NotAFile {
            path: path.to_path_buf(),
        });
    }

    let mut file = File::open(path).map_err(|source| ScanError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let fingerprint = hasher::fingerprint(&mut file).map_err(|source| ScanError::Fingerprint {
        path: path.to_path_buf(),
        source,
    })?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let extension = extension_of(&name);
    let category = FileCategory::from_extension(&extension);

    let directory = path
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default();

    trace!("Extracted {} ({} bytes, {})", path.display(), metadata.len(), fingerprint);

    Ok(Some(FileRecord {
        id: 0,
        name,
        extension,
        category,
        directory,
        size: i64::try_from(metadata.len()).unwrap_or(i64::MAX),
        fingerprint,
        has_preview: false,
        created_at: String::new(),
        updated_at: String::new(),
    }))
}

/// Lower-cased text after the last dot of a file name, empty if there is no
/// dot. A leading dot counts, so `.bashrc` has the extension `bashrc`.
pub fn extension_of(file_name: &str) -> String {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default()
}
