use super::models::FileRecord;
use super::sqlite::Database;
use crate::error::Error;
use crate::scanner::category::FileCategory;
use rusqlite::{params, Row};
use tracing::debug;

const RECORD_COLUMNS: &str = "id, name, extension, category, directory, size, fingerprint, \
                              has_preview, created_at, updated_at";

const DUPLICATE_FINGERPRINTS: &str =
    "SELECT fingerprint FROM file_record GROUP BY fingerprint HAVING COUNT(*) > 1";

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<FileRecord> {
    let category: String = row.get(3)?;
    Ok(FileRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        extension: row.get(2)?,
        category: FileCategory::from_label(&category),
        directory: row.get(4)?,
        size: row.get(5)?,
        fingerprint: row.get(6)?,
        has_preview: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

impl Database {
    // ── Writes ───────────────────────────────────────────────────

    /// Persist a batch as one transaction.
    ///
    /// A record whose `(name, directory)` is already indexed is left alone.
    /// Returns the number of rows actually inserted. On any failure the
    /// whole batch is rolled back.
    pub fn insert_batch(&self, records: &[FileRecord]) -> Result<usize, Error> {
        let mut conn = self.connection()?;
        let tx = conn.transaction()?;
        let mut inserted = 0;
        {
            let now = chrono::Utc::now().to_rfc3339();
            let mut stmt = tx.prepare_cached(
                "INSERT INTO file_record \
                 (name, extension, category, directory, size, fingerprint, \
                  has_preview, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8) \
                 ON CONFLICT(name, directory) DO NOTHING",
            )?;
            for record in records {
                inserted += stmt.execute(params![
                    record.name,
                    record.extension,
                    record.category.as_str(),
                    record.directory,
                    record.size,
                    record.fingerprint,
                    record.has_preview,
                    now,
                ])?;
            }
        }
        tx.commit()?;
        debug!(
            "Committed batch of {} records ({} new)",
            records.len(),
            inserted
        );
        Ok(inserted)
    }

    // ── Lookups ──────────────────────────────────────────────────

    pub fn exists_at(&self, name: &str, directory: &str) -> Result<bool, Error> {
        let found: i64 = self.connection()?.query_row(
            "SELECT EXISTS(SELECT 1 FROM file_record WHERE name = ?1 AND directory = ?2)",
            params![name, directory],
            |row| row.get(0),
        )?;
        Ok(found != 0)
    }

    pub fn find_by_fingerprint(&self, fingerprint: &str) -> Result<Vec<FileRecord>, Error> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {RECORD_COLUMNS} FROM file_record WHERE fingerprint = ?1 ORDER BY id"
        ))?;
        let records = stmt
            .query_map(params![fingerprint], record_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    // ── Duplicates ───────────────────────────────────────────────

    /// Every record whose fingerprint occurs more than once, ordered by
    /// fingerprint.
    pub fn find_duplicate_groups(&self) -> Result<Vec<FileRecord>, Error> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {RECORD_COLUMNS} FROM file_record \
             WHERE fingerprint IN ({DUPLICATE_FINGERPRINTS}) \
             ORDER BY fingerprint, id"
        ))?;
        let records = stmt
            .query_map([], record_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    /// Number of records in the duplicate set (rows, not distinct
    /// fingerprints).
    pub fn count_duplicate_groups(&self) -> Result<usize, Error> {
        let count: i64 = self.connection()?.query_row(
            &format!(
                "SELECT COUNT(*) FROM file_record WHERE fingerprint IN ({DUPLICATE_FINGERPRINTS})"
            ),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    // ── Stats & Listing ──────────────────────────────────────────

    pub fn count_records(&self) -> Result<usize, Error> {
        let count: i64 =
            self.connection()?
                .query_row("SELECT COUNT(*) FROM file_record", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn count_distinct_fingerprints(&self) -> Result<usize, Error> {
        let count: i64 = self.connection()?.query_row(
            "SELECT COUNT(DISTINCT fingerprint) FROM file_record",
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// One page of records in insertion order. Pages are zero-based; a page
    /// past the end is empty.
    pub fn find_all_paginated(
        &self,
        items_per_page: usize,
        page: usize,
    ) -> Result<Vec<FileRecord>, Error> {
        let limit = i64::try_from(items_per_page).unwrap_or(i64::MAX);
        let offset = i64::try_from(items_per_page.saturating_mul(page)).unwrap_or(i64::MAX);

        let conn = self.connection()?;
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {RECORD_COLUMNS} FROM file_record \
             ORDER BY created_at ASC, id ASC LIMIT ?1 OFFSET ?2"
        ))?;
        let records = stmt
            .query_map(params![limit, offset], record_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }
}
