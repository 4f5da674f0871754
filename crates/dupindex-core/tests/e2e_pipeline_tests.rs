use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use tempfile::tempdir;

use dupindex_core::hasher::fingerprint_bytes;
use dupindex_core::storage::{group_by_fingerprint, Database};
use dupindex_core::{
    ProgressReporter, ProgressSnapshot, ScanConfig, ScanEngine, ScanError, ScanResult,
    SilentReporter,
};

/// Create a temp directory tree with known duplicates.
/// Layout:
///   root/
///     folder_a/
///       unique_a.txt     ("unique content a")
///       shared.txt       ("shared content xyz")
///     folder_b/
///       unique_b.txt     ("unique content b")
///       shared.txt       ("shared content xyz")  ← duplicate of folder_a/shared.txt
///       empty.txt        (0 bytes)               ← never indexed
///     folder_c/
///       large_dup_1.bin  (4KB of 0xAA)
///       large_dup_2.bin  (4KB of 0xAA)            ← duplicate within same folder
fn create_test_tree(root: &Path) {
    let folder_a = root.join("folder_a");
    let folder_b = root.join("folder_b");
    let folder_c = root.join("folder_c");
    fs::create_dir_all(&folder_a).unwrap();
    fs::create_dir_all(&folder_b).unwrap();
    fs::create_dir_all(&folder_c).unwrap();

    fs::write(folder_a.join("unique_a.txt"), "unique content a").unwrap();
    fs::write(folder_b.join("unique_b.txt"), "unique content b").unwrap();

    fs::write(folder_a.join("shared.txt"), "shared content xyz").unwrap();
    fs::write(folder_b.join("shared.txt"), "shared content xyz").unwrap();

    fs::write(folder_b.join("empty.txt"), "").unwrap();

    let large_content = vec![0xAAu8; 4096];
    let mut f1 = fs::File::create(folder_c.join("large_dup_1.bin")).unwrap();
    f1.write_all(&large_content).unwrap();
    let mut f2 = fs::File::create(folder_c.join("large_dup_2.bin")).unwrap();
    f2.write_all(&large_content).unwrap();
}

fn small_batches() -> ScanConfig {
    ScanConfig {
        workers: 3,
        batch_size: 2,
        record_queue_capacity: 4,
        error_queue_capacity: 4,
        ..ScanConfig::default()
    }
}

#[derive(Default)]
struct RecordingReporter {
    totals: Mutex<Vec<u64>>,
    snapshots: Mutex<Vec<ProgressSnapshot>>,
    errors: Mutex<Vec<String>>,
    completed: Mutex<Option<ScanResult>>,
}

impl ProgressReporter for RecordingReporter {
    fn on_count_complete(&self, total_files: u64) {
        self.totals.lock().unwrap().push(total_files);
    }

    fn on_batch_committed(&self, progress: &ProgressSnapshot) {
        self.snapshots.lock().unwrap().push(*progress);
    }

    fn on_error(&self, error: &ScanError) {
        self.errors.lock().unwrap().push(error.to_string());
    }

    fn on_scan_complete(&self, result: &ScanResult) {
        *self.completed.lock().unwrap() = Some(result.clone());
    }
}

#[test]
fn test_full_scan_pipeline() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("scan_root");
    create_test_tree(&root);

    let db_dir = tempdir().unwrap();
    let db = Database::open(db_dir.path().join("test_e2e.db")).unwrap();

    let engine = ScanEngine::new(small_batches());
    let reporter = RecordingReporter::default();
    let result = engine.scan(&db, &root, &reporter).unwrap();

    assert_eq!(result.total_files, 7);
    assert_eq!(result.records_sent, 6);
    assert_eq!(result.skipped_empty, 1);
    assert_eq!(result.records_inserted, 6);
    assert_eq!(result.batches_failed, 0);
    assert_eq!(result.errors, 0);
    assert_eq!(db.count_records().unwrap(), 6);

    // shared.txt pair + large_dup pair
    let dupes = db.find_duplicate_groups().unwrap();
    assert_eq!(dupes.len(), 4);
    assert_eq!(db.count_duplicate_groups().unwrap(), 4);
    let groups = group_by_fingerprint(dupes);
    assert_eq!(groups.len(), 2);
    for group in &groups {
        assert_eq!(group.len(), 2, "Each duplicate group should have 2 files");
    }

    assert_eq!(*reporter.totals.lock().unwrap(), vec![7]);
    let snapshots = reporter.snapshots.lock().unwrap();
    assert_eq!(snapshots.len() as u64, result.batches_committed);
    assert!(snapshots
        .windows(2)
        .all(|w| w[0].processed_files < w[1].processed_files));
    assert_eq!(snapshots.last().unwrap().processed_files, 6);
    assert!(reporter.completed.lock().unwrap().is_some());
}

#[test]
fn test_three_file_example() {
    let tmp = tempdir().unwrap();
    fs::write(tmp.path().join("a.txt"), "X").unwrap();
    fs::write(tmp.path().join("b.txt"), "X").unwrap();
    fs::write(tmp.path().join("c.txt"), "Y").unwrap();

    let db = Database::open_in_memory().unwrap();
    ScanEngine::new(ScanConfig::default())
        .scan(&db, tmp.path(), &SilentReporter)
        .unwrap();

    assert_eq!(db.count_records().unwrap(), 3);
    assert_eq!(db.count_distinct_fingerprints().unwrap(), 2);

    let dupes = db.find_duplicate_groups().unwrap();
    let mut names: Vec<&str> = dupes.iter().map(|r| r.name.as_str()).collect();
    names.sort();
    assert_eq!(names, vec!["a.txt", "b.txt"]);
    assert!(dupes.iter().all(|r| r.fingerprint == fingerprint_bytes(b"X")));
    assert_eq!(db.count_duplicate_groups().unwrap(), 2);

    let lone = db.find_by_fingerprint(&fingerprint_bytes(b"Y")).unwrap();
    assert_eq!(lone.len(), 1);
    assert_eq!(lone[0].name, "c.txt");
}

#[test]
fn test_rescan_is_idempotent() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("scan_twice");
    create_test_tree(&root);

    let db = Database::open_in_memory().unwrap();
    let engine = ScanEngine::new(small_batches());

    let first = engine.scan(&db, &root, &SilentReporter).unwrap();
    let after_first = db.count_records().unwrap();
    let second = engine.scan(&db, &root, &SilentReporter).unwrap();

    assert_eq!(first.records_inserted, 6);
    assert_eq!(second.records_sent, 6);
    assert_eq!(second.records_inserted, 0);
    assert_eq!(db.count_records().unwrap(), after_first);
}

#[test]
fn test_rescan_picks_up_new_locations_only() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("grow");
    fs::create_dir_all(&root).unwrap();
    fs::write(root.join("one.txt"), "first").unwrap();

    let db = Database::open_in_memory().unwrap();
    let engine = ScanEngine::new(ScanConfig::default());
    engine.scan(&db, &root, &SilentReporter).unwrap();

    // Edited in place: same location, so the stale record is kept as-is.
    fs::write(root.join("one.txt"), "first, edited").unwrap();
    fs::write(root.join("copy.txt"), "first").unwrap();
    let result = engine.scan(&db, &root, &SilentReporter).unwrap();

    assert_eq!(result.records_inserted, 1);
    assert_eq!(db.count_records().unwrap(), 2);
    assert_eq!(db.count_duplicate_groups().unwrap(), 2);
}

#[test]
fn test_persistence_failure_drops_only_that_batch() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("faulty");
    fs::create_dir_all(&root).unwrap();
    for i in 0..9 {
        fs::write(root.join(format!("file{}.dat", i)), format!("content {}", i)).unwrap();
    }
    fs::write(root.join("poison.bin"), "boom").unwrap();

    let db = Database::open_in_memory().unwrap();
    db.connection()
        .unwrap()
        .execute_batch(
            "CREATE TRIGGER simulated_fault BEFORE INSERT ON file_record \
             WHEN NEW.name = 'poison.bin' \
             BEGIN SELECT RAISE(ABORT, 'simulated storage fault'); END;",
        )
        .unwrap();

    let engine = ScanEngine::new(ScanConfig {
        workers: 1,
        batch_size: 5,
        ..ScanConfig::default()
    });
    let reporter = RecordingReporter::default();
    let result = engine.scan(&db, &root, &reporter).unwrap();

    assert_eq!(result.records_sent, 10);
    assert_eq!(result.batches_committed, 1);
    assert_eq!(result.batches_failed, 1);
    assert_eq!(result.records_inserted, 5);
    assert_eq!(result.errors, 1);
    assert_eq!(db.count_records().unwrap(), 5);
    assert!(db.find_by_fingerprint(&fingerprint_bytes(b"boom")).unwrap().is_empty());

    let errors = reporter.errors.lock().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("batch of 5"));
}

#[cfg(unix)]
#[test]
fn test_unreadable_entries_do_not_abort_scan() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("partial");
    fs::create_dir_all(&root).unwrap();
    fs::write(root.join("good.txt"), "fine").unwrap();
    std::os::unix::fs::symlink(root.join("nowhere"), root.join("dangling")).unwrap();

    let db = Database::open_in_memory().unwrap();
    let reporter = RecordingReporter::default();
    let result = ScanEngine::new(ScanConfig::default())
        .scan(&db, &root, &reporter)
        .unwrap();

    assert_eq!(result.total_files, 2);
    assert_eq!(result.records_inserted, 1);
    assert_eq!(result.errors, 1);
    assert!(reporter.errors.lock().unwrap()[0].contains("dangling"));
}

#[cfg(unix)]
#[test]
fn test_named_pipe_does_not_block_scan() {
    use std::sync::mpsc;
    use std::time::Duration;

    let tmp = tempdir().unwrap();
    let root = tmp.path().join("with_fifo");
    fs::create_dir_all(&root).unwrap();
    fs::write(root.join("good.txt"), "fine").unwrap();
    let status = std::process::Command::new("mkfifo")
        .arg(root.join("pipe"))
        .status()
        .unwrap();
    assert!(status.success());

    let (done_tx, done_rx) = mpsc::channel();
    std::thread::spawn(move || {
        let db = Database::open_in_memory().unwrap();
        let reporter = RecordingReporter::default();
        let result = ScanEngine::new(ScanConfig::default())
            .scan(&db, &root, &reporter)
            .unwrap();
        let names: Vec<String> = db
            .find_all_paginated(10, 0)
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        let errors = reporter.errors.lock().unwrap().clone();
        done_tx.send((result, names, errors)).unwrap();
    });

    let (result, names, errors) = done_rx
        .recv_timeout(Duration::from_secs(10))
        .expect("scan blocked on a named pipe");

    assert_eq!(result.total_files, 2);
    assert_eq!(result.records_inserted, 1);
    assert_eq!(names, vec!["good.txt"]);
    assert_eq!(result.errors, 1);
    assert!(errors[0].contains("Not a regular file"));
}

#[cfg(unix)]
#[test]
fn test_symlink_to_directory_is_not_an_error() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("linked");
    fs::create_dir_all(root.join("real")).unwrap();
    fs::write(root.join("real").join("inside.txt"), "inside").unwrap();
    std::os::unix::fs::symlink(root.join("real"), root.join("alias")).unwrap();

    let db = Database::open_in_memory().unwrap();
    let reporter = RecordingReporter::default();
    let result = ScanEngine::new(ScanConfig::default())
        .scan(&db, &root, &reporter)
        .unwrap();

    assert_eq!(result.errors, 0);
    assert!(reporter.errors.lock().unwrap().is_empty());
    // Links are not followed, so the file is indexed once.
    assert_eq!(db.count_records().unwrap(), 1);
}

#[test]
fn test_empty_directory_scan() {
    let tmp = tempdir().unwrap();
    let db = Database::open_in_memory().unwrap();
    let result = ScanEngine::new(ScanConfig::default())
        .scan(&db, tmp.path(), &SilentReporter)
        .unwrap();

    assert_eq!(result.total_files, 0);
    assert_eq!(result.batches_committed, 0);
    assert_eq!(db.count_records().unwrap(), 0);
}

#[test]
fn test_scan_with_ignore_patterns() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("scan_ignore");
    create_test_tree(&root);

    let db = Database::open_in_memory().unwrap();
    let config = ScanConfig {
        ignore_patterns: vec!["**/folder_c".to_string()],
        ..ScanConfig::default()
    };
    let result = ScanEngine::new(config)
        .scan(&db, &root, &SilentReporter)
        .unwrap();

    assert_eq!(result.total_files, 5);
    assert_eq!(db.count_records().unwrap(), 4);
    assert_eq!(db.count_duplicate_groups().unwrap(), 2);
}

#[test]
fn test_scan_configured_roots() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("multi");
    create_test_tree(&root);

    let config = ScanConfig {
        root_paths: vec![
            root.join("folder_a").to_string_lossy().into_owned(),
            root.join("folder_b").to_string_lossy().into_owned(),
            root.join("folder_a").join("..").join("folder_a").to_string_lossy().into_owned(),
        ],
        ..ScanConfig::default()
    };

    let db = Database::open_in_memory().unwrap();
    let results = ScanEngine::new(config)
        .scan_configured(&db, &SilentReporter)
        .unwrap();

    assert!(results.len() >= 2);
    // The third entry names folder_a again and must not add records.
    assert_eq!(db.count_records().unwrap(), 4);
    let dupes = db.find_duplicate_groups().unwrap();
    assert_eq!(dupes.len(), 2);
    assert!(dupes.iter().all(|r| r.name == "shared.txt"));
}
