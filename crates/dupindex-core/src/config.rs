use crate::error::Error;
use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Roots scanned when no directory is given explicitly.
    pub root_paths: Vec<String>,
    /// Glob patterns for paths to leave out of both walker passes.
    pub ignore_patterns: Vec<String>,
    pub db_path: String,
    /// Number of persistence workers.
    pub workers: usize,
    /// Records per transaction.
    pub batch_size: usize,
    pub record_queue_capacity: usize,
    pub error_queue_capacity: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            root_paths: Vec::new(),
            ignore_patterns: Vec::new(),
            db_path: "dupindex.db".to_string(),
            workers: 5,
            batch_size: 100,
            record_queue_capacity: 1000,
            error_queue_capacity: 100,
        }
    }
}

impl ScanConfig {
    pub fn validate(&self) -> Result<(), Error> {
        let checks = [
            ("workers", self.workers),
            ("batch_size", self.batch_size),
            ("record_queue_capacity", self.record_queue_capacity),
            ("error_queue_capacity", self.error_queue_capacity),
        ];
        for (name, value) in checks {
            if value == 0 {
                return Err(Error::Other(format!("{} must be greater than zero", name)));
            }
        }
        Ok(())
    }
}

/// Defaults, then an optional `Config.toml`, then `DUPINDEX_*` environment
/// variables.
pub fn load_configuration() -> Result<ScanConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("Config").required(false))
        .add_source(
            Environment::with_prefix("DUPINDEX")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("root_paths")
                .with_list_parse_key("ignore_patterns"),
        )
        .build()?;
    builder.try_deserialize::<ScanConfig>()
}

/// Remove directories that are subdirectories of other directories in the list.
pub fn non_overlapping_directories(dirs: Vec<String>) -> Vec<String> {
    let mut result: Vec<String> = Vec::new();

    for dir in dirs {
        let dir_path = Path::new(&dir);
        if result.iter().any(|kept| dir_path.starts_with(kept)) {
            continue;
        }
        result.retain(|kept| !Path::new(kept).starts_with(dir_path));
        result.push(dir);
    }

    result
}
