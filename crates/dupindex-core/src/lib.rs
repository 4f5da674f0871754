pub mod config;
pub mod engine;
pub mod error;
pub mod hasher;
pub mod progress;
pub mod scanner;
pub mod storage;

pub use config::ScanConfig;
pub use engine::{ScanEngine, ScanPhase, ScanResult};
pub use error::{Error, ScanError};
pub use progress::{ProgressReporter, ProgressSnapshot, ScanProgress, SilentReporter};
pub use storage::{Database, DuplicateGroup, FileRecord, IndexStore};
