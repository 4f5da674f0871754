use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LOG_FILE: &str = "./logs/dupindex.log";

/// Split `LOG_FILE_PATH` into the appender's directory and file name.
fn log_file_location() -> (PathBuf, PathBuf) {
    let path = env::var("LOG_FILE_PATH").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
    let path = Path::new(&path);
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let file_name = path
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("dupindex.log"));
    (directory, file_name)
}

/// Human-readable events on stdout, plain events in the log file. The
/// returned guard flushes the file writer when dropped.
pub fn init_logger() -> WorkerGuard {
    let filter =
        EnvFilter::try_from_env("TRACING_LEVEL").unwrap_or_else(|_| EnvFilter::new("info"));

    let (directory, file_name) = log_file_location();
    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(&directory, &file_name));

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false)
        .without_time()
        .with_ansi(true);
    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_thread_names(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .with(filter)
        .init();

    debug!(
        "Logging to stdout and {}",
        directory.join(&file_name).display()
    );

    guard
}
