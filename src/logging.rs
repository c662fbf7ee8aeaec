use anyhow::{Result, anyhow};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;

/// Set up the global subscriber with a daily-rolling log file. Call once at
/// startup from the embedding binary; the returned guard must be held for
/// the lifetime of the process or buffered lines are lost.
pub fn init_file_logging(directory: &str) -> Result<WorkerGuard> {
    let file_appender = rolling::daily(directory, "payroll.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .try_init()
        .map_err(|e| anyhow!("failed to set global subscriber: {e}"))?;

    Ok(guard)
}
