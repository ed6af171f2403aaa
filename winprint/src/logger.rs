//! Logging setup for the `winprint` binary

use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize the logger
///
/// `RUST_LOG` wins over `log_level`; both default to `winprint=info`.
/// When `log_dir` exists, output goes to a daily rolling file there
/// instead of stderr.
pub fn init_logger(log_level: Option<&str>, log_dir: Option<&str>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = log_level.unwrap_or("info");
        EnvFilter::new(format!("winprint={}", level))
    });

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    if let Some(dir) = log_dir
        && Path::new(dir).is_dir()
    {
        let file_appender = tracing_appender::rolling::daily(dir, "winprint");
        subscriber.with_ansi(false).with_writer(file_appender).init();
        return;
    }

    subscriber.with_writer(std::io::stderr).init();
}
