use std::process::ExitCode;
use tracing::error;
use winprint::{PrintConfig, PrintService, SystemBackend, logger};

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let log_level = std::env::var("WINPRINT_LOG_LEVEL").ok().filter(|v| !v.is_empty());
    let log_dir = std::env::var("WINPRINT_LOG_DIR").ok().filter(|v| !v.is_empty());
    logger::init_logger(log_level.as_deref(), log_dir.as_deref());

    let config = match PrintConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let service = PrintService::new(SystemBackend::default(), config);
    match service.print_default() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(kind = %e.kind(), "Printing failed");
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
