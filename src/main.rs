use std::process::ExitCode;

use sphereplane::{cli, config};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "sphereplane=info";

/// `--log-level` wins over `RUST_LOG`; anything unparsable falls back to the default.
fn log_filter(log_level: Option<&str>) -> EnvFilter {
    let requested = match log_level {
        Some(level) => EnvFilter::try_new(level).ok(),
        None => EnvFilter::try_from_default_env().ok(),
    };
    requested.unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn main() -> ExitCode {
    let args = cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(args.log_level.as_deref()))
        .init();

    tracing::info!("sphereplane v{} starting", env!("CARGO_PKG_VERSION"));

    let config = match config::load_or_default(args.config.as_deref()) {
        Ok(config) => args.apply(config),
        Err(e) => {
            tracing::error!("failed to load config: {e}");
            return ExitCode::FAILURE;
        }
    };

    match sphereplane::run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
