use std::env;
use tracing::debug;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const FILTER_VAR: &str = "FIGURE_INSPECTOR_LOG";

pub fn init_logger() {
    let filter = env::var(FILTER_VAR).unwrap_or_else(|_| "info".to_string());
    let filter_layer = EnvFilter::new(filter);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time()
                .with_ansi(true),
        )
        .with(filter_layer)
        .init();

    debug!("Logging to stderr, filter from {}", FILTER_VAR);
}
