//! Logging bootstrap for binaries and tests

use tracing::Level;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Install a stderr `fmt` subscriber filtered at `level`.
///
/// Libraries in this workspace only emit events; installing a subscriber is
/// left to the embedding application. Calling this twice is a no-op.
pub fn init_logging(level: Level) {
    let formatting_layer = fmt::layer()
        .with_ansi(true)
        .with_level(true)
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr);

    let filter_layer = tracing_subscriber::filter::LevelFilter::from_level(level);

    let _ = tracing_subscriber::registry()
        .with(formatting_layer)
        .with(filter_layer)
        .try_init();
}
