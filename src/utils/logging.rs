//! Logging setup

use anyhow::Result;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install a console subscriber at `level`; `RUST_LOG` takes precedence.
///
/// Safe to call more than once: later calls leave the first subscriber in
/// place.
pub fn setup_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .try_init()
        .ok();

    Ok(())
}

/// Map a `-v` count onto a level, starting from the configured one.
///
/// `-v` asks for at least `debug`, `-vv` for `trace`; a base that is
/// already as verbose is kept.
pub fn level_for_verbosity(base: &str, verbose: u8) -> &str {
    let requested = match verbose {
        0 => return base,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    match base.parse::<Level>() {
        Ok(level) if level >= requested => base,
        _ => requested.as_str(),
    }
}
