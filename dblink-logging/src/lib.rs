pub use log::*;

use dblink_core::err::{Context, Result};

/// Installs the process-wide logger.
/// `RUST_LOG` overrides the default `info` level.
pub fn init_logging() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init()
        .context("Failed to install logger")
}

/// Logger setup for test binaries. Safe to call from every test, later
/// calls are no-ops.
pub fn init_for_tests() {
    let _ = env_logger::builder()
        .filter_module("dblink", LevelFilter::Trace)
        .is_test(true)
        .try_init();
}
