//! Tracing subscriber setup for binaries and tests embedding the crate.
use once_cell::sync::OnceCell;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{Error, Result};

/// Environment variable holding the filter directives, e.g. `TONIC_LOG=tonic_telemetry=debug`
pub const LOG_ENV: &str = "TONIC_LOG";

static INSTALLED: OnceCell<()> = OnceCell::new();

/// Installs a global fmt subscriber filtered by [`LOG_ENV`], defaulting to `info`.
///
/// Calling it again is a no-op. Fails only when another subscriber was
/// installed by someone else first.
pub fn init() -> Result<()> {
    INSTALLED
        .get_or_try_init(|| {
            let filter =
                EnvFilter::builder().with_default_directive(LevelFilter::INFO.into()).with_env_var(LOG_ENV).from_env_lossy();

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().compact().with_target(true))
                .try_init()
                .map_err(|e| Error::system(format!("failed to install tracing subscriber: {e}")))
        })
        .map(|_| ())
}
