//! Subscriber setup for binaries and embedding applications.

use crate::{Error, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter from `RUST_LOG` when set, otherwise `level`.
pub fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install a stderr fmt subscriber.
///
/// Returns `Ok(false)` when a global subscriber is already installed.
pub fn init_tracing(level: &str) -> Result<bool> {
    let filter = env_filter(level);
    match tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
    {
        Ok(()) => Ok(true),
        Err(e) if tracing::dispatcher::has_been_set() => {
            tracing::debug!(error = %e, "Tracing subscriber already installed");
            Ok(false)
        }
        Err(e) => Err(Error::configuration(format!(
            "failed to install tracing subscriber: {}",
            e
        ))),
    }
}
