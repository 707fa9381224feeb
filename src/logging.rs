//! Diagnostic logging setup.
//!
//! Library code emits `tracing` events; the binary installs a stderr
//! subscriber so stdout stays reserved for revealed values.  Events never
//! carry plaintext, passwords, keys, or envelopes.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "repovault=warn";

/// Install the global subscriber.  Safe to call more than once; later
/// calls are ignored.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
