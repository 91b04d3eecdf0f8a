//! Structured logging initialization.
//!
//! Uses the tracing crate; the level comes from `RUST_LOG` when set,
//! otherwise from the configured default. Audit events are emitted under
//! the `audit` target by the guard itself.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub fn init(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("edge_guard={default_level},audit=info").into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
