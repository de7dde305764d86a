//! Logging setup and span helpers.

use std::sync::Once;

use serde::{Deserialize, Serialize};
use tracing::Span;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON structured logs.
    Json,
    /// Pretty-printed logs.
    #[default]
    Pretty,
}

/// Initializes the logging subsystem.
///
/// Safe to call more than once; later calls are no-ops. `RUST_LOG` controls
/// levels and defaults to `info`.
pub fn init_logging(format: LogFormat) {
    INIT.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        match format {
            LogFormat::Json => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().json())
                    .init();
            }
            LogFormat::Pretty => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().pretty())
                    .init();
            }
        }
    });
}

/// Span for one entity operation.
#[must_use]
pub fn entity_span(operation: &str, namespace: &str, table: &str) -> Span {
    tracing::info_span!(
        "entity",
        op = operation,
        namespace = namespace,
        table = table,
    )
}
