//! Tracing initialization and configuration.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "KUBERULE_LOG";

/// Filter used when `KUBERULE_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "kuberule=info";

/// Initialize the kube-rule tracing/logging system.
///
/// Reads `KUBERULE_LOG` for per-module log levels.
/// Format: `KUBERULE_LOG=kuberule_engine::merge=debug,kuberule_engine=info`
///
/// Falls back to `kuberule=info` if `KUBERULE_LOG` is not set or is invalid.
///
/// Idempotent. If another subscriber is already installed (e.g. by a test
/// harness or an embedding application), that subscriber is kept.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let _ = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(filter)
            .try_init();
    });
}
