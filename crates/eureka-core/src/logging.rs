//! Structured logging setup.
//!
//! `RUST_LOG` takes precedence over the configured level. Initialization
//! happens once per process; later calls are no-ops.

use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LogConfig;

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

pub fn init_logging(config: &LogConfig) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let (filter, rejected) = match EnvFilter::try_from_default_env() {
            Ok(filter) => (filter, None),
            Err(_) => match EnvFilter::try_new(&config.level) {
                Ok(filter) => (filter, None),
                Err(err) => (EnvFilter::new("info"), Some(err)),
            },
        };

        let (plain, json) = if config.json {
            (None, Some(fmt::layer().json().with_target(true)))
        } else {
            (Some(fmt::layer().with_target(true)), None)
        };

        // a host application may already have installed a subscriber
        if tracing_subscriber::registry()
            .with(filter)
            .with(plain)
            .with(json)
            .try_init()
            .is_err()
        {
            tracing::debug!("global tracing subscriber already initialized");
        }

        if let Some(err) = rejected {
            tracing::warn!(level = %config.level, error = %err, "invalid log level, using info");
        }
        tracing::debug!(level = %config.level, json = config.json, "logging initialized");
    });
}
