//! Tracing subscriber setup: timestamped lines on stdout, optionally
//! mirrored without ANSI colours into an append-only log file.

use std::{fs::OpenOptions, sync::Arc};
use tracing::Subscriber;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LogConfig;
use crate::error::StoreError;

/// Install the global subscriber. `RUST_LOG` takes precedence over `loglevel`.
pub fn init(cfg: &LogConfig) -> Result<(), StoreError> {
    subscriber(cfg)?
        .try_init()
        .map_err(|e| StoreError::Config(format!("logging already initialised: {e}")))
}

/// Build the subscriber without installing it.
pub fn subscriber(cfg: &LogConfig) -> Result<impl Subscriber + Send + Sync + 'static, StoreError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));

    let file_layer = match cfg.log_file.as_ref() {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| {
                    StoreError::Config(format!("cannot open log file {}: {e}", path.display()))
                })?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_level(true)
                    .with_target(false)
                    .with_writer(Arc::new(file)),
            )
        }
        None => None,
    };

    Ok(tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .with(file_layer))
}
