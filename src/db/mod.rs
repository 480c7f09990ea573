//! Database module: pool, statement executor, schema, and table helpers.
//!
//! Layout:
//! - `schema.rs`: DDL for the three tables
//! - `models.rs`: Rust structs mirroring DB rows
//! - `executor.rs`: parameterized statement execution over the pool
//! - `store.rs`: table-specific helpers built on the executor

pub mod executor;
pub mod models;
pub mod schema;
pub mod store;

pub use executor::{FetchMode, Fetched, Param, QueryExecutor};
pub use models::{FeedbackMessage, Listing, TrappedRecord, User};
pub use store::Store;

use sqlx::AnyPool;
use sqlx::any::AnyPoolOptions;
use tracing::{error, info};

use crate::config::DbConfig;
use crate::error::StoreError;

/// Build the fixed-size connection pool described by `cfg`.
///
/// The URL scheme selects the driver (`mysql://` by default, `sqlite:` when
/// `DB_URL` points at a file).
pub async fn connect(cfg: &DbConfig) -> Result<AnyPool, StoreError> {
    sqlx::any::install_default_drivers();

    let url = cfg.connection_url()?;
    let pool = AnyPoolOptions::new()
        .max_connections(cfg.pool_size)
        .acquire_timeout(cfg.acquire_timeout())
        .connect(&url)
        .await
        .map_err(|e| {
            let err = StoreError::from(e);
            error!(host = %cfg.host, database = %cfg.database, error = %err, "Failed to create connection pool");
            err
        })?;

    info!(pool_size = cfg.pool_size, "Connection pool ready");
    Ok(pool)
}
