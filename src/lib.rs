pub mod config;
pub mod db;
pub mod error;
pub mod logging;

pub use config::{Config, DbConfig, LogConfig};
pub use db::{FeedbackMessage, FetchMode, Listing, QueryExecutor, Store, TrappedRecord, User};
pub use error::{ErrorKind, StoreError};
