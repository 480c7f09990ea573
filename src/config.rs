//! Runtime configuration loaded from the environment.
//!
//! Database settings come from `DB_*` variables (`DB_HOST`, `DB_USER`,
//! `DB_PASSWORD`, `DB_DATABASE`, `DB_PORT`, ...). `DB_URL` replaces the
//! assembled MySQL URL entirely, which is how other sqlx drivers are selected.
//! Logging reads `LOGLEVEL` and `LOG_FILE`.

use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};
use url::Url;

use crate::error::StoreError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub db: DbConfig,
    pub log: LogConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, StoreError> {
        Ok(Self {
            db: DbConfig::from_env()?,
            log: LogConfig::from_env()?,
        })
    }
}

/// Keys whose values are taken verbatim, even when they look like numbers
/// (`DB_PASSWORD=007` stays `"007"`).
const DB_TEXT_KEYS: [&str; 5] = ["host", "user", "password", "database", "url"];

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DbConfig {
    pub host: String,
    pub user: String,
    pub password: String,
    pub database: String,
    pub port: u16,
    /// Fixed number of pooled connections.
    pub pool_size: u32,
    pub acquire_timeout_secs: u64,
    pub statement_timeout_secs: u64,
    pub url: Option<String>,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            user: String::new(),
            password: String::new(),
            database: String::new(),
            port: 3306,
            pool_size: 4,
            acquire_timeout_secs: 30,
            statement_timeout_secs: 30,
            url: None,
        }
    }
}

impl DbConfig {
    pub fn figment() -> Figment {
        let mut figment =
            Figment::from(Serialized::defaults(DbConfig::default())).merge(Env::prefixed("DB_"));
        // `Env` parses numeric-looking values; re-merge the text keys as raw strings.
        for (key, value) in Env::prefixed("DB_").only(&DB_TEXT_KEYS).iter() {
            let key = key.as_str().to_ascii_lowercase();
            figment = figment.merge(Serialized::default(&key, value));
        }
        figment
    }

    pub fn from_env() -> Result<Self, StoreError> {
        let cfg: Self = Self::figment()
            .extract()
            .map_err(|e| StoreError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        if self.pool_size == 0 {
            return Err(StoreError::Config("DB_POOL_SIZE must be at least 1".into()));
        }
        if self.url.is_none() {
            if self.host.trim().is_empty() {
                return Err(StoreError::Config("DB_HOST must not be empty".into()));
            }
            if self.database.trim().is_empty() {
                return Err(StoreError::Config("DB_DATABASE must not be empty".into()));
            }
        }
        Ok(())
    }

    /// Connection URL handed to the pool. Credentials are percent-encoded.
    pub fn connection_url(&self) -> Result<String, StoreError> {
        if let Some(url) = &self.url {
            return Ok(url.clone());
        }

        let invalid = |what: &str| StoreError::Config(format!("invalid database {what}"));
        let mut url = Url::parse(&format!("mysql://{}:{}", self.host, self.port))
            .map_err(|e| StoreError::Config(format!("invalid database host: {e}")))?;
        if !self.user.is_empty() {
            url.set_username(&self.user).map_err(|_| invalid("user"))?;
        }
        if !self.password.is_empty() {
            url.set_password(Some(&self.password))
                .map_err(|_| invalid("password"))?;
        }
        url.set_path(&self.database);
        Ok(url.into())
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn statement_timeout(&self) -> Duration {
        Duration::from_secs(self.statement_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    pub loglevel: String,
    /// Plain-text copy of the log stream, appended to.
    pub log_file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            loglevel: "debug".to_string(),
            log_file: None,
        }
    }
}

impl LogConfig {
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(LogConfig::default()))
            .merge(Env::raw().only(&["LOGLEVEL", "LOG_FILE"]))
    }

    pub fn from_env() -> Result<Self, StoreError> {
        Self::figment()
            .extract()
            .map_err(|e| StoreError::Config(e.to_string()))
    }
}
