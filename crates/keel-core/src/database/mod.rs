//! Database handles opened during bootstrap.
//!
//! Engines are selected by name (`sqlite` or `mysql`). Pools are cheap to
//! clone and are handed to controllers as-is.
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use log::LevelFilter;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::ConnectOptions;

use crate::config::Configuration;
use crate::kernel::constants::{
    DB_ENGINE, DB_SLOW_THRESHOLD, DB_URI, DEFAULT_DB_SLOW_THRESHOLD_MS, LOG_QUERY,
};
use crate::kernel::error::{Error, Result};

/// Charset negotiated on every MySQL connection
pub const MYSQL_CHARSET: &str = "utf8mb4";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbEngine {
    Sqlite,
    MySql,
}

impl DbEngine {
    pub fn name(&self) -> &'static str {
        match self {
            DbEngine::Sqlite => "sqlite",
            DbEngine::MySql => "mysql",
        }
    }
}

impl FromStr for DbEngine {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(DbEngine::Sqlite),
            "mysql" => Ok(DbEngine::MySql),
            other => Err(Error::configuration(
                DB_ENGINE,
                format!("invalid database engine '{other}'. Options available: mysql or sqlite"),
            )),
        }
    }
}

impl fmt::Display for DbEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Connection settings read from the configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
    pub uri: String,
    pub slow_threshold: Duration,
    pub log_queries: bool,
}

impl DatabaseSettings {
    /// `DB_URI` is required; the other keys fall back to defaults.
    pub fn from_configuration(config: &Configuration) -> Result<Self> {
        let uri = config.get(DB_URI);
        if uri.trim().is_empty() {
            return Err(Error::configuration(
                DB_URI,
                "the DB_URI environment variable is required",
            ));
        }

        let threshold = config
            .get_i64_or(DB_SLOW_THRESHOLD, DEFAULT_DB_SLOW_THRESHOLD_MS)
            .max(0) as u64;

        Ok(Self {
            uri,
            slow_threshold: Duration::from_millis(threshold),
            log_queries: !config.get(LOG_QUERY).is_empty(),
        })
    }

    fn statement_level(&self) -> LevelFilter {
        if self.log_queries {
            LevelFilter::Info
        } else {
            LevelFilter::Debug
        }
    }

    fn is_in_memory(&self) -> bool {
        self.uri.contains(":memory:") || self.uri.contains("mode=memory")
    }
}

/// An open connection pool
#[derive(Debug, Clone)]
pub enum Database {
    Sqlite(SqlitePool),
    MySql(MySqlPool),
}

impl Database {
    pub async fn connect(
        engine: DbEngine,
        settings: &DatabaseSettings,
    ) -> std::result::Result<Self, sqlx::Error> {
        match engine {
            DbEngine::Sqlite => {
                let options = SqliteConnectOptions::from_str(&settings.uri)?
                    .create_if_missing(true)
                    .log_statements(settings.statement_level())
                    .log_slow_statements(LevelFilter::Warn, settings.slow_threshold);

                // An in-memory database lives as long as its last connection.
                let pool = if settings.is_in_memory() {
                    SqlitePoolOptions::new()
                        .max_connections(1)
                        .idle_timeout(None)
                        .max_lifetime(None)
                } else {
                    SqlitePoolOptions::new()
                };

                Ok(Database::Sqlite(pool.connect_with(options).await?))
            }
            DbEngine::MySql => {
                let options = MySqlConnectOptions::from_str(&settings.uri)?
                    .charset(MYSQL_CHARSET)
                    .timezone(None::<String>)
                    .log_statements(settings.statement_level())
                    .log_slow_statements(LevelFilter::Warn, settings.slow_threshold);

                let pool = MySqlPoolOptions::new().connect_with(options).await?;
                Ok(Database::MySql(pool))
            }
        }
    }

    pub fn engine(&self) -> DbEngine {
        match self {
            Database::Sqlite(_) => DbEngine::Sqlite,
            Database::MySql(_) => DbEngine::MySql,
        }
    }

    pub fn as_sqlite(&self) -> Option<&SqlitePool> {
        match self {
            Database::Sqlite(pool) => Some(pool),
            _ => None,
        }
    }

    pub fn as_mysql(&self) -> Option<&MySqlPool> {
        match self {
            Database::MySql(pool) => Some(pool),
            _ => None,
        }
    }

    pub async fn close(&self) {
        match self {
            Database::Sqlite(pool) => pool.close().await,
            Database::MySql(pool) => pool.close().await,
        }
    }
}
