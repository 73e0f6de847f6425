// Connection settings and pool setup

use serde::Deserialize;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgSslMode};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

const DEFAULT_PORT: u16 = 5432;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid connection parameter {key}={value}")]
    InvalidParam { key: String, value: String },

    #[error("connection failed: {0}")]
    Connect(#[from] sqlx::Error),
}

/// PostgreSQL connection settings
#[derive(Clone, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub database: String,
    /// Extra keyword/value pairs (`sslmode`, `application_name`, runtime options)
    #[serde(default)]
    pub params: BTreeMap<String, String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_max_connections() -> u32 {
    DEFAULT_MAX_CONNECTIONS
}

impl DatabaseConfig {
    /// Load from `<PREFIX>_HOST`, `<PREFIX>_PORT`, `<PREFIX>_USERNAME`,
    /// `<PREFIX>_PASSWORD`, `<PREFIX>_DATABASE`, `<PREFIX>_MAX_CONNECTIONS`
    pub fn from_env(prefix: &str) -> Result<Self, ConnectionError> {
        let settings = config::Config::builder()
            .add_source(config::Environment::with_prefix(prefix).try_parsing(true))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Keyword/value connection string, password included
    pub fn connection_string(&self) -> String {
        self.render(&self.password)
    }

    fn render(&self, password: &str) -> String {
        let mut conn = format!(
            "host={} port={} user={} password={} dbname={}",
            self.host, self.port, self.username, password, self.database
        );
        for (key, value) in &self.params {
            conn.push_str(&format!(" {}={}", key, value));
        }
        conn
    }

    pub fn pg_connect_options(&self) -> Result<PgConnectOptions, ConnectionError> {
        let mut options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .database(&self.database);
        if !self.password.is_empty() {
            options = options.password(&self.password);
        }

        let mut runtime = Vec::new();
        for (key, value) in &self.params {
            match key.as_str() {
                "sslmode" => {
                    let mode =
                        PgSslMode::from_str(value).map_err(|_| ConnectionError::InvalidParam {
                            key: key.clone(),
                            value: value.clone(),
                        })?;
                    options = options.ssl_mode(mode);
                }
                "application_name" => options = options.application_name(value),
                _ => runtime.push((key.as_str(), value.as_str())),
            }
        }
        if !runtime.is_empty() {
            options = options.options(runtime);
        }

        Ok(options)
    }
}

impl fmt::Display for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render("***"))
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"***")
            .field("database", &self.database)
            .field("params", &self.params)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

/// Create PostgreSQL connection pool
pub async fn create_pg_pool(config: &DatabaseConfig) -> Result<PgPool, ConnectionError> {
    info!(database = %config, "Connecting to PostgreSQL...");
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(config.pg_connect_options()?)
        .await?;
    Ok(pool)
}

/// Create SQLite connection pool with WAL mode and foreign keys enforced
pub async fn create_sqlite_pool(
    database_url: &str,
    max_connections: u32,
) -> Result<SqlitePool, ConnectionError> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5))
        .foreign_keys(true)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    Ok(pool)
}
