//! MySQL verdict store.

use std::time::Duration;

use async_trait::async_trait;
use mguard_models::RecordRef;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::flags::FlagSet;
use crate::store::{validate_identifier, UpdateStatus, VerdictStore};

/// Database connection configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Full connection URL; overrides the individual fields when set
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            host: "localhost".to_string(),
            port: 3306,
            user: "root".to_string(),
            password: String::new(),
            database: "myvault".to_string(),
            max_connections: 2,
            acquire_timeout: Duration::from_secs(10),
        }
    }
}

impl StoreConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            host: std::env::var("DB_HOST").unwrap_or(defaults.host),
            port: std::env::var("DB_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            user: std::env::var("DB_USER").unwrap_or(defaults.user),
            password: std::env::var("DB_PASSWORD").unwrap_or(defaults.password),
            database: std::env::var("DB_DATABASE").unwrap_or(defaults.database),
            max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_connections),
            acquire_timeout: defaults.acquire_timeout,
        }
    }

    fn connect_options(&self) -> StoreResult<MySqlConnectOptions> {
        match &self.database_url {
            Some(url) => url
                .parse::<MySqlConnectOptions>()
                .map_err(|e| StoreError::config(format!("DATABASE_URL: {}", e))),
            None => Ok(MySqlConnectOptions::new()
                .host(&self.host)
                .port(self.port)
                .username(&self.user)
                .password(&self.password)
                .database(&self.database)),
        }
    }
}

/// Build the parameterized UPDATE for the given columns.
///
/// Identifiers are validated and backtick-quoted; values are bound.
fn build_update_sql(record: &RecordRef, columns: &[&str]) -> StoreResult<String> {
    let table = validate_identifier(&record.table_name)?;
    let key = validate_identifier(&record.primary_key_name)?;

    let assignments = columns
        .iter()
        .map(|column| validate_identifier(column).map(|c| format!("`{}` = ?", c)))
        .collect::<StoreResult<Vec<_>>>()?;

    Ok(format!(
        "UPDATE `{}` SET {} WHERE `{}` = ?",
        table,
        assignments.join(", "),
        key
    ))
}

/// Update-only store over a lazily connected MySQL pool.
#[derive(Clone)]
pub struct MySqlVerdictStore {
    pool: MySqlPool,
}

impl MySqlVerdictStore {
    /// Create the store. Connections are opened on first use.
    pub fn new(config: &StoreConfig) -> StoreResult<Self> {
        let options = config.connect_options()?;
        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_lazy_with(options);

        info!(
            max_connections = config.max_connections,
            "Configured MySQL verdict store"
        );

        Ok(Self { pool })
    }

    /// Create from environment variables.
    pub fn from_env() -> StoreResult<Self> {
        Self::new(&StoreConfig::from_env())
    }

    /// Check connectivity.
    pub async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl VerdictStore for MySqlVerdictStore {
    async fn update(&self, record: &RecordRef, flags: &FlagSet) -> StoreResult<UpdateStatus> {
        let assignments: Vec<(&str, bool)> = flags.assignments().collect();
        if assignments.is_empty() {
            return Ok(UpdateStatus::NothingToUpdate);
        }

        let columns: Vec<&str> = assignments.iter().map(|(c, _)| *c).collect();
        let sql = build_update_sql(record, &columns)?;

        let mut query = sqlx::query(&sql);
        for (_, value) in &assignments {
            query = query.bind(*value);
        }
        query = query.bind(record.primary_key_value.as_str());

        let result = query.execute(&self.pool).await?;
        let rows = result.rows_affected();

        debug!(record = %record, rows, "Executed verdict update");

        Ok(if rows == 0 {
            UpdateStatus::NoRowsAffected
        } else {
            UpdateStatus::Updated(rows)
        })
    }
}
