//! PostgreSQL store backend.
//!
//! Records live in a single `kv_store(key TEXT PRIMARY KEY, value TEXT)`
//! table. Connections come from a deadpool-postgres pool.

use std::time::Duration;

use async_trait::async_trait;
use deadpool_postgres::{Config, ManagerConfig, Pool, PoolConfig, RecyclingMethod, Runtime};
use tokio_postgres::NoTls;
use tracing::info;

use super::KvStore;
use crate::error::StoreError;

const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)";
const SELECT_SQL: &str = "SELECT value FROM kv_store WHERE key = $1";
const UPSERT_SQL: &str = "INSERT INTO kv_store (key, value) VALUES ($1, $2)
    ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value";
const DELETE_SQL: &str = "DELETE FROM kv_store WHERE key = $1";

// == Connection Pool Configuration ==
/// Connection parameters for the PostgreSQL backend.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub user: String,
    pub password: String,
    /// Maximum pool size
    pub max_size: usize,
    /// Upper bound on waiting for or opening a connection
    pub timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            dbname: "kv_store".to_string(),
            user: "postgres".to_string(),
            password: String::new(),
            max_size: 16,
            timeout: Duration::from_secs(30),
        }
    }
}

impl DbConfig {
    /// Loads connection parameters from the environment.
    ///
    /// # Environment Variables
    /// - `DB_HOST` (default: localhost)
    /// - `DB_PORT` (default: 5432)
    /// - `DB_NAME` (default: kv_store)
    /// - `DB_USER` (default: postgres)
    /// - `DB_PASSWORD` (default: empty)
    /// - `DB_POOL_SIZE` (default: 16)
    /// - `DB_TIMEOUT` seconds (default: 30)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("DB_HOST").unwrap_or(defaults.host),
            port: std::env::var("DB_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            dbname: std::env::var("DB_NAME").unwrap_or(defaults.dbname),
            user: std::env::var("DB_USER").unwrap_or(defaults.user),
            password: std::env::var("DB_PASSWORD").unwrap_or_default(),
            max_size: std::env::var("DB_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|&n| n > 0)
                .unwrap_or(defaults.max_size),
            timeout: std::env::var("DB_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        }
    }

    /// Builds a connection pool. No connection is opened until first use.
    pub fn create_pool(&self) -> Result<Pool, StoreError> {
        let mut cfg = Config::new();
        cfg.host = Some(self.host.clone());
        cfg.port = Some(self.port);
        cfg.dbname = Some(self.dbname.clone());
        cfg.user = Some(self.user.clone());
        cfg.password = Some(self.password.clone());
        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let mut pool_cfg = PoolConfig::new(self.max_size);
        pool_cfg.timeouts.wait = Some(self.timeout);
        pool_cfg.timeouts.create = Some(self.timeout);
        cfg.pool = Some(pool_cfg);

        cfg.create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| StoreError::Connection(format!("Failed to create pool: {}", e)))
    }
}

// == Postgres Store ==
/// `KvStore` backed by the `kv_store` table.
#[derive(Clone)]
pub struct PostgresStore {
    pool: Pool,
}

impl PostgresStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub fn from_config(config: &DbConfig) -> Result<Self, StoreError> {
        Ok(Self::new(config.create_pool()?))
    }

    /// Creates the `kv_store` table if it does not exist.
    ///
    /// Also serves as the startup connectivity check.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        let conn = self.pool.get().await?;
        conn.batch_execute(CREATE_TABLE_SQL).await?;
        info!("kv_store table ready");
        Ok(())
    }
}

#[async_trait]
impl KvStore for PostgresStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let conn = self.pool.get().await?;
        let row = conn.query_opt(SELECT_SQL, &[&key]).await?;
        match row {
            Some(row) => Ok(Some(row.try_get::<_, String>(0)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let conn = self.pool.get().await?;
        conn.execute(UPSERT_SQL, &[&key, &value]).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let conn = self.pool.get().await?;
        conn.execute(DELETE_SQL, &[&key]).await?;
        Ok(())
    }
}
