//! PostgreSQL [`Host`] backed by a `deadpool_postgres` pool.
//!
//! ```ignore
//! use tablekit::{PgHost, PgHostConfig, Table};
//!
//! let host = PgHost::connect(&PgHostConfig::from_env()?)?;
//! let posts = Table::open(&host, "posts").await?;
//! ```

mod config;
mod pool;
mod types;

pub use config::PgHostConfig;
pub use pool::{create_pool, create_pool_with_config, create_pool_with_manager_config};

use crate::dialect::Dialect;
use crate::error::TableResult;
use crate::host::Host;
use crate::row::Row;
use crate::value::Value;
use deadpool_postgres::Pool;
use types::{decode_row, param_refs};

/// A pooled PostgreSQL connection source.
#[derive(Clone)]
pub struct PgHost {
    pool: Pool,
    prefix: String,
}

impl PgHost {
    /// Wrap an existing pool.
    pub fn new(pool: Pool) -> Self {
        Self {
            pool,
            prefix: String::new(),
        }
    }

    /// Build a pool from `config` and wrap it.
    pub fn connect(config: &PgHostConfig) -> TableResult<Self> {
        let pool = create_pool_with_config(config)?;
        Ok(Self::new(pool).with_prefix(config.table_prefix.clone()))
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    async fn query(&self, sql: &str, params: &[Value]) -> TableResult<Vec<tokio_postgres::Row>> {
        let client = self.pool.get().await?;
        let statement = client.prepare_cached(sql).await?;
        Ok(client.query(&statement, &param_refs(params)).await?)
    }
}

impl Host for PgHost {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn table_prefix(&self) -> &str {
        &self.prefix
    }

    async fn fetch_all(&self, sql: &str, params: &[Value]) -> TableResult<Vec<Row>> {
        self.query(sql, params).await?.iter().map(decode_row).collect()
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> TableResult<u64> {
        let client = self.pool.get().await?;
        let statement = client.prepare_cached(sql).await?;
        Ok(client.execute(&statement, &param_refs(params)).await?)
    }

    /// Reads the id from `RETURNING`; without it there is no row and no id.
    async fn insert(&self, sql: &str, params: &[Value]) -> TableResult<Option<i64>> {
        let rows = self.fetch_all(sql, params).await?;
        Ok(rows
            .first()
            .and_then(|row| row.get_index(0))
            .and_then(Value::as_i64))
    }
}
