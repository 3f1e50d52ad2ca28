use crate::error::{TableError, TableResult};
use std::env;

/// Connection settings for [`PgHost`](super::PgHost).
#[derive(Debug, Clone)]
pub struct PgHostConfig {
    pub database_url: String,
    /// Prefix applied to table names (e.g. `wp_`).
    pub table_prefix: String,
    /// Maximum pooled connections.
    pub max_size: usize,
}

impl Default for PgHostConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            table_prefix: String::new(),
            max_size: 16,
        }
    }
}

impl PgHostConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Self::default()
        }
    }

    /// Read `DATABASE_URL`, `TABLEKIT_TABLE_PREFIX` and `TABLEKIT_POOL_SIZE`.
    ///
    /// Only `DATABASE_URL` is required. Call `dotenvy::dotenv()` first if the
    /// values live in a `.env` file.
    pub fn from_env() -> TableResult<Self> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| TableError::Connection("DATABASE_URL is not set".to_string()))?;
        let mut config = Self::new(database_url);

        if let Ok(prefix) = env::var("TABLEKIT_TABLE_PREFIX") {
            config.table_prefix = prefix;
        }
        if let Ok(size) = env::var("TABLEKIT_POOL_SIZE") {
            config.max_size = size.trim().parse().map_err(|_| {
                TableError::validation(format!("TABLEKIT_POOL_SIZE must be a positive integer, got {size:?}"))
            })?;
        }
        Ok(config)
    }

    pub fn table_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.table_prefix = prefix.into();
        self
    }

    pub fn max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let config = PgHostConfig::new("postgres://localhost/app")
            .table_prefix("wp_")
            .max_size(4);
        assert_eq!(config.database_url, "postgres://localhost/app");
        assert_eq!(config.table_prefix, "wp_");
        assert_eq!(config.max_size, 4);
        assert_eq!(PgHostConfig::default().max_size, 16);
    }
}
