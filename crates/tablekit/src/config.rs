//! Per-table configuration.

use crate::log::SqlLog;

/// Configuration for a [`Table`](crate::Table).
#[derive(Debug, Clone)]
pub struct TableConfig {
    /// Prepend the host's table prefix unless the name already carries it.
    pub apply_prefix: bool,
    /// Column returned from `INSERT ... RETURNING` on dialects that support it.
    pub primary_key: String,
    /// `tracing` output for generated SQL.
    pub sql_log: SqlLog,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            apply_prefix: true,
            primary_key: "id".to_string(),
            sql_log: SqlLog::default(),
        }
    }
}

impl TableConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the table name exactly as given.
    pub fn without_prefix(mut self) -> Self {
        self.apply_prefix = false;
        self
    }

    /// Set the primary key column used to recover generated ids.
    pub fn primary_key(mut self, column: impl Into<String>) -> Self {
        self.primary_key = column.into();
        self
    }

    /// Replace the SQL logging settings.
    pub fn sql_log(mut self, sql_log: SqlLog) -> Self {
        self.sql_log = sql_log;
        self
    }
}
