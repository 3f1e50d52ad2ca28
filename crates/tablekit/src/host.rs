//! The host database object that tablekit delegates to.

use crate::dialect::Dialect;
use crate::error::TableResult;
use crate::row::Row;
use crate::value::Value;

/// A database-access object provided by the surrounding platform.
///
/// tablekit never opens connections or executes SQL on its own: every
/// statement it builds is handed to a `Host` together with its bound values,
/// already rendered for [`Host::dialect`].
pub trait Host: Send + Sync {
    /// SQL flavour for quoting and placeholders.
    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    /// Prefix applied to table names (e.g. `wp_`). Empty by default.
    fn table_prefix(&self) -> &str {
        ""
    }

    /// Execute a query and return all rows.
    fn fetch_all(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl std::future::Future<Output = TableResult<Vec<Row>>> + Send;

    /// Execute a statement and return the number of affected rows.
    fn execute(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl std::future::Future<Output = TableResult<u64>> + Send;

    /// Execute an INSERT and return the generated key, if the backend reports one.
    fn insert(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl std::future::Future<Output = TableResult<Option<i64>>> + Send;

    /// Execute a query and return the first row, if any.
    fn fetch_optional(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl std::future::Future<Output = TableResult<Option<Row>>> + Send {
        async move {
            let rows = self.fetch_all(sql, params).await?;
            Ok(rows.into_iter().next())
        }
    }

    /// Execute a query and return the first column of the first row.
    fn fetch_scalar(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl std::future::Future<Output = TableResult<Option<Value>>> + Send {
        async move {
            let row = self.fetch_optional(sql, params).await?;
            Ok(row.and_then(|r| r.into_values().into_iter().next()))
        }
    }

    /// Whether a table with exactly this (unquoted) name exists.
    fn table_exists(
        &self,
        table: &str,
    ) -> impl std::future::Future<Output = TableResult<bool>> + Send {
        async move {
            let sql = self.dialect().table_exists_sql();
            let found = self.fetch_scalar(sql, &[Value::from(table)]).await?;
            Ok(found.as_ref().and_then(Value::as_str) == Some(table))
        }
    }

    /// Column names of a table in ordinal order.
    fn table_columns(
        &self,
        table: &str,
    ) -> impl std::future::Future<Output = TableResult<Vec<String>>> + Send {
        async move {
            let sql = self.dialect().columns_sql();
            let rows = self.fetch_all(sql, &[Value::from(table)]).await?;
            Ok(rows
                .into_iter()
                .filter_map(|r| r.into_values().into_iter().next())
                .filter_map(|v| v.as_text())
                .collect())
        }
    }
}
