//! CRUD helpers bound to a single table.
//!
//! ```ignore
//! use tablekit::{Columns, Condition, ConditionSet, Table};
//!
//! let posts = Table::open(&host, "posts").await?; // resolves to `wp_posts`
//! let all = posts.get_all(Some("date"), Some("DESC")).await?;
//! let one = posts.get_row("id", 102, "%d", 0).await?;
//! let some = posts
//!     .get_wheres(
//!         Columns::All,
//!         &ConditionSet::new().with("category", "news").with("status", "publish"),
//!         Some("date"),
//!         None,
//!     )
//!     .await?;
//! let id = posts.insert([("title", "Hello")]).await?;
//! ```


use crate::builder::{ConditionBuilder, push_order_by, select_head};
use crate::columns::{Columns, KnownColumns, Order};
use crate::condition::{Condition, ConditionSet};
use crate::config::TableConfig;
use crate::dialect::Dialect;
use crate::error::{TableError, TableResult};
use crate::host::Host;
use crate::ident::Ident;
use crate::row::Row;
use crate::sql::Sql;
use crate::value::{Format, Value};
use serde::Serialize;

/// Per-value counts of a column, as returned by [`Table::count_column`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnCounts {
    /// `(value, count)` pairs in the order the host returned them.
    pub counts: Vec<(Value, i64)>,
    /// Sum of all counts.
    pub total: i64,
}

impl ColumnCounts {
    /// Count for a specific value.
    pub fn get(&self, value: &Value) -> Option<i64> {
        self.counts
            .iter()
            .find(|(v, _)| v == value)
            .map(|(_, n)| *n)
    }
}

/// A table on a [`Host`], verified to exist when opened.
pub struct Table<'h, H: Host> {
    host: &'h H,
    ident: Ident,
    known: KnownColumns,
    config: TableConfig,
}

/// Apply `prefix` to `name` unless `name` already starts with it.
pub fn prefixed_name(prefix: &str, name: &str) -> String {
    if prefix.is_empty() || name.starts_with(prefix) {
        name.to_string()
    } else {
        format!("{prefix}{name}")
    }
}

impl<'h, H: Host> Table<'h, H> {
    /// Open `name` with the default configuration.
    pub async fn open(host: &'h H, name: &str) -> TableResult<Self> {
        Self::open_with(host, name, TableConfig::default()).await
    }

    /// Resolve the prefixed name, check the table exists and load its columns.
    pub async fn open_with(host: &'h H, name: &str, config: TableConfig) -> TableResult<Self> {
        let full_name = if config.apply_prefix {
            prefixed_name(host.table_prefix(), name)
        } else {
            name.to_string()
        };
        let ident = Ident::parse(&full_name)?;

        if !host.table_exists(ident.name()).await? {
            return Err(TableError::TableNotFound(full_name));
        }

        let known = KnownColumns::new(host.table_columns(ident.name()).await?);
        tracing::debug!(
            target: "tablekit",
            table = %ident,
            columns = known.len(),
            "opened table"
        );

        Ok(Self {
            host,
            ident,
            known,
            config,
        })
    }

    pub fn name(&self) -> &Ident {
        &self.ident
    }

    /// Columns loaded when the table was opened.
    pub fn columns(&self) -> &KnownColumns {
        &self.known
    }

    pub fn host(&self) -> &'h H {
        self.host
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    fn dialect(&self) -> Dialect {
        self.host.dialect()
    }

    /// Ask the host again whether the table exists.
    pub async fn exists(&self) -> TableResult<bool> {
        self.host.table_exists(self.ident.name()).await
    }

    /// Reload the column whitelist from the host.
    pub async fn refresh_columns(&mut self) -> TableResult<()> {
        self.known = KnownColumns::new(self.host.table_columns(self.ident.name()).await?);
        Ok(())
    }

    // ==================== Reads ====================

    /// All rows, optionally ordered by a known column.
    pub async fn get_all(&self, order_by: Option<&str>, order: Option<&str>) -> TableResult<Vec<Row>> {
        let mut sql = select_head(&self.ident, &Columns::All, &self.known);
        let order_by = self.known.order_by(order_by, Order::parse_opt(order));
        push_order_by(&mut sql, order_by.as_ref());
        self.fetch_all("get_all", sql).await
    }

    /// The row at `offset` among rows where `column = value`.
    ///
    /// Returns `None` when `column` is not a known column.
    pub async fn get_row(
        &self,
        column: &str,
        value: impl Into<Value>,
        format: impl Into<Format>,
        offset: u64,
    ) -> TableResult<Option<Row>> {
        let Some(field) = self.known.get(column) else {
            tracing::warn!(target: "tablekit", table = %self.ident, column, "get_row on unknown column");
            return Ok(None);
        };

        let format: Format = format.into();
        let mut sql = select_head(&self.ident, &Columns::All, &self.known);
        sql.push(" WHERE ")
            .push_ident_ref(field)
            .push(" = ")
            .push_bind(format.coerce(&value.into()));
        sql.limit(1).offset(offset_i64(offset));

        let rows = self.fetch_all("get_row", sql).await?;
        Ok(rows.into_iter().next())
    }

    /// Rows matching one explicit condition.
    ///
    /// Unlike [`Table::get_wheres`], the condition is emitted even when its
    /// value is falsy. A condition on an unknown column matches nothing.
    pub async fn get_by(
        &self,
        columns: impl Into<Columns>,
        condition: Condition,
        order_by: Option<&str>,
        order: Option<&str>,
    ) -> TableResult<Vec<Row>> {
        if !self.known.contains(&condition.field) {
            tracing::warn!(
                target: "tablekit",
                table = %self.ident,
                column = %condition.field,
                "get_by on unknown column"
            );
            return Ok(Vec::new());
        }

        let set = ConditionSet::new().push(condition).keep_falsy(true);
        self.select("get_by", &columns.into(), &set, order_by, order)
            .await
    }

    /// Rows matching a condition set; falsy conditions are skipped.
    pub async fn get_wheres(
        &self,
        columns: impl Into<Columns>,
        conditions: &ConditionSet,
        order_by: Option<&str>,
        order: Option<&str>,
    ) -> TableResult<Vec<Row>> {
        self.select("get_wheres", &columns.into(), conditions, order_by, order)
            .await
    }

    async fn select(
        &self,
        op: &str,
        columns: &Columns,
        conditions: &ConditionSet,
        order_by: Option<&str>,
        order: Option<&str>,
    ) -> TableResult<Vec<Row>> {
        let built = ConditionBuilder::new(&self.known)
            .dialect(self.dialect())
            .build(columns, conditions, order_by, order)?;
        let sql = built.to_select(&self.ident, &self.known);
        self.fetch_all(op, sql).await
    }

    /// Number of rows in the table.
    pub async fn count(&self) -> TableResult<i64> {
        let mut sql = Sql::new("SELECT COUNT(*) FROM ");
        sql.push_ident_ref(&self.ident);
        let text = self.render("count", &sql)?;
        let value = self.host.fetch_scalar(&text, sql.params()).await?;
        Ok(value.and_then(|v| v.as_i64()).unwrap_or(0))
    }

    /// Row counts grouped by the values of `column`.
    pub async fn count_column(&self, column: &str) -> TableResult<ColumnCounts> {
        let field = self.require_column(column)?.clone();

        let mut sql = Sql::new("SELECT ");
        sql.push_ident_ref(&field)
            .push(", COUNT(*) AS ")
            .push_ident("count")?;
        sql.push(" FROM ")
            .push_ident_ref(&self.ident)
            .push(" GROUP BY ")
            .push_ident_ref(&field);

        let rows = self.fetch_all("count_column", sql).await?;
        let mut counts = ColumnCounts::default();
        for row in rows {
            let n = row.get_index(1).and_then(Value::as_i64).unwrap_or(0);
            let value = row.into_values().into_iter().next().unwrap_or_default();
            counts.total += n;
            counts.counts.push((value, n));
        }
        Ok(counts)
    }

    // ==================== Writes ====================

    /// Insert one row and return the generated id, if the host reports one.
    ///
    /// Empty `data` inserts nothing and returns `None`.
    pub async fn insert<K, V>(&self, data: impl IntoIterator<Item = (K, V)>) -> TableResult<Option<i64>>
    where
        K: AsRef<str>,
        V: Into<Value>,
    {
        let data = self.checked_pairs("insert", data)?;
        if data.is_empty() {
            return Ok(None);
        }

        let mut sql = Sql::new("INSERT INTO ");
        sql.push_ident_ref(&self.ident).push(" (");
        sql.push_ident_list(data.iter().map(|(c, _)| c));
        sql.push(") VALUES (");
        sql.push_bind_list(data.into_iter().map(|(_, v)| v));
        sql.push(")");

        if self.dialect().supports_returning()
            && let Some(pk) = self.known.get(&self.config.primary_key)
        {
            sql.push(" RETURNING ").push_ident_ref(pk);
        }

        let text = self.render("insert", &sql)?;
        self.host.insert(&text, sql.params()).await
    }

    /// Insert a serializable struct; its fields become columns.
    pub async fn insert_serialized<T: Serialize>(&self, record: &T) -> TableResult<Option<i64>> {
        let json = serde_json::to_value(record)
            .map_err(|e| TableError::validation(format!("insert: cannot serialize record: {e}")))?;
        let serde_json::Value::Object(map) = json else {
            return Err(TableError::validation(
                "insert: record must serialize to an object",
            ));
        };
        self.insert(map.iter().map(|(k, v)| (k.as_str(), Value::from_json(v))))
            .await
    }

    /// Update rows matching every `(column, value)` pair in `condition`.
    pub async fn update<K1, V1, K2, V2>(
        &self,
        data: impl IntoIterator<Item = (K1, V1)>,
        condition: impl IntoIterator<Item = (K2, V2)>,
    ) -> TableResult<u64>
    where
        K1: AsRef<str>,
        V1: Into<Value>,
        K2: AsRef<str>,
        V2: Into<Value>,
    {
        let data = self.checked_pairs("update", data)?;
        if data.is_empty() {
            return Err(TableError::validation("update: no columns to set"));
        }
        let filter = self.equality_filter("update", condition)?;

        let mut sql = Sql::new("UPDATE ");
        sql.push_ident_ref(&self.ident).push(" SET ");
        for (i, (column, value)) in data.into_iter().enumerate() {
            if i > 0 {
                sql.push(", ");
            }
            sql.push_ident_ref(&column).push(" = ").push_bind(value);
        }
        sql.push(" WHERE ").push_sql(filter);

        self.execute("update", sql).await
    }

    /// Delete rows matching every `(column, value)` pair in `condition`.
    pub async fn delete<K, V>(&self, condition: impl IntoIterator<Item = (K, V)>) -> TableResult<u64>
    where
        K: AsRef<str>,
        V: Into<Value>,
    {
        let filter = self.equality_filter("delete", condition)?;
        let mut sql = Sql::new("DELETE FROM ");
        sql.push_ident_ref(&self.ident)
            .push(" WHERE ")
            .push_sql(filter);
        self.execute("delete", sql).await
    }

    /// Delete rows whose `field` is any of `values`.
    ///
    /// An empty `values` deletes nothing and does not reach the host.
    pub async fn bulk_delete<V>(
        &self,
        field: &str,
        values: impl IntoIterator<Item = V>,
        format: impl Into<Format>,
    ) -> TableResult<u64>
    where
        V: Into<Value>,
    {
        let field = self.require_column(field)?.clone();
        let format: Format = format.into();
        let values: Vec<Value> = values
            .into_iter()
            .map(|v| format.coerce(&v.into()))
            .collect();
        if values.is_empty() {
            return Ok(0);
        }

        let mut sql = Sql::new("DELETE FROM ");
        sql.push_ident_ref(&self.ident)
            .push(" WHERE ")
            .push_ident_ref(&field)
            .push(" IN (");
        sql.push_bind_list(values);
        sql.push(")");

        self.execute("bulk_delete", sql).await
    }

    // ==================== Internals ====================

    fn require_column(&self, column: &str) -> TableResult<&Ident> {
        self.known.get(column).ok_or_else(|| {
            TableError::validation(format!("Unknown column `{column}` on {}", self.ident))
        })
    }

    /// Resolve mutation columns; unknown columns are rejected.
    fn checked_pairs<K, V>(
        &self,
        op: &str,
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> TableResult<Vec<(Ident, Value)>>
    where
        K: AsRef<str>,
        V: Into<Value>,
    {
        pairs
            .into_iter()
            .map(|(k, v)| {
                let column = self.require_column(k.as_ref()).map_err(|e| {
                    TableError::validation(format!("{op}: {e}"))
                })?;
                Ok((column.clone(), v.into()))
            })
            .collect()
    }

    /// `a = ? AND b IS NULL ...`; an empty condition is rejected.
    fn equality_filter<K, V>(
        &self,
        op: &str,
        condition: impl IntoIterator<Item = (K, V)>,
    ) -> TableResult<Sql>
    where
        K: AsRef<str>,
        V: Into<Value>,
    {
        let pairs = self.checked_pairs(op, condition)?;
        if pairs.is_empty() {
            return Err(TableError::validation(format!(
                "{op}: refusing to run without a WHERE condition"
            )));
        }

        let mut filter = Sql::empty();
        for (i, (column, value)) in pairs.into_iter().enumerate() {
            if i > 0 {
                filter.push(" AND ");
            }
            filter.push_ident_ref(&column);
            if value.is_null() {
                filter.push(" IS NULL");
            } else {
                filter.push(" = ").push_bind(value);
            }
        }
        Ok(filter)
    }

    fn render(&self, op: &str, sql: &Sql) -> TableResult<String> {
        sql.validate()?;
        let text = sql.to_sql(self.dialect());
        self.config
            .sql_log
            .emit(&self.ident.as_dotted(), op, &text, sql.params().len());
        Ok(text)
    }

    async fn fetch_all(&self, op: &str, sql: Sql) -> TableResult<Vec<Row>> {
        let text = self.render(op, &sql)?;
        self.host.fetch_all(&text, sql.params()).await
    }

    async fn execute(&self, op: &str, sql: Sql) -> TableResult<u64> {
        let text = self.render(op, &sql)?;
        self.host.execute(&text, sql.params()).await
    }
}

fn offset_i64(offset: u64) -> i64 {
    i64::try_from(offset).unwrap_or(i64::MAX)
}
