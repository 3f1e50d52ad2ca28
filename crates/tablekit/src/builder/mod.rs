//! WHERE-clause assembly.
//!
//! [`ConditionBuilder`] folds a [`ConditionSet`] into a parameterised
//! fragment. Each condition's operator picks a renderer; field names are
//! whitelisted against [`KnownColumns`], values are always bound.
//!
//! ```ignore
//! use tablekit::{Columns, ConditionBuilder, ConditionSet, KnownColumns, Dialect};
//!
//! let known = KnownColumns::new(["id", "slug"]);
//! let built = ConditionBuilder::new(&known).build(
//!     &Columns::from(["id", "slug"]),
//!     &ConditionSet::new().with("id", 102),
//!     None,
//!     None,
//! )?;
//! assert_eq!(built.where_sql(Dialect::MySql), "`id` = ?");
//! # Ok::<(), tablekit::TableError>(())
//! ```


use crate::columns::{Columns, KnownColumns, Order, OrderBy};
use crate::condition::{ConditionSet, Operator};
use crate::dialect::Dialect;
use crate::error::{TableError, TableResult};
use crate::ident::Ident;
use crate::sql::Sql;
use crate::value::{Format, Operand, Value};

/// Stateless builder turning condition sets into WHERE fragments.
#[derive(Debug, Clone, Copy)]
pub struct ConditionBuilder<'a> {
    known: &'a KnownColumns,
    dialect: Dialect,
}

/// Output of [`ConditionBuilder::build`].
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltSelect {
    /// Output columns after whitelisting.
    pub columns: Columns,
    /// WHERE fragment without the `WHERE` keyword; empty when nothing was emitted.
    pub filter: Sql,
    /// Number of clauses in `filter`.
    pub clauses: usize,
    pub order_by: Option<OrderBy>,
}

impl<'a> ConditionBuilder<'a> {
    pub fn new(known: &'a KnownColumns) -> Self {
        Self {
            known,
            dialect: Dialect::default(),
        }
    }

    /// Dialect used for dialect-specific operators (the null-safe `<=>`).
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Resolve output columns, the WHERE fragment and ordering in one pass.
    pub fn build(
        &self,
        columns: &Columns,
        conditions: &ConditionSet,
        order_by: Option<&str>,
        order: Option<&str>,
    ) -> TableResult<BuiltSelect> {
        let columns = self.known.select(columns);
        let order_by = self.known.order_by(order_by, Order::parse_opt(order));
        let (filter, clauses) = self.build_where(conditions)?;
        Ok(BuiltSelect {
            columns,
            filter,
            clauses,
            order_by,
        })
    }

    /// Fold `set` into a WHERE fragment, returning it with its clause count.
    pub fn build_where(&self, set: &ConditionSet) -> TableResult<(Sql, usize)> {
        let mut filter = Sql::empty();
        let mut emitted = 0;

        for (index, condition) in set.conditions.iter().enumerate() {
            if !set.keep_falsy && !condition.value.is_truthy() {
                continue;
            }

            let Some(field) = self.known.get(&condition.field) else {
                tracing::warn!(
                    target: "tablekit",
                    field = %condition.field,
                    "dropping condition on unknown column"
                );
                continue;
            };

            let operator = set.operator_at(index);
            let format = set.format_at(index);
            let clause = self.render(field, &condition.value, operator, format)?;

            if emitted > 0 {
                filter.push(set.glue.separator());
            }
            filter.push_sql(clause);
            emitted += 1;
        }

        Ok((filter, emitted))
    }

    /// Render one `field OP value` clause.
    pub fn render(
        &self,
        field: &Ident,
        value: &Operand,
        operator: Operator,
        format: Option<Format>,
    ) -> TableResult<Sql> {
        let bind = |v: &Value| match format {
            Some(f) => f.coerce(v),
            None => v.clone(),
        };

        let mut sql = Sql::empty();
        sql.push_ident_ref(field);

        match operator {
            Operator::In | Operator::NotIn => {
                let Some(values) = value.as_list() else {
                    return Err(TableError::validation(format!(
                        "Values for {operator} on `{field}` must be a list"
                    )));
                };
                sql.push(" ").push(operator.as_sql()).push(" (");
                sql.push_bind_list(values.iter().map(bind));
                sql.push(")");
            }
            Operator::Between | Operator::NotBetween => {
                let (low, high) = match value.as_list() {
                    Some([low, high, ..]) => (low, high),
                    _ => {
                        return Err(TableError::validation(format!(
                            "Values for {operator} on `{field}` must contain at least two items"
                        )));
                    }
                };
                sql.push(" ").push(operator.as_sql()).push(" ");
                sql.push_bind(bind(low)).push(" AND ").push_bind(bind(high));
            }
            _ => {
                let Operand::Scalar(v) = value else {
                    return Err(TableError::validation(format!(
                        "Operator {operator} on `{field}` expects a single value"
                    )));
                };
                let symbol = match operator {
                    Operator::Spaceship => self.dialect.null_safe_eq(),
                    other => other.as_sql(),
                };
                sql.push(" ").push(symbol).push(" ");
                sql.push_bind(bind(v));
            }
        }

        Ok(sql)
    }
}

impl BuiltSelect {
    /// The WHERE fragment rendered for `dialect`.
    pub fn where_sql(&self, dialect: Dialect) -> String {
        self.filter.to_sql(dialect)
    }

    /// Values bound by the WHERE fragment, in placeholder order.
    pub fn values(&self) -> &[Value] {
        self.filter.params()
    }

    /// Assemble `SELECT <columns> FROM <table> [WHERE ...] [ORDER BY ...]`.
    pub fn to_select(&self, table: &Ident, known: &KnownColumns) -> Sql {
        let mut sql = select_head(table, &self.columns, known);
        if self.clauses > 0 {
            sql.push(" WHERE ");
            sql.push_sql(self.filter.clone());
        }
        push_order_by(&mut sql, self.order_by.as_ref());
        sql
    }
}

/// `SELECT <columns> FROM <table>`; list columns must already be known.
pub(crate) fn select_head(table: &Ident, columns: &Columns, known: &KnownColumns) -> Sql {
    let mut sql = Sql::new("SELECT ");
    match columns {
        Columns::All => {
            sql.push("*");
        }
        Columns::List(names) => {
            sql.push_ident_list(names.iter().filter_map(|n| known.get(n)));
        }
    }
    sql.push(" FROM ").push_ident_ref(table);
    sql
}

pub(crate) fn push_order_by(sql: &mut Sql, order_by: Option<&OrderBy>) {
    if let Some(ob) = order_by {
        sql.push(" ORDER BY ")
            .push_ident_ref(&ob.column)
            .push(" ")
            .push(ob.order.as_sql());
    }
}
