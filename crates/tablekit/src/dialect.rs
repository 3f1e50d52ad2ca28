//! SQL dialect differences that matter to generated statements.

use serde::{Deserialize, Serialize};

/// The SQL flavour spoken by a host.
///
/// Only quoting, placeholders and the null-safe equality operator differ; every
/// other piece of generated SQL is shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Backtick identifiers, `?` placeholders.
    #[default]
    MySql,
    /// Double-quoted identifiers, `$1, $2, ...` placeholders.
    Postgres,
}

impl Dialect {
    /// Append a quoted identifier segment to `out`.
    pub fn quote_ident_into(self, name: &str, out: &mut String) {
        let quote = match self {
            Dialect::MySql => '`',
            Dialect::Postgres => '"',
        };
        out.push(quote);
        for ch in name.chars() {
            if ch == quote {
                out.push(quote);
            }
            out.push(ch);
        }
        out.push(quote);
    }

    /// Quote a single identifier segment.
    pub fn quote_ident(self, name: &str) -> String {
        let mut out = String::with_capacity(name.len() + 2);
        self.quote_ident_into(name, &mut out);
        out
    }

    /// Append the placeholder for the `index`-th (1-based) bound parameter.
    pub fn push_placeholder(self, index: usize, out: &mut String) {
        match self {
            Dialect::MySql => out.push('?'),
            Dialect::Postgres => {
                out.push('$');
                out.push_str(&index.to_string());
            }
        }
    }

    /// SQL spelling of the null-safe equality operator.
    pub fn null_safe_eq(self) -> &'static str {
        match self {
            Dialect::MySql => "<=>",
            Dialect::Postgres => "IS NOT DISTINCT FROM",
        }
    }

    /// Whether `INSERT ... RETURNING` is available to recover generated keys.
    pub fn supports_returning(self) -> bool {
        matches!(self, Dialect::Postgres)
    }

    /// Query listing a table by exact name. Binds one parameter: the table name.
    pub fn table_exists_sql(self) -> &'static str {
        match self {
            Dialect::MySql => {
                "SELECT table_name FROM information_schema.tables \
                 WHERE table_schema = DATABASE() AND table_name = ?"
            }
            Dialect::Postgres => {
                "SELECT table_name::text FROM information_schema.tables \
                 WHERE table_schema = current_schema() AND table_name::text = $1"
            }
        }
    }

    /// Query listing column names of a table in ordinal order. Binds the table name.
    pub fn columns_sql(self) -> &'static str {
        match self {
            Dialect::MySql => {
                "SELECT column_name FROM information_schema.columns \
                 WHERE table_schema = DATABASE() AND table_name = ? ORDER BY ordinal_position"
            }
            Dialect::Postgres => {
                "SELECT column_name::text FROM information_schema.columns \
                 WHERE table_schema = current_schema() AND table_name::text = $1 \
                 ORDER BY ordinal_position"
            }
        }
    }
}
