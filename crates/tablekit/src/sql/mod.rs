//! Dialect-neutral SQL fragments with bound values.
//!
//! [`Sql`] keeps SQL text, identifiers and parameter slots apart until it is
//! rendered for a [`Dialect`](crate::Dialect), so the same fragment can become
//! `` `id` = ? `` for MySQL or `"id" = $1` for PostgreSQL.
//!
//! # Example
//!
//! ```ignore
//! use tablekit::{sql, Dialect};
//!
//! let mut q = sql("SELECT * FROM ");
//! q.push_ident("wp_posts")?;
//! q.push(" WHERE ").push_ident("id")?;
//! q.push(" = ").push_bind(102);
//!
//! assert_eq!(q.to_sql(Dialect::MySql), "SELECT * FROM `wp_posts` WHERE `id` = ?");
//! # Ok::<(), tablekit::TableError>(())
//! ```

mod builder;
mod parts;


pub use builder::Sql;

/// Start building a SQL statement.
pub fn sql(initial_sql: impl Into<String>) -> Sql {
    Sql::new(initial_sql)
}
