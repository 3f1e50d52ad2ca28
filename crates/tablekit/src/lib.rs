//! # tablekit
//!
//! Single-table CRUD helpers on top of a host database object.
//!
//! ## Features
//!
//! - **Host-delegated**: tablekit builds statements; a [`Host`] executes them
//! - **Injection-safe WHERE clauses**: values are always bound, field names are
//!   whitelisted against the table's real columns
//! - **Loose inputs**: operators (`"="`, `"not in"`, `"between"`, ...) and
//!   printf-style formats (`%s`, `%d`, `%f`) are normalised, never rejected
//! - **Safe defaults**: UPDATE and DELETE require a WHERE condition
//! - **Two dialects**: MySQL (`` ` `` and `?`) and PostgreSQL (`"` and `$n`)
//!
//! ## Condition builder
//!
//! ```ignore
//! use tablekit::{ConditionSet, Glue, Operator, Table, list};
//!
//! let posts = Table::open(&host, "posts").await?;
//! let rows = posts
//!     .get_wheres(
//!         ["id", "title"],
//!         &ConditionSet::new()
//!             .with("category", "news")
//!             .with_op("id", list([1, 2, 3]), Operator::In)
//!             .glue(Glue::And),
//!         Some("id"),
//!         Some("DESC"),
//!     )
//!     .await?;
//! ```

pub mod builder;
pub mod columns;
pub mod condition;
pub mod config;
pub mod dialect;
pub mod error;
pub mod host;
pub mod ident;
pub mod log;
pub mod row;
pub mod sql;
pub mod table;
pub mod value;

pub use builder::{BuiltSelect, ConditionBuilder};
pub use columns::{Columns, KnownColumns, Order, OrderBy};
pub use condition::{Condition, ConditionSet, Glue, Operator};
pub use config::TableConfig;
pub use dialect::Dialect;
pub use error::{TableError, TableResult};
pub use host::Host;
pub use ident::{Ident, IntoIdent};
pub use log::SqlLog;
pub use row::{Row, decode_rows};
pub use sql::{Sql, sql};
pub use table::{ColumnCounts, Table, prefixed_name};
pub use value::{Format, Operand, Value, list};

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "postgres")]
pub use postgres::{
    PgHost, PgHostConfig, create_pool, create_pool_with_config, create_pool_with_manager_config,
};
