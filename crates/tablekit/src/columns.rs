//! Column whitelisting and ordering.

use crate::ident::Ident;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The set of columns a table is known to have.
///
/// Every identifier taken from caller input is checked against this set
/// before it reaches generated SQL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownColumns {
    ordered: Vec<Ident>,
    index: HashMap<String, usize>,
}

impl KnownColumns {
    /// Build from column names reported by the host.
    ///
    /// Each name is one quoted segment, so hyphens, dots and non-ASCII
    /// characters are kept. Empty names are ignored.
    pub fn new<S: AsRef<str>>(names: impl IntoIterator<Item = S>) -> Self {
        let mut known = Self::default();
        for name in names {
            let name = name.as_ref();
            match Ident::catalog(name) {
                Ok(ident) => {
                    if !known.index.contains_key(name) {
                        known.index.insert(name.to_string(), known.ordered.len());
                        known.ordered.push(ident);
                    }
                }
                Err(err) => {
                    tracing::warn!(target: "tablekit", column = name, error = %err, "ignoring unusable column name");
                }
            }
        }
        known
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// The validated identifier for `name`, if known.
    pub fn get(&self, name: &str) -> Option<&Ident> {
        self.index.get(name).map(|&i| &self.ordered[i])
    }

    /// Known columns in the order the host reported them.
    pub fn idents(&self) -> &[Ident] {
        &self.ordered
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Resolve a requested column list, dropping unknown names.
    ///
    /// Falls back to [`Columns::All`] when nothing survives.
    pub fn select(&self, requested: &Columns) -> Columns {
        let Columns::List(names) = requested else {
            return Columns::All;
        };

        let kept: Vec<String> = names
            .iter()
            .filter(|name| {
                let known = self.contains(name);
                if !known {
                    tracing::debug!(target: "tablekit", column = %name, "dropping unknown column");
                }
                known
            })
            .cloned()
            .collect();

        if kept.is_empty() {
            Columns::All
        } else {
            Columns::List(kept)
        }
    }
}

/// Output columns of a SELECT: `*` or an explicit list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Columns {
    #[default]
    All,
    List(Vec<String>),
}

impl Columns {
    pub fn list<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Columns::List(names.into_iter().map(Into::into).collect())
    }
}

impl From<&str> for Columns {
    /// `"*"` (or an empty string) selects everything; otherwise a comma-separated list.
    fn from(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() || s == "*" {
            return Columns::All;
        }
        Columns::list(s.split(',').map(str::trim).filter(|c| !c.is_empty()))
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for Columns {
    fn from(names: [S; N]) -> Self {
        Columns::list(names)
    }
}

impl From<Vec<String>> for Columns {
    fn from(names: Vec<String>) -> Self {
        Columns::List(names)
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

impl Order {
    /// `"ASC"` / `"DESC"` (exact, upper-case). Anything else is `ASC`.
    pub fn parse(token: &str) -> Self {
        match token {
            "DESC" => Order::Desc,
            _ => Order::Asc,
        }
    }

    /// Parse an optional token, defaulting to `ASC`.
    pub fn parse_opt(token: Option<&str>) -> Self {
        token.map_or(Order::Asc, Order::parse)
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}

impl From<String> for Order {
    fn from(s: String) -> Self {
        Order::parse(&s)
    }
}

impl From<&str> for Order {
    fn from(s: &str) -> Self {
        Order::parse(s)
    }
}

impl From<Order> for String {
    fn from(o: Order) -> Self {
        o.as_sql().to_string()
    }
}

/// A validated `ORDER BY column direction`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: Ident,
    pub order: Order,
}

impl KnownColumns {
    /// Resolve an optional `ORDER BY`; unknown columns drop the ordering.
    pub fn order_by(&self, column: Option<&str>, order: Order) -> Option<OrderBy> {
        let name = column?;
        match self.get(name) {
            Some(ident) => Some(OrderBy {
                column: ident.clone(),
                order,
            }),
            None => {
                tracing::debug!(target: "tablekit", column = name, "dropping ORDER BY on unknown column");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;

    fn known() -> KnownColumns {
        KnownColumns::new(["id", "slug", "title", "date"])
    }

    #[test]
    fn select_drops_unknown_columns() {
        let cols = known().select(&Columns::from(["id", "nope", "slug"]));
        assert_eq!(cols, Columns::list(["id", "slug"]));
    }

    #[test]
    fn select_falls_back_to_star() {
        assert_eq!(known().select(&Columns::from(["nope"])), Columns::All);
        assert_eq!(known().select(&Columns::All), Columns::All);
        assert_eq!(known().select(&Columns::List(vec![])), Columns::All);
    }

    #[test]
    fn columns_from_comma_string() {
        assert_eq!(Columns::from("*"), Columns::All);
        assert_eq!(Columns::from("id, slug"), Columns::list(["id", "slug"]));
    }

    #[test]
    fn order_defaults_to_asc() {
        assert_eq!(Order::parse_opt(None), Order::Asc);
        assert_eq!(Order::parse("DESC"), Order::Desc);
        assert_eq!(Order::parse("desc; --"), Order::Asc);
    }

    #[test]
    fn order_by_requires_known_column() {
        let k = known();
        assert!(k.order_by(Some("date"), Order::Desc).is_some());
        assert!(k.order_by(Some("date DESC"), Order::Desc).is_none());
        assert!(k.order_by(None, Order::Asc).is_none());
    }

    #[test]
    fn host_names_are_kept_verbatim() {
        let k = KnownColumns::new(["id", "post-title", "prix_é", "meta.key", "", "id"]);
        assert_eq!(k.len(), 4);
        assert!(k.contains("post-title"));
        assert!(k.contains("prix_é"));
        assert_eq!(k.get("meta.key").map(|i| i.render(Dialect::MySql)), Some("`meta.key`".to_string()));
        assert!(!k.contains("meta"));
    }
}
