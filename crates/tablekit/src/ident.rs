//! Safe SQL identifier handling.
//!
//! [`Ident`] represents a table or column name. Each dotted segment is
//! validated against `[A-Za-z_][A-Za-z0-9_$]*` and quoted at render time by
//! the target [`Dialect`].
//!
//! # Example
//! ```ignore
//! use tablekit::{Dialect, Ident};
//!
//! let t = Ident::parse("wp_posts")?;
//! assert_eq!(t.render(Dialect::MySql), "`wp_posts`");
//! # Ok::<(), tablekit::TableError>(())
//! ```

use crate::dialect::Dialect;
use crate::error::{TableError, TableResult};
use std::fmt;

/// A validated SQL identifier (column, table, or `schema.table`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident {
    parts: Vec<String>,
}

impl Ident {
    /// Parse an identifier string, supporting dotted notation.
    pub fn parse(s: &str) -> TableResult<Self> {
        if s.is_empty() {
            return Err(TableError::validation("Identifier cannot be empty"));
        }

        let mut parts = Vec::new();
        for segment in s.split('.') {
            validate_segment(segment)?;
            parts.push(segment.to_string());
        }
        Ok(Self { parts })
    }

    /// A single-segment identifier taken verbatim from the host's catalog.
    ///
    /// Dots and other punctuation stay part of the name; quoting escapes
    /// embedded quote characters. Empty names and NUL bytes are rejected.
    pub(crate) fn catalog(name: &str) -> TableResult<Self> {
        if name.is_empty() || name.contains('\0') {
            return Err(TableError::validation(format!(
                "Unusable catalog identifier: {name:?}"
            )));
        }
        Ok(Self {
            parts: vec![name.to_string()],
        })
    }

    /// The unquoted name of the last segment.
    pub fn name(&self) -> &str {
        self.parts.last().map(String::as_str).unwrap_or_default()
    }

    /// The unquoted, dotted form.
    pub fn as_dotted(&self) -> String {
        self.parts.join(".")
    }

    /// Render the identifier quoted for `dialect`.
    pub fn render(&self, dialect: Dialect) -> String {
        let mut out = String::new();
        self.write_sql(dialect, &mut out);
        out
    }

    pub(crate) fn write_sql(&self, dialect: Dialect, out: &mut String) {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            dialect.quote_ident_into(part, out);
        }
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_dotted())
    }
}

fn validate_segment(segment: &str) -> TableResult<()> {
    let mut chars = segment.chars();
    match chars.next() {
        None => return Err(TableError::validation("Empty identifier segment")),
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        Some(c) => {
            return Err(TableError::validation(format!(
                "Invalid identifier start character: '{c}'"
            )));
        }
    }
    for c in chars {
        if !(c == '_' || c == '$' || c.is_ascii_alphanumeric()) {
            return Err(TableError::validation(format!(
                "Invalid character in identifier: '{c}'"
            )));
        }
    }
    Ok(())
}

/// Convert an input into an [`Ident`].
pub trait IntoIdent {
    fn into_ident(self) -> TableResult<Ident>;
}

impl IntoIdent for Ident {
    fn into_ident(self) -> TableResult<Ident> {
        Ok(self)
    }
}

impl IntoIdent for &Ident {
    fn into_ident(self) -> TableResult<Ident> {
        Ok(self.clone())
    }
}

impl IntoIdent for &str {
    fn into_ident(self) -> TableResult<Ident> {
        Ident::parse(self)
    }
}

impl IntoIdent for String {
    fn into_ident(self) -> TableResult<Ident> {
        Ident::parse(&self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ident_simple() {
        let ident = Ident::parse("wp_posts").unwrap();
        assert_eq!(ident.render(Dialect::MySql), "`wp_posts`");
        assert_eq!(ident.render(Dialect::Postgres), "\"wp_posts\"");
    }

    #[test]
    fn ident_dotted() {
        let ident = Ident::parse("public.users").unwrap();
        assert_eq!(ident.render(Dialect::Postgres), "\"public\".\"users\"");
        assert_eq!(ident.name(), "users");
    }

    #[test]
    fn ident_with_dollar() {
        let ident = Ident::parse("my_var$1").unwrap();
        assert_eq!(ident.to_string(), "my_var$1");
    }

    #[test]
    fn ident_rejects_empty() {
        assert!(Ident::parse("").is_err());
    }

    #[test]
    fn ident_rejects_start_digit() {
        assert!(Ident::parse("1table").is_err());
    }

    #[test]
    fn ident_rejects_injection() {
        assert!(Ident::parse("id` = 1 OR `1").is_err());
        assert!(Ident::parse("users; drop table users; --").is_err());
    }

    #[test]
    fn catalog_names_are_single_segments() {
        let ident = Ident::catalog("post.title-v2").unwrap();
        assert_eq!(ident.name(), "post.title-v2");
        assert_eq!(ident.render(Dialect::MySql), "`post.title-v2`");
        assert_eq!(Ident::catalog("a`b").unwrap().render(Dialect::MySql), "`a``b`");
        assert!(Ident::catalog("").is_err());
        assert!(Ident::catalog("a\0b").is_err());
    }

    #[test]
    fn ident_rejects_double_and_trailing_dot() {
        assert!(Ident::parse("schema..table").is_err());
        assert!(Ident::parse("schema.").is_err());
    }
}
