use super::parts::SqlPart;
use crate::dialect::Dialect;
use crate::error::{TableError, TableResult};
use crate::ident::{Ident, IntoIdent};
use crate::value::Value;

/// A parameter-safe dynamic SQL builder.
///
/// `Sql` stores SQL pieces and parameters separately. Identifiers are quoted
/// and placeholders generated only when the statement is rendered for a
/// [`Dialect`].
#[must_use]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sql {
    parts: Vec<SqlPart>,
    params: Vec<Value>,
}

impl Sql {
    /// Create a new builder with an initial SQL fragment.
    pub fn new(initial_sql: impl Into<String>) -> Self {
        let initial_sql = initial_sql.into();
        let parts = if initial_sql.is_empty() {
            Vec::new()
        } else {
            vec![SqlPart::Raw(initial_sql)]
        };
        Self {
            parts,
            params: Vec::new(),
        }
    }

    /// Create an empty builder.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether nothing has been pushed yet.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Append raw SQL (no parameters).
    pub fn push(&mut self, sql: &str) -> &mut Self {
        if sql.is_empty() {
            return self;
        }

        match self.parts.last_mut() {
            Some(SqlPart::Raw(last)) => last.push_str(sql),
            _ => self.parts.push(SqlPart::Raw(sql.to_string())),
        }
        self
    }

    /// Append a parameter placeholder and bind its value.
    pub fn push_bind(&mut self, value: impl Into<Value>) -> &mut Self {
        self.parts.push(SqlPart::Param);
        self.params.push(value.into());
        self
    }

    /// Append a comma-separated list of placeholders and bind all values.
    ///
    /// An empty list appends `NULL`, so `IN (NULL)` stays valid SQL and
    /// matches nothing.
    pub fn push_bind_list<T>(&mut self, values: impl IntoIterator<Item = T>) -> &mut Self
    where
        T: Into<Value>,
    {
        let mut iter = values.into_iter();
        let Some(first) = iter.next() else {
            return self.push("NULL");
        };

        self.push_bind(first);
        for v in iter {
            self.push(", ");
            self.push_bind(v);
        }
        self
    }

    /// Append another `Sql` fragment, consuming it.
    pub fn push_sql(&mut self, mut other: Sql) -> &mut Self {
        let mut incoming = std::mem::take(&mut other.parts).into_iter();
        if let Some(part) = incoming.next() {
            match (self.parts.last_mut(), part) {
                (Some(SqlPart::Raw(last)), SqlPart::Raw(first)) => last.push_str(&first),
                (_, part) => self.parts.push(part),
            }
        }
        self.parts.extend(incoming);
        self.params.append(&mut other.params);
        self
    }

    /// Append a SQL identifier after validating it.
    pub fn push_ident<I>(&mut self, ident: I) -> TableResult<&mut Self>
    where
        I: IntoIdent,
    {
        let ident = ident.into_ident()?;
        self.parts.push(SqlPart::Ident(ident));
        Ok(self)
    }

    /// Append a pre-validated [`Ident`].
    pub fn push_ident_ref(&mut self, ident: &Ident) -> &mut Self {
        self.parts.push(SqlPart::Ident(ident.clone()));
        self
    }

    /// Append identifiers separated by `, `.
    pub fn push_ident_list<'a>(&mut self, idents: impl IntoIterator<Item = &'a Ident>) -> &mut Self {
        for (i, ident) in idents.into_iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.push_ident_ref(ident);
        }
        self
    }

    /// Append `LIMIT ?` with a bound parameter.
    pub fn limit(&mut self, n: i64) -> &mut Self {
        self.push(" LIMIT ").push_bind(n)
    }

    /// Append `OFFSET ?` with a bound parameter.
    pub fn offset(&mut self, n: i64) -> &mut Self {
        self.push(" OFFSET ").push_bind(n)
    }

    /// Render SQL for `dialect`.
    pub fn to_sql(&self, dialect: Dialect) -> String {
        let cap = self
            .parts
            .iter()
            .map(|p| match p {
                SqlPart::Raw(s) => s.len(),
                SqlPart::Ident(_) => 16,
                SqlPart::Param => 3,
            })
            .sum();

        let mut out = String::with_capacity(cap);
        let mut idx = 0;
        for part in &self.parts {
            match part {
                SqlPart::Raw(s) => out.push_str(s),
                SqlPart::Ident(ident) => ident.write_sql(dialect, &mut out),
                SqlPart::Param => {
                    idx += 1;
                    dialect.push_placeholder(idx, &mut out);
                }
            }
        }
        out
    }

    /// Bound values in placeholder order.
    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Check that every placeholder has exactly one bound value.
    pub fn validate(&self) -> TableResult<()> {
        let placeholder_count = self
            .parts
            .iter()
            .filter(|p| matches!(p, SqlPart::Param))
            .count();

        if placeholder_count != self.params.len() {
            let params_len = self.params.len();
            return Err(TableError::Validation(format!(
                "Sql: placeholders({placeholder_count}) != params({params_len})"
            )));
        }
        Ok(())
    }
}
