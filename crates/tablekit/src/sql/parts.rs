use crate::ident::Ident;

/// One piece of a [`Sql`](super::Sql) statement.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SqlPart {
    Raw(String),
    /// Quoted by the dialect at render time.
    Ident(Ident),
    /// A placeholder for the next bound value.
    Param,
}
