//! Query condition types for dynamic WHERE clauses.
//!
//! A [`ConditionSet`] is an ordered list of [`Condition`]s plus the defaults
//! used to resolve each condition's operator and format. Operators and formats
//! arrive as loose strings (`"="`, `"not in"`, `"%d"`) and are normalised on
//! the way in: anything unrecognised becomes `=` / `%s`.
//!
//! # Example
//! ```ignore
//! use tablekit::{ConditionSet, Format, Glue, Operator, list};
//!
//! let set = ConditionSet::new()
//!     .with("category", "news")
//!     .with_op("id", list([1, 2, 3]), Operator::In)
//!     .default_format(Format::Integer)
//!     .glue(Glue::Or);
//! ```

use crate::value::{Format, Operand};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Comparison operator of a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Operator {
    /// `=`
    #[default]
    Eq,
    /// `!=`
    Neq,
    /// `>`
    Gt,
    /// `<`
    Lt,
    /// `>=`
    Gte,
    /// `<=`
    Lte,
    /// Null-safe equality, `<=>`
    Spaceship,
    Like,
    NotLike,
    In,
    NotIn,
    Between,
    NotBetween,
}

impl Operator {
    pub const ALL: [Operator; 13] = [
        Operator::Eq,
        Operator::Neq,
        Operator::Gt,
        Operator::Lt,
        Operator::Gte,
        Operator::Lte,
        Operator::Spaceship,
        Operator::Like,
        Operator::NotLike,
        Operator::In,
        Operator::NotIn,
        Operator::Between,
        Operator::NotBetween,
    ];

    /// Parse an operator, falling back to [`Operator::Eq`] when unrecognised.
    ///
    /// Accepts SQL spellings (`"!="`, `"not like"`, case-insensitive, any run of
    /// whitespace or underscores between words) and short names (`"neq"`, `"gte"`).
    pub fn parse(token: &str) -> Self {
        let normalized = token
            .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
            .filter(|w| !w.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_lowercase();

        match normalized.as_str() {
            "=" | "eq" => Operator::Eq,
            "!=" | "<>" | "neq" | "ne" => Operator::Neq,
            ">" | "gt" => Operator::Gt,
            "<" | "lt" => Operator::Lt,
            ">=" | "gte" => Operator::Gte,
            "<=" | "lte" => Operator::Lte,
            "<=>" | "spaceship" => Operator::Spaceship,
            "like" => Operator::Like,
            "not like" | "notlike" => Operator::NotLike,
            "in" => Operator::In,
            "not in" | "notin" => Operator::NotIn,
            "between" => Operator::Between,
            "not between" | "notbetween" => Operator::NotBetween,
            _ => {
                tracing::debug!(target: "tablekit", operator = token, "unknown operator, using =");
                Operator::Eq
            }
        }
    }

    /// The canonical SQL spelling (MySQL flavour for the spaceship).
    pub fn as_sql(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Neq => "!=",
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Gte => ">=",
            Operator::Lte => "<=",
            Operator::Spaceship => "<=>",
            Operator::Like => "LIKE",
            Operator::NotLike => "NOT LIKE",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
            Operator::Between => "BETWEEN",
            Operator::NotBetween => "NOT BETWEEN",
        }
    }

    /// Whether this operator expects a list operand.
    pub fn takes_list(self) -> bool {
        matches!(
            self,
            Operator::In | Operator::NotIn | Operator::Between | Operator::NotBetween
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl From<String> for Operator {
    fn from(s: String) -> Self {
        Operator::parse(&s)
    }
}

impl From<&str> for Operator {
    fn from(s: &str) -> Self {
        Operator::parse(s)
    }
}

impl From<Operator> for String {
    fn from(op: Operator) -> Self {
        op.as_sql().to_string()
    }
}

/// Boolean connector placed before every emitted clause after the first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Glue {
    #[default]
    And,
    Or,
    /// No connector; clauses are separated by a single space.
    None,
}

impl Glue {
    /// Parse `"AND"` / `"OR"` (case-insensitive); anything else is [`Glue::None`].
    pub fn parse(token: &str) -> Self {
        match token.trim().to_ascii_uppercase().as_str() {
            "AND" => Glue::And,
            "OR" => Glue::Or,
            _ => Glue::None,
        }
    }

    /// Separator text between two clauses.
    pub fn separator(self) -> &'static str {
        match self {
            Glue::And => " AND ",
            Glue::Or => " OR ",
            Glue::None => " ",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Glue::And => "AND",
            Glue::Or => "OR",
            Glue::None => "NONE",
        }
    }
}

impl From<String> for Glue {
    fn from(s: String) -> Self {
        Glue::parse(&s)
    }
}

impl From<&str> for Glue {
    fn from(s: &str) -> Self {
        Glue::parse(s)
    }
}

impl From<Glue> for String {
    fn from(glue: Glue) -> Self {
        glue.as_str().to_string()
    }
}

/// A single `field OP value` test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub value: Operand,
    /// Explicit operator; wins over positional and default operators.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<Operator>,
    /// Explicit format; wins over positional and default formats.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<Format>,
}

impl Condition {
    /// A condition whose operator and format come from the enclosing set.
    pub fn new(field: impl Into<String>, value: impl Into<Operand>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            operator: None,
            format: None,
        }
    }

    /// Pin the operator for this condition.
    pub fn op(mut self, operator: impl Into<Operator>) -> Self {
        self.operator = Some(operator.into());
        self
    }

    /// Pin the format for this condition.
    pub fn format(mut self, format: impl Into<Format>) -> Self {
        self.format = Some(format.into());
        self
    }
}

/// An ordered list of conditions with resolution defaults.
///
/// Operator and format are resolved per condition in three tiers: the
/// condition's own setting, then the positional override at the condition's
/// index, then the set-wide default. Indices count every condition, including
/// ones later skipped for a falsy value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConditionSet {
    pub conditions: Vec<Condition>,
    pub operators: Vec<Operator>,
    pub formats: Vec<Format>,
    pub default_operator: Operator,
    /// `None` binds values exactly as given.
    pub default_format: Option<Format>,
    pub glue: Glue,
    /// Emit conditions even when their value is falsy.
    pub keep_falsy: bool,
}

impl ConditionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a condition.
    pub fn push(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Append `field = value` (operator and format resolved from the set).
    pub fn with(self, field: impl Into<String>, value: impl Into<Operand>) -> Self {
        self.push(Condition::new(field, value))
    }

    /// Append a condition with an explicit operator.
    pub fn with_op(
        self,
        field: impl Into<String>,
        value: impl Into<Operand>,
        operator: impl Into<Operator>,
    ) -> Self {
        self.push(Condition::new(field, value).op(operator))
    }

    pub fn default_operator(mut self, operator: impl Into<Operator>) -> Self {
        self.default_operator = operator.into();
        self
    }

    pub fn default_format(mut self, format: impl Into<Format>) -> Self {
        self.default_format = Some(format.into());
        self
    }

    /// Positional operator overrides (index `i` applies to condition `i`).
    pub fn operators<O: Into<Operator>>(mut self, operators: impl IntoIterator<Item = O>) -> Self {
        self.operators = operators.into_iter().map(Into::into).collect();
        self
    }

    /// Positional format overrides (index `i` applies to condition `i`).
    pub fn formats<F: Into<Format>>(mut self, formats: impl IntoIterator<Item = F>) -> Self {
        self.formats = formats.into_iter().map(Into::into).collect();
        self
    }

    pub fn glue(mut self, glue: Glue) -> Self {
        self.glue = glue;
        self
    }

    pub fn keep_falsy(mut self, keep: bool) -> Self {
        self.keep_falsy = keep;
        self
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Effective operator for the condition at `index`.
    pub fn operator_at(&self, index: usize) -> Operator {
        self.conditions
            .get(index)
            .and_then(|c| c.operator)
            .or_else(|| self.operators.get(index).copied())
            .unwrap_or(self.default_operator)
    }

    /// Effective format for the condition at `index`, if any tier sets one.
    pub fn format_at(&self, index: usize) -> Option<Format> {
        self.conditions
            .get(index)
            .and_then(|c| c.format)
            .or_else(|| self.formats.get(index).copied())
            .or(self.default_format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_parse_accepts_sql_and_names() {
        assert_eq!(Operator::parse("="), Operator::Eq);
        assert_eq!(Operator::parse("NOT  LIKE"), Operator::NotLike);
        assert_eq!(Operator::parse("not_in"), Operator::NotIn);
        assert_eq!(Operator::parse("not-between"), Operator::NotBetween);
        assert_eq!(Operator::parse("<=>"), Operator::Spaceship);
        assert_eq!(Operator::parse("gte"), Operator::Gte);
    }

    #[test]
    fn operator_parse_normalizes_unknown_to_eq() {
        assert_eq!(Operator::parse("~*"), Operator::Eq);
        assert_eq!(Operator::parse("; DROP TABLE x"), Operator::Eq);
        assert_eq!(Operator::parse(""), Operator::Eq);
    }

    #[test]
    fn every_operator_round_trips_through_sql_spelling() {
        for op in Operator::ALL {
            assert_eq!(Operator::parse(op.as_sql()), op);
        }
    }

    #[test]
    fn glue_parse() {
        assert_eq!(Glue::parse("or"), Glue::Or);
        assert_eq!(Glue::parse("AND"), Glue::And);
        assert_eq!(Glue::parse(""), Glue::None);
    }

    #[test]
    fn glue_deserializes_loosely() {
        let glue: Glue = serde_json::from_str("\"or\"").unwrap();
        assert_eq!(glue, Glue::Or);
        let glue: Glue = serde_json::from_str("\" And \"").unwrap();
        assert_eq!(glue, Glue::And);
        let glue: Glue = serde_json::from_str("\"whatever\"").unwrap();
        assert_eq!(glue, Glue::None);
        assert_eq!(serde_json::to_string(&Glue::Or).unwrap(), "\"OR\"");

        let set: ConditionSet = serde_json::from_str(r#"{"glue": "or"}"#).unwrap();
        assert_eq!(set.glue, Glue::Or);
    }

    #[test]
    fn three_tier_resolution() {
        let set = ConditionSet::new()
            .with("a", 1)
            .push(Condition::new("b", 2).op(">").format("%d"))
            .with("c", 3)
            .operators(["<", "!="])
            .formats(["%f"])
            .default_operator("like")
            .default_format("%s");

        assert_eq!(set.operator_at(0), Operator::Lt);
        assert_eq!(set.operator_at(1), Operator::Gt);
        assert_eq!(set.operator_at(2), Operator::Like);

        assert_eq!(set.format_at(0), Some(Format::Float));
        assert_eq!(set.format_at(1), Some(Format::Integer));
        assert_eq!(set.format_at(2), Some(Format::String));
        assert_eq!(ConditionSet::new().with("a", 1).format_at(0), None);
    }

    #[test]
    fn condition_set_from_json() {
        let set: ConditionSet = serde_json::from_str(
            r#"{
                "conditions": [
                    {"field": "category", "value": "news"},
                    {"field": "id", "value": [1, 2], "operator": "in", "format": "%d"}
                ],
                "default_operator": "bogus",
                "glue": "OR"
            }"#,
        )
        .unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.default_operator, Operator::Eq);
        assert_eq!(set.operator_at(1), Operator::In);
        assert_eq!(set.format_at(1), Some(Format::Integer));
        assert_eq!(set.format_at(0), None);
        assert_eq!(set.glue, Glue::Or);
    }
}
