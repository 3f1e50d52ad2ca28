//! Loosely typed values bound into queries.
//!
//! The host platform hands around scalars whose type is only pinned down when
//! they are bound through a printf-style format token (`%s`, `%d`, `%f`).
//! [`Value`] models those scalars, [`Operand`] models "a scalar or a list of
//! scalars" (lists feed `IN` / `BETWEEN`), and [`Format`] performs the coercion.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A scalar value passed to or returned from the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Loose truthiness: `NULL`, `false`, `0`, `0.0`, `""` and `"0"` are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Text(s) => !(s.is_empty() || s == "0"),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Integer view of this value (`intval` semantics).
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Null => None,
            Value::Bool(b) => Some(i64::from(*b)),
            Value::Int(i) => Some(*i),
            Value::Float(f) => Some(f.trunc() as i64),
            Value::Text(s) => Some(parse_leading_int(s)),
        }
    }

    /// Float view of this value (`floatval` semantics).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Null => None,
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Text(s) => Some(parse_leading_float(s)),
        }
    }

    /// Text view of this value. `NULL` has none.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Bool(true) => Some("1".to_string()),
            Value::Bool(false) => Some(String::new()),
            Value::Int(i) => Some(i.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::Text(s) => Some(s.clone()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Convert a JSON scalar. Arrays and objects are stored as their JSON text.
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map_or(Value::Null, Value::Float),
            },
            serde_json::Value::String(s) => Value::Text(s.clone()),
            other => Value::Text(other.to_string()),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Value::Text(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(s) => write!(f, "{s:?}"),
        }
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Int(i64::from(v))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// The right-hand side of a condition: one scalar or an ordered list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Operand {
    List(Vec<Value>),
    Scalar(Value),
}

impl Operand {
    /// An empty list is falsy, otherwise defer to the scalar.
    pub fn is_truthy(&self) -> bool {
        match self {
            Operand::Scalar(v) => v.is_truthy(),
            Operand::List(vs) => !vs.is_empty(),
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Operand::List(vs) => Some(vs),
            Operand::Scalar(_) => None,
        }
    }
}

macro_rules! impl_scalar_operand {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Operand {
                fn from(v: $t) -> Self {
                    Operand::Scalar(v.into())
                }
            }
        )*
    };
}

impl_scalar_operand!(Value, bool, i8, i16, i32, i64, u8, u16, u32, f32, f64, &str, String);

impl From<Vec<Value>> for Operand {
    fn from(v: Vec<Value>) -> Self {
        Operand::List(v)
    }
}

impl<T: Into<Value>> FromIterator<T> for Operand {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Operand::List(iter.into_iter().map(Into::into).collect())
    }
}

/// Build a list [`Operand`] from anything iterable.
pub fn list<T: Into<Value>>(values: impl IntoIterator<Item = T>) -> Operand {
    values.into_iter().collect()
}

/// A printf-style format token controlling how a value is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Format {
    /// `%s`
    #[default]
    String,
    /// `%d`
    Integer,
    /// `%f`
    Float,
}

impl Format {
    /// Parse a format token, falling back to [`Format::String`] when unrecognised.
    pub fn parse(token: &str) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "%s" | "s" | "string" | "str" => Format::String,
            "%d" | "d" | "integer" | "int" => Format::Integer,
            "%f" | "f" | "float" => Format::Float,
            other => {
                tracing::debug!(target: "tablekit", format = other, "unknown format, using %s");
                Format::String
            }
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            Format::String => "%s",
            Format::Integer => "%d",
            Format::Float => "%f",
        }
    }

    /// Coerce a value the way it would be bound through this format.
    ///
    /// `NULL` is never coerced.
    pub fn coerce(self, value: &Value) -> Value {
        if value.is_null() {
            return Value::Null;
        }
        match self {
            Format::Integer => value.as_i64().map_or(Value::Null, Value::Int),
            Format::Float => value.as_f64().map_or(Value::Null, Value::Float),
            Format::String => value.as_text().map_or(Value::Null, Value::Text),
        }
    }
}

impl From<String> for Format {
    fn from(s: String) -> Self {
        Format::parse(&s)
    }
}

impl From<&str> for Format {
    fn from(s: &str) -> Self {
        Format::parse(s)
    }
}

impl From<Format> for String {
    fn from(f: Format) -> Self {
        f.token().to_string()
    }
}

/// The numeric prefix of `s`, after leading whitespace.
fn numeric_prefix(s: &str, allow_fraction: bool) -> &str {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut has_digits = end > digits_start;
    if allow_fraction {
        if end < bytes.len() && bytes[end] == b'.' {
            let frac_start = end + 1;
            let mut frac_end = frac_start;
            while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
                frac_end += 1;
            }
            if has_digits || frac_end > frac_start {
                end = frac_end;
                has_digits = true;
            }
        }
        if has_digits && end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
            let mut exp_end = end + 1;
            if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
                exp_end += 1;
            }
            let exp_digits = exp_end;
            while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
                exp_end += 1;
            }
            if exp_end > exp_digits {
                end = exp_end;
            }
        }
    }
    if has_digits { &s[..end] } else { "" }
}

fn parse_leading_int(s: &str) -> i64 {
    let prefix = numeric_prefix(s, false);
    if prefix.is_empty() {
        return 0;
    }
    prefix.parse::<i64>().unwrap_or_else(|_| {
        // Saturate on overflow.
        if prefix.starts_with('-') {
            i64::MIN
        } else {
            i64::MAX
        }
    })
}

fn parse_leading_float(s: &str) -> f64 {
    numeric_prefix(s, true).parse::<f64>().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falsy_values() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(!Value::Float(0.0).is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(!Value::from("0").is_truthy());
        assert!(!Operand::List(vec![]).is_truthy());
    }

    #[test]
    fn truthy_values() {
        assert!(Value::Int(-1).is_truthy());
        assert!(Value::from("0.0").is_truthy());
        assert!(Value::from("false").is_truthy());
        assert!(Operand::List(vec![Value::Null]).is_truthy());
    }

    #[test]
    fn integer_format_coerces_text_prefix() {
        assert_eq!(Format::Integer.coerce(&"12abc".into()), Value::Int(12));
        assert_eq!(Format::Integer.coerce(&"abc".into()), Value::Int(0));
        assert_eq!(Format::Integer.coerce(&"  -7".into()), Value::Int(-7));
        assert_eq!(Format::Integer.coerce(&Value::Float(3.9)), Value::Int(3));
        assert_eq!(Format::Integer.coerce(&Value::Bool(true)), Value::Int(1));
    }

    #[test]
    fn float_format_coerces_text_prefix() {
        assert_eq!(Format::Float.coerce(&"1.5kg".into()), Value::Float(1.5));
        assert_eq!(Format::Float.coerce(&"2e3".into()), Value::Float(2000.0));
        assert_eq!(Format::Float.coerce(&".5".into()), Value::Float(0.5));
        assert_eq!(Format::Float.coerce(&"x".into()), Value::Float(0.0));
    }

    #[test]
    fn string_format_renders_text() {
        assert_eq!(Format::String.coerce(&Value::Int(102)), Value::from("102"));
        assert_eq!(Format::String.coerce(&Value::Bool(true)), Value::from("1"));
        assert_eq!(Format::String.coerce(&Value::Bool(false)), Value::from(""));
        assert_eq!(Format::String.coerce(&Value::Null), Value::Null);
    }

    #[test]
    fn format_parse_normalizes_unknown() {
        assert_eq!(Format::parse("%d"), Format::Integer);
        assert_eq!(Format::parse("FLOAT"), Format::Float);
        assert_eq!(Format::parse("%x"), Format::String);
    }

    #[test]
    fn json_scalars_convert() {
        let json = serde_json::json!({"n": 3, "f": 1.5, "s": "x", "tags": ["a"]});
        assert_eq!(Value::from_json(&json["n"]), Value::Int(3));
        assert_eq!(Value::from_json(&json["f"]), Value::Float(1.5));
        assert_eq!(Value::from_json(&json["s"]), Value::from("x"));
        assert_eq!(Value::from_json(&json["tags"]), Value::from("[\"a\"]"));
        assert_eq!(Value::from_json(&json["missing"]), Value::Null);
    }

    #[test]
    fn operand_from_json() {
        let op: Operand = serde_json::from_str("[1, 2, \"x\"]").unwrap();
        assert_eq!(
            op,
            Operand::List(vec![Value::Int(1), Value::Int(2), Value::from("x")])
        );
        let op: Operand = serde_json::from_str("102").unwrap();
        assert_eq!(op, Operand::Scalar(Value::Int(102)));
        let f: Format = serde_json::from_str("\"%f\"").unwrap();
        assert_eq!(f, Format::Float);
    }
}
