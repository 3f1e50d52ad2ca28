//! Result rows returned by a host.

use crate::error::{TableError, TableResult};
use crate::value::Value;
use serde::de::DeserializeOwned;

/// One result row: column names paired with values, in select order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    /// Build a row from parallel column/value vectors.
    ///
    /// Extra values without a column name are dropped.
    pub fn new(columns: Vec<String>, mut values: Vec<Value>) -> Self {
        values.resize(columns.len(), Value::Null);
        Self { columns, values }
    }

    /// Build a row from `(column, value)` pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let (columns, values) = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .unzip();
        Self { columns, values }
    }

    /// Value of the first column named `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|i| &self.values[i])
    }

    /// Value at a column position.
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The row as a JSON object keyed by column name.
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .columns
            .iter()
            .zip(&self.values)
            .map(|(c, v)| (c.clone(), v.to_json()))
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(map)
    }

    /// Deserialize the row into `T` by column name.
    pub fn decode<T: DeserializeOwned>(&self) -> TableResult<T> {
        serde_json::from_value(self.to_json()).map_err(|e| TableError::decode("*", e.to_string()))
    }

    /// Deserialize a single column into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> TableResult<T> {
        let value = self
            .get(name)
            .ok_or_else(|| TableError::decode(name, "column not present in row"))?;
        serde_json::from_value(value.to_json()).map_err(|e| TableError::decode(name, e.to_string()))
    }
}

/// Deserialize every row into `T`.
pub fn decode_rows<T: DeserializeOwned>(rows: &[Row]) -> TableResult<Vec<T>> {
    rows.iter().map(Row::decode).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Post {
        id: i64,
        title: String,
        score: Option<f64>,
    }

    fn row() -> Row {
        Row::from_pairs([
            ("id", Value::Int(7)),
            ("title", Value::from("hello")),
            ("score", Value::Null),
        ])
    }

    #[test]
    fn lookup_by_name_and_index() {
        let r = row();
        assert_eq!(r.get("title"), Some(&Value::from("hello")));
        assert_eq!(r.get_index(0), Some(&Value::Int(7)));
        assert_eq!(r.get("nope"), None);
    }

    #[test]
    fn decodes_into_struct() {
        let post: Post = row().decode().unwrap();
        assert_eq!(
            post,
            Post {
                id: 7,
                title: "hello".into(),
                score: None
            }
        );
    }

    #[test]
    fn decode_error_names_column() {
        let err = row().get_as::<i64>("title").unwrap_err();
        assert!(matches!(err, TableError::Decode { ref column, .. } if column == "title"));
    }

    #[test]
    fn new_pads_missing_values() {
        let r = Row::new(vec!["a".into(), "b".into()], vec![Value::Int(1)]);
        assert_eq!(r.get("b"), Some(&Value::Null));
    }
}
