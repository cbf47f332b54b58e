//! Row data model: values, rows, field schema and header aliases.

use crate::error::{Error, Result};
use linked_hash_map::LinkedHashMap;
use serde::Deserialize;
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// A single cell value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Int(i64),
    Float(f64),
    /// Absent value, rendered as an empty field
    Null,
}

impl Value {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Text form of the value as it appears in a delimited record
    #[must_use]
    pub fn render(&self) -> Cow<'_, str> {
        match self {
            Self::Text(s) => Cow::Borrowed(s),
            Self::Int(i) => Cow::Owned(i.to_string()),
            Self::Float(x) => Cow::Owned(x.to_string()),
            Self::Null => Cow::Borrowed(""),
        }
    }

    /// Convert a scalar JSON value.
    ///
    /// # Errors
    /// Arrays and objects are not cell values and give `Error::InvalidRow`.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::Null => Ok(Self::Null),
            serde_json::Value::Bool(b) => Ok(Self::Text(b.to_string())),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Self::Int(i))
                } else if n.is_u64() {
                    // Beyond i64; keep the exact digits
                    Ok(Self::Text(n.to_string()))
                } else {
                    Ok(n.as_f64().map_or(Self::Null, Self::Float))
                }
            }
            serde_json::Value::String(s) => Ok(Self::Text(s.clone())),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => Err(Error::InvalidRow(
                format!("nested value is not a cell: {value}"),
            )),
        }
    }

    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Text(s) => serde_json::Value::String(s.clone()),
            Self::Int(i) => serde_json::Value::from(*i),
            Self::Float(x) => serde_json::Number::from_f64(*x)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Self::Null => serde_json::Value::Null,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Ordered mapping from field name to value.
///
/// Rows may carry fields the writer does not declare; codecs drop them.
///
/// # Example
///
/// ```
/// use scoped_io::{Row, Value};
///
/// let row = Row::new().with("id", 1).with("name", "Ann");
/// assert_eq!(row.get("id"), Some(&Value::Int(1)));
/// assert_eq!(row.get("missing"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row(LinkedHashMap<String, Value>);

impl Row {
    #[must_use]
    pub fn new() -> Self {
        Self(LinkedHashMap::new())
    }

    /// Add a field, returning self for chaining
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    /// Set a field; returns the previous value if the field was present
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Values in schema order; `None` for fields the row does not carry
    pub fn project<'a>(
        &'a self,
        schema: &'a FieldSchema,
    ) -> impl Iterator<Item = Option<&'a Value>> + 'a {
        schema.iter().map(move |name| self.0.get(name))
    }

    /// Build a row from a JSON object, keeping the object's key order.
    ///
    /// # Errors
    /// - the value is not an object
    /// - a field holds an array or object
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let serde_json::Value::Object(map) = value else {
            return Err(Error::InvalidRow(format!("expected a JSON object, got {value}")));
        };
        let mut row = Self::new();
        for (field, cell) in map {
            row.insert(field.clone(), Value::from_json(cell)?);
        }
        Ok(row)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Self::new();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}

/// Ordered, duplicate-free list of declared field names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    names: Vec<String>,
}

impl FieldSchema {
    /// Create a schema from field names.
    ///
    /// # Errors
    /// Returns `Error::InvalidSchema` if there are no names or a name repeats.
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(Error::InvalidSchema("no field names".to_string()));
        }
        let mut seen = HashSet::with_capacity(names.len());
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(Error::InvalidSchema(format!("duplicate field '{name}'")));
            }
        }
        Ok(Self { names })
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.names.iter().any(|n| n == field)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Header labels in field order, taken from `aliases` where present
    #[must_use]
    pub fn header<'a>(&'a self, aliases: Option<&'a HeaderAliases>) -> Vec<&'a str> {
        match aliases {
            Some(aliases) => self.iter().map(|name| aliases.label_for(name)).collect(),
            None => self.iter().collect(),
        }
    }
}

/// Display labels for declared fields, used once for the header row
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct HeaderAliases(HashMap<String, String>);

impl HeaderAliases {
    #[must_use]
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    #[must_use]
    pub fn with(mut self, field: impl Into<String>, label: impl Into<String>) -> Self {
        self.0.insert(field.into(), label.into());
        self
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Alias for `field`, or the field name itself when none is set
    #[must_use]
    pub fn label_for<'a>(&'a self, field: &'a str) -> &'a str {
        self.get(field).unwrap_or(field)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for HeaderAliases {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_row_keeps_insertion_order() {
        let row = Row::new().with("b", 2).with("a", 1).with("c", "x");
        let keys: Vec<&str> = row.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_project_follows_schema() {
        let schema = FieldSchema::new(["id", "name", "age"]).unwrap();
        let row = Row::new().with("name", "Ann").with("id", 1).with("extra", "x");

        let projected: Vec<Option<&Value>> = row.project(&schema).collect();
        assert_eq!(
            projected,
            vec![Some(&Value::Int(1)), Some(&Value::from("Ann")), None]
        );
    }

    #[test]
    fn test_schema_rejects_duplicates_and_empty() {
        assert!(matches!(
            FieldSchema::new(["id", "id"]),
            Err(Error::InvalidSchema(_))
        ));
        assert!(matches!(
            FieldSchema::new(Vec::<String>::new()),
            Err(Error::InvalidSchema(_))
        ));
    }

    #[test]
    fn test_header_uses_aliases_with_fallback() {
        let schema = FieldSchema::new(["id", "name"]).unwrap();
        let aliases = HeaderAliases::new()
            .with("name", "Full Name")
            .with("unknown", "Ignored");

        assert_eq!(schema.header(None), vec!["id", "name"]);
        assert_eq!(schema.header(Some(&aliases)), vec!["id", "Full Name"]);
    }

    #[test]
    fn test_value_render() {
        assert_eq!(Value::from(42).render(), "42");
        assert_eq!(Value::from(1.5).render(), "1.5");
        assert_eq!(Value::from("a,b").render(), "a,b");
        assert_eq!(Value::Null.render(), "");
        assert_eq!(Value::from(None::<i64>), Value::Null);
    }

    #[test]
    fn test_row_from_json() {
        let row = Row::from_json(&json!({"id": 1, "name": "Ann", "ok": true, "x": null})).unwrap();
        assert_eq!(row.get("id"), Some(&Value::Int(1)));
        assert_eq!(row.get("ok"), Some(&Value::from("true")));
        assert_eq!(row.get("x"), Some(&Value::Null));
    }

    #[test]
    fn test_row_from_json_keeps_key_order() {
        let value: serde_json::Value =
            serde_json::from_str(r#"{"name": "Ann", "id": 1, "age": 30}"#).unwrap();
        let row = Row::from_json(&value).unwrap();
        let fields: Vec<&str> = row.iter().map(|(field, _)| field).collect();
        assert_eq!(fields, ["name", "id", "age"]);
    }

    #[test]
    fn test_row_from_json_rejects_nested() {
        let err = Row::from_json(&json!({"tags": ["a", "b"]})).unwrap_err();
        assert!(matches!(err, Error::InvalidRow(_)));

        let err = Row::from_json(&json!([1, 2])).unwrap_err();
        assert!(matches!(err, Error::InvalidRow(_)));
    }
}
