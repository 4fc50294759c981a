//! Typed reply rows
//!
//! A decoded row is an insertion-ordered mapping from field name to value.
//! Lookups by unknown key fail explicitly instead of silently returning a
//! default.

use crate::error::{QueryError, Result};
use crate::protocol::escape::{is_integer, unescape};
use crate::protocol::SEPARATOR_PAIR;

/// A single decoded cell value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Integral numeric value
    Int(i64),

    /// Text value (unescaped or raw depending on the decode mode)
    Text(String),

    /// Flag cell that carried no pair separator (e.g. `-virtual`)
    Null,
}

impl Value {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Text(s) => s.parse().ok(),
            Value::Null => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "{}", s),
            Value::Null => Ok(()),
        }
    }
}

/// One reply row: field name -> value, in wire order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    entries: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field, replacing an existing field of the same name
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Look up a field, failing with the protocol's "invalid parameter"
    /// error when the key is unknown
    pub fn require(&self, key: &str) -> Result<&Value> {
        self.get(key).ok_or_else(|| {
            QueryError::server(QueryError::ID_INVALID_PARAMETER, "invalid parameter")
        })
    }

    /// Typed accessor: the field rendered as text
    ///
    /// Integer fields render through their decimal form; a flag field
    /// (null value) or unknown key is an error.
    pub fn get_str(&self, key: &str) -> Result<String> {
        match self.require(key)? {
            Value::Null => Err(QueryError::server(
                QueryError::ID_INVALID_PARAMETER,
                format!("parameter '{}' has no value", key),
            )),
            value => Ok(value.to_string()),
        }
    }

    /// Typed accessor: the field as an integer
    pub fn get_int(&self, key: &str) -> Result<i64> {
        let value = self.require(key)?;
        value.as_int().ok_or_else(|| {
            QueryError::server(
                QueryError::ID_INVALID_PARAMETER,
                format!("parameter '{}' is not an integer", key),
            )
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

/// Decode one row from its cell strings
///
/// Each cell splits on the first pair separator into key and value. Values
/// that look integral are coerced to `Value::Int`; other values are
/// unescaped when `unescape_values` is set, otherwise left in their escaped
/// wire form. Cells without a pair separator become flag fields with a
/// null value.
pub fn decode_row<'a, I>(cells: I, unescape_values: bool) -> Row
where
    I: IntoIterator<Item = &'a str>,
{
    let mut row = Row::new();

    for cell in cells {
        if cell.is_empty() {
            continue;
        }

        match cell.split_once(SEPARATOR_PAIR) {
            None => row.insert(unescape(cell), Value::Null),
            Some((key, value)) => {
                let decoded = if is_integer(value) {
                    Value::Int(value.parse().unwrap_or_default())
                } else if unescape_values {
                    Value::Text(unescape(value))
                } else {
                    Value::Text(value.to_string())
                };

                row.insert(unescape(key), decoded);
            }
        }
    }

    row
}
