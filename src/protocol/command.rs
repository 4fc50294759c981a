//! Command building
//!
//! A command is a verb plus an ordered list of argument groups. Flat scalar
//! arguments are joined by the cell separator; when parameters carry
//! sequences, the sequences are transposed into list-separated row groups so
//! a bulk operation (kicking several clients at once) fits in one line:
//!
//! ```text
//! clientkick reasonid=5 clid=1|reasonid=5 clid=2
//! ```

use crate::protocol::escape::escape;
use crate::protocol::{SEPARATOR_CELL, SEPARATOR_LIST};

/// A scalar parameter value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    Int(i64),
    Bool(bool),
    Text(String),
}

impl Scalar {
    /// Wire form before escaping: booleans become `0`/`1`
    fn encode(&self) -> String {
        match self {
            Scalar::Int(n) => n.to_string(),
            Scalar::Bool(true) => "1".to_string(),
            Scalar::Bool(false) => "0".to_string(),
            Scalar::Text(s) => s.clone(),
        }
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Int(value as i64)
    }
}

impl From<u16> for Scalar {
    fn from(value: u16) -> Self {
        Scalar::Int(value as i64)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

/// A ServerQuery command under construction
///
/// Arguments keep their insertion order. Absent values (`None`) are omitted
/// from the rendered command entirely rather than encoded as empty.
#[derive(Debug, Clone, Default)]
pub struct Command {
    verb: String,
    flat: Vec<(Option<String>, Option<Scalar>)>,
    groups: Vec<(Option<String>, Vec<Option<Scalar>>)>,
}

impl Command {
    pub fn new(verb: impl Into<String>) -> Self {
        Self {
            verb: verb.into(),
            flat: Vec::new(),
            groups: Vec::new(),
        }
    }

    /// Add a named scalar argument
    pub fn arg(mut self, name: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.flat.push((Some(name.into()), Some(value.into())));
        self
    }

    /// Add a named scalar argument that may be absent
    pub fn arg_opt(
        mut self,
        name: impl Into<String>,
        value: Option<impl Into<Scalar>>,
    ) -> Self {
        self.flat.push((Some(name.into()), value.map(Into::into)));
        self
    }

    /// Add a positional (unnamed) argument, e.g. an option switch
    pub fn positional(mut self, value: impl Into<Scalar>) -> Self {
        self.flat.push((None, Some(value.into())));
        self
    }

    /// Add a named sequence argument; one row group is rendered per element
    pub fn list<I, V>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Scalar>,
    {
        let values = values.into_iter().map(|v| Some(v.into())).collect();
        self.groups.push((Some(name.into()), values));
        self
    }

    /// Add a named sequence argument with possibly-absent elements
    ///
    /// An absent element leaves its field out of that row group while the
    /// other sequence parameters still fill it.
    pub fn list_opt<I, V>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<V>>,
        V: Into<Scalar>,
    {
        let values = values.into_iter().map(|v| v.map(Into::into)).collect();
        self.groups.push((Some(name.into()), values));
        self
    }

    pub fn verb(&self) -> &str {
        &self.verb
    }

    /// Render the command into its wire format
    ///
    /// Flat arguments come first, then the transposed sequence row groups.
    /// Parameter names are lowercased; values are escaped.
    pub fn render(&self) -> String {
        let mut args: Vec<String> = Vec::new();

        for (name, value) in &self.flat {
            if let Some(scalar) = value {
                args.push(render_cell(name.as_deref(), scalar));
            }
        }

        let row_count = self
            .groups
            .iter()
            .map(|(_, values)| values.len())
            .max()
            .unwrap_or(0);
        let mut rows: Vec<Vec<String>> = vec![Vec::new(); row_count];

        for (name, values) in &self.groups {
            for (i, value) in values.iter().enumerate() {
                if let Some(scalar) = value {
                    rows[i].push(render_cell(name.as_deref(), scalar));
                }
            }
        }

        let cell = SEPARATOR_CELL.to_string();
        let mut cmd = self.verb.clone();

        if !args.is_empty() {
            cmd.push(SEPARATOR_CELL);
            cmd.push_str(&args.join(&cell));
        }

        if !rows.is_empty() {
            let groups: Vec<String> = rows.iter().map(|row| row.join(&cell)).collect();
            cmd.push(SEPARATOR_CELL);
            cmd.push_str(&groups.join(&SEPARATOR_LIST.to_string()));
        }

        cmd.trim().to_string()
    }
}

fn render_cell(name: Option<&str>, scalar: &Scalar) -> String {
    match name {
        Some(name) => format!(
            "{}{}{}",
            name.to_lowercase(),
            crate::protocol::SEPARATOR_PAIR,
            escape(&scalar.encode())
        ),
        None => escape(&scalar.encode()),
    }
}
