//! Resolved tree: dotted-path queries over a merged configuration table.

use toml::{Table, Value};

pub mod merge;

/// The outcome of merging on-disk content over a blueprint. Addressable by
/// dot-separated path; this is the query surface downstream layers consume.
#[derive(Debug, Clone, Default)]
pub struct Resolved {
    root: Table,
}

impl Resolved {
    pub fn new(root: Table) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Table {
        &self.root
    }

    pub fn has(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        get_in(&self.root, path)
    }

    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.get(path)?.as_bool()
    }

    pub fn get_i64(&self, path: &str) -> Option<i64> {
        self.get(path)?.as_integer()
    }

    /// Read a float, widening a stored integer.
    pub fn get_f64(&self, path: &str) -> Option<f64> {
        match self.get(path)? {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path)?.as_str()
    }

    pub fn get_array(&self, path: &str) -> Option<&Vec<Value>> {
        self.get(path)?.as_array()
    }

    pub fn get_table(&self, path: &str) -> Option<&Table> {
        self.get(path)?.as_table()
    }
}

/// Descend a table by dot-separated segments.
pub fn get_in<'a>(table: &'a Table, path: &str) -> Option<&'a Value> {
    let mut current = table;
    let mut segments = path.split('.').peekable();
    while let Some(segment) = segments.next() {
        let value = current.get(segment)?;
        if segments.peek().is_none() {
            return Some(value);
        }
        current = value.as_table()?;
    }
    None
}

/// Join a prefix and a key into a dotted path.
pub fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}
