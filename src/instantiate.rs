//! Instantiator: walks the resolved tree against the schema and builds the
//! caller's typed value.
//!
//! Each field is read at its resolved path and coerced to its declared
//! kind; the normalized result (keyed by serde-visible field names) is then
//! deserialized into the target type. Any coercion failure anywhere aborts
//! the whole instantiation with a single error naming the offending path.

use crate::error::InstantiateError;
use crate::schema::{ConfigSchema, Field, Kind, Schema};
use crate::tree::{self, Resolved};
use toml::map::Map;
use toml::{Table, Value};

pub fn instantiate<T: ConfigSchema>(
    schema: &Schema,
    resolved: &Resolved,
) -> Result<T, InstantiateError> {
    let normalized = instantiate_fields(schema, "", resolved.root())?;
    Value::Table(normalized)
        .try_into()
        .map_err(InstantiateError::Construct)
}

fn instantiate_fields(
    schema: &Schema,
    prefix: &str,
    scope: &Table,
) -> Result<Table, InstantiateError> {
    let mut out = Map::new();
    for field in &schema.fields {
        let relative = field.path.unwrap_or(field.name);
        let path = tree::join(prefix, relative);
        let value = match tree::get_in(scope, relative) {
            Some(stored) => coerce(&field.kind, &path, stored)?,
            // After a merge every static path is populated; this arm fires
            // only inside user-authored dynamic entries and list elements,
            // where missing fields fall back to their declared defaults.
            None => default_output(field, &path)?,
        };
        out.insert(field.name.to_string(), value);
    }
    Ok(out)
}

fn coerce(kind: &Kind, path: &str, value: &Value) -> Result<Value, InstantiateError> {
    let mismatch = || InstantiateError::TypeMismatch {
        path: path.to_string(),
        expected: kind.describe(),
        found: value.type_str(),
    };

    match kind {
        Kind::Bool => match value {
            Value::Boolean(_) => Ok(value.clone()),
            _ => Err(mismatch()),
        },
        Kind::Int => match value {
            Value::Integer(i) if i32::try_from(*i).is_ok() => Ok(value.clone()),
            Value::Integer(i) => Err(InstantiateError::IntOutOfRange {
                path: path.to_string(),
                value: *i,
            }),
            _ => Err(mismatch()),
        },
        Kind::Long => match value {
            Value::Integer(_) => Ok(value.clone()),
            _ => Err(mismatch()),
        },
        Kind::Float => match value {
            Value::Float(_) => Ok(value.clone()),
            // Numeric widening: a stored integer is a legal float.
            Value::Integer(i) => Ok(Value::Float(*i as f64)),
            _ => Err(mismatch()),
        },
        Kind::Str => match value {
            Value::String(_) => Ok(value.clone()),
            _ => Err(mismatch()),
        },
        Kind::Enum { names } => match value {
            Value::String(stored) => names
                .iter()
                .find(|name| name.eq_ignore_ascii_case(stored))
                .map(|name| Value::String((*name).to_string()))
                .ok_or_else(|| InstantiateError::UnknownEnumValue {
                    path: path.to_string(),
                    value: stored.clone(),
                    allowed: names.to_vec(),
                }),
            _ => Err(mismatch()),
        },
        Kind::List(element) => match value {
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    out.push(coerce(element, &format!("{}[{}]", path, index), item)?);
                }
                Ok(Value::Array(out))
            }
            _ => Err(mismatch()),
        },
        Kind::Set(element) => match value {
            Value::Array(items) => {
                let mut out: Vec<Value> = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    let coerced = coerce(element, &format!("{}[{}]", path, index), item)?;
                    if !out.contains(&coerced) {
                        out.push(coerced);
                    }
                }
                Ok(Value::Array(out))
            }
            _ => Err(mismatch()),
        },
        Kind::Struct(inner) => match value {
            Value::Table(table) => Ok(Value::Table(instantiate_fields(inner, path, table)?)),
            _ => Err(mismatch()),
        },
        Kind::Map(value_kind) => match value {
            Value::Table(table) => {
                let mut out = Map::new();
                for (key, entry) in table {
                    let entry_path = tree::join(path, key);
                    out.insert(key.clone(), coerce(value_kind, &entry_path, entry)?);
                }
                Ok(Value::Table(out))
            }
            _ => Err(mismatch()),
        },
    }
}

/// Normalized output for a field the stored tree does not mention.
fn default_output(field: &Field, path: &str) -> Result<Value, InstantiateError> {
    match &field.kind {
        Kind::Struct(inner) => {
            let mut out = Map::new();
            for child in &inner.fields {
                let child_path = tree::join(path, child.path.unwrap_or(child.name));
                out.insert(child.name.to_string(), default_output(child, &child_path)?);
            }
            Ok(Value::Table(out))
        }
        // Defaults still go through coercion so enum spellings are
        // canonicalized and integers widen where a float is declared.
        kind => coerce(kind, path, &field.default),
    }
}
