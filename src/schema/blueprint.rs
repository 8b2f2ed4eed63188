//! Schema walker: materializes a [`Schema`] into a [`Blueprint`].
//!
//! The blueprint is the ordered default tree plus the set of paths that are
//! dynamic sections. It is rebuilt on every load and never mutated after.

use crate::error::SchemaError;
use crate::schema::{Field, Kind, Schema};
use crate::tree;
use std::collections::BTreeSet;
use toml::map::Map;
use toml::{Table, Value};

/// Ordered default tree and dynamic-section path set for one schema.
#[derive(Debug, Clone)]
pub struct Blueprint {
    /// Nested default values in schema-declared key order.
    pub tree: Table,
    /// Full dotted paths of dynamic sections. Content at these paths is
    /// always snapshotted from the resolved tree on rewrite, never taken
    /// from the defaults.
    pub dynamic: BTreeSet<String>,
}

impl Blueprint {
    /// Walk the schema in declared field order, resolving each field's
    /// path (explicit path wins over the field name) and embedding its
    /// default value.
    pub fn build(schema: &Schema) -> Result<Self, SchemaError> {
        let mut tree = Map::new();
        let mut dynamic = BTreeSet::new();
        walk(schema, "", &mut tree, &mut dynamic)?;
        Ok(Self { tree, dynamic })
    }
}

fn walk(
    schema: &Schema,
    prefix: &str,
    out: &mut Table,
    dynamic: &mut BTreeSet<String>,
) -> Result<(), SchemaError> {
    for field in &schema.fields {
        let relative = field.path.unwrap_or(field.name);
        let full = tree::join(prefix, relative);
        let segments: Vec<&str> = full.split('.').collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(SchemaError::EmptyPathSegment(full));
        }

        match &field.kind {
            Kind::Struct(inner) => {
                // Children insert themselves under the parent path; the
                // intermediate table is created at this field's position.
                reserve_table(out, &segments, &full)?;
                walk(inner, &full, out, dynamic)?;
            }
            Kind::Map(_) => {
                check_default(&field.kind, &field.default, &full)?;
                dynamic.insert(full.clone());
                insert_at(out, &segments, field.default.clone(), &full)?;
            }
            _ => {
                check_default(&field.kind, &field.default, &full)?;
                insert_at(out, &segments, field.default.clone(), &full)?;
            }
        }
    }
    Ok(())
}

fn insert_at(
    root: &mut Table,
    segments: &[&str],
    value: Value,
    full: &str,
) -> Result<(), SchemaError> {
    let parent = descend(root, &segments[..segments.len() - 1], full)?;
    let last = segments[segments.len() - 1];
    if parent.contains_key(last) {
        return Err(SchemaError::ConflictingPath(full.to_string()));
    }
    parent.insert(last.to_string(), value);
    Ok(())
}

fn reserve_table(root: &mut Table, segments: &[&str], full: &str) -> Result<(), SchemaError> {
    let parent = descend(root, &segments[..segments.len() - 1], full)?;
    let last = segments[segments.len() - 1];
    match parent
        .entry(last.to_string())
        .or_insert_with(|| Value::Table(Map::new()))
    {
        Value::Table(_) => Ok(()),
        _ => Err(SchemaError::ConflictingPath(full.to_string())),
    }
}

fn descend<'a>(
    root: &'a mut Table,
    segments: &[&str],
    full: &str,
) -> Result<&'a mut Table, SchemaError> {
    let mut current = root;
    for segment in segments {
        let entry = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Table(Map::new()));
        current = match entry {
            Value::Table(table) => table,
            _ => return Err(SchemaError::ConflictingPath(full.to_string())),
        };
    }
    Ok(current)
}

/// Verify that a declared default has the shape its kind requires.
fn check_default(kind: &Kind, value: &Value, path: &str) -> Result<(), SchemaError> {
    let mismatch = || SchemaError::DefaultKindMismatch {
        path: path.to_string(),
        expected: kind.describe(),
    };

    match kind {
        Kind::Bool => value.as_bool().map(|_| ()).ok_or_else(mismatch),
        Kind::Int => match value.as_integer() {
            Some(i) if i32::try_from(i).is_ok() => Ok(()),
            _ => Err(mismatch()),
        },
        Kind::Long => value.as_integer().map(|_| ()).ok_or_else(mismatch),
        Kind::Float => match value {
            Value::Float(_) | Value::Integer(_) => Ok(()),
            _ => Err(mismatch()),
        },
        Kind::Str => value.as_str().map(|_| ()).ok_or_else(mismatch),
        Kind::Enum { names } => {
            let stored = value.as_str().ok_or_else(mismatch)?;
            if names.iter().any(|name| name.eq_ignore_ascii_case(stored)) {
                Ok(())
            } else {
                Err(SchemaError::UnknownEnumDefault {
                    path: path.to_string(),
                    value: stored.to_string(),
                    allowed: names.to_vec(),
                })
            }
        }
        Kind::List(element) | Kind::Set(element) => {
            let items = value.as_array().ok_or_else(mismatch)?;
            for item in items {
                check_default(element, item, path)?;
            }
            Ok(())
        }
        Kind::Struct(inner) => {
            let table = value.as_table().ok_or_else(mismatch)?;
            for field in &inner.fields {
                let relative = field.path.unwrap_or(field.name);
                if let Some(sub) = tree::get_in(table, relative) {
                    check_default(&field.kind, sub, &tree::join(path, relative))?;
                }
            }
            Ok(())
        }
        Kind::Map(value_kind) => {
            let table = value.as_table().ok_or_else(mismatch)?;
            for (key, sub) in table {
                check_default(value_kind, sub, &tree::join(path, key))?;
            }
            Ok(())
        }
    }
}
