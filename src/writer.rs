//! Ordered rewriter: serializes the resolved tree back to disk in the
//! blueprint's key order.
//!
//! The output is rebuilt by walking the blueprint, so the file always ends
//! up in the schema's declared order no matter how the user arranged it.
//! Dynamic sections are snapshotted live from the resolved tree — that is
//! what keeps user-added keys in them across rewrites.

use crate::error::ConfigError;
use crate::schema::Blueprint;
use crate::tree::{self, Resolved};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use toml::map::Map;
use toml::{Table, Value};

/// Render the output document as TOML text.
pub fn render(blueprint: &Blueprint, resolved: &Resolved) -> Result<String, toml::ser::Error> {
    let table = rebuild(&blueprint.tree, "", &blueprint.dynamic, resolved);
    toml::to_string_pretty(&Value::Table(table))
}

/// Render and write, replacing previous contents.
pub fn write(path: &Path, blueprint: &Blueprint, resolved: &Resolved) -> Result<(), ConfigError> {
    let text = render(blueprint, resolved)?;
    fs::write(path, text)?;
    Ok(())
}

/// Write the pure-defaults rendering (used when resetting a damaged file).
pub fn write_defaults(path: &Path, blueprint: &Blueprint) -> Result<(), ConfigError> {
    write(path, blueprint, &Resolved::default())
}

fn rebuild(
    defaults: &Table,
    prefix: &str,
    dynamic: &BTreeSet<String>,
    resolved: &Resolved,
) -> Table {
    let mut out = Map::new();
    for (key, default) in defaults {
        let path = tree::join(prefix, key);
        let value = if dynamic.contains(&path) {
            // Live snapshot, never the seed values.
            resolved
                .get(&path)
                .cloned()
                .unwrap_or_else(|| default.clone())
        } else if let Value::Table(children) = default {
            Value::Table(rebuild(children, &path, dynamic, resolved))
        } else {
            resolved
                .get(&path)
                .cloned()
                .unwrap_or_else(|| default.clone())
        };
        out.insert(key.clone(), value);
    }
    out
}
