//! Schema-free defaults merge for bundled template files.
//!
//! Downstream layers ship default template files (message catalogs and the
//! like) alongside user-edited copies. [`ensure_defaults`] layers the user
//! file over the bundled text with the same user-wins philosophy as the
//! main engine, simplified to string-keyed trees: with no schema, nothing
//! is deprecated, so unknown user keys are kept.

use crate::backup;
use crate::error::ConfigError;
use std::fs;
use std::path::Path;
use toml::map::Map;
use toml::{Table, Value};
use tracing::error;

/// Merge the user's file at `path` over `default_text` and rewrite it, so
/// keys new to the bundled defaults appear without disturbing user values.
///
/// A user file that fails to parse is backed up and left alone — there is
/// no schema to regenerate it from — and the parse error is returned.
pub fn ensure_defaults(path: &Path, default_text: &str) -> Result<(), ConfigError> {
    let defaults: Table = toml::from_str(default_text)?;

    let user_text = if path.exists() {
        fs::read_to_string(path)?
    } else {
        String::new()
    };
    let user: Table = match toml::from_str(&user_text) {
        Ok(table) => table,
        Err(parse_err) => {
            error!(
                file = %path.display(),
                error = %parse_err,
                "User file could not be parsed while ensuring defaults"
            );
            if let Some(backup_path) = backup::backup(path, &user_text)? {
                error!(
                    file = %path.display(),
                    backup = %backup_path.display(),
                    "Unreadable contents backed up"
                );
            }
            return Err(ConfigError::Parse(parse_err));
        }
    };

    let merged = overlay(&user, &defaults);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, toml::to_string_pretty(&Value::Table(merged))?)?;
    Ok(())
}

/// User values win; default keys the user lacks are filled in, in default
/// order; user-only keys are appended.
fn overlay(user: &Table, defaults: &Table) -> Table {
    let mut out = Map::new();
    for (key, default) in defaults {
        let merged = match (user.get(key), default) {
            (Some(Value::Table(user_sub)), Value::Table(default_sub)) => {
                Value::Table(overlay(user_sub, default_sub))
            }
            (Some(value), _) => value.clone(),
            (None, _) => default.clone(),
        };
        out.insert(key.clone(), merged);
    }
    for (key, value) in user {
        if !out.contains_key(key) {
            out.insert(key.clone(), value.clone());
        }
    }
    out
}
