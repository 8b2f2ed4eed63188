//! Merge engine: on-disk values win, defaults fill gaps, unknown keys drop.

use crate::schema::Blueprint;
use crate::tree::{self, Resolved};
use std::collections::BTreeSet;
use toml::map::Map;
use toml::{Table, Value};
use tracing::debug;

/// Right-biased structural merge of a parsed on-disk table over the
/// blueprint's default tree.
///
/// Keys present on disk but absent from the blueprint are deprecated
/// settings and are dropped silently (logged at debug). Dynamic sections
/// keep every on-disk key and gain any seeded defaults not already present.
pub fn merge(on_disk: Table, blueprint: &Blueprint) -> Resolved {
    let mut out = Map::new();
    merge_tables(&on_disk, &blueprint.tree, "", &blueprint.dynamic, &mut out);
    Resolved::new(out)
}

fn merge_tables(
    disk: &Table,
    defaults: &Table,
    prefix: &str,
    dynamic: &BTreeSet<String>,
    out: &mut Table,
) {
    for (key, default) in defaults {
        let path = tree::join(prefix, key);
        if dynamic.contains(&path) {
            out.insert(key.clone(), merge_dynamic(disk.get(key), default));
            continue;
        }
        let merged = match (disk.get(key), default) {
            (Some(Value::Table(user)), Value::Table(children)) => {
                let mut child = Map::new();
                merge_tables(user, children, &path, dynamic, &mut child);
                Value::Table(child)
            }
            // Wrong-shaped user values are carried through untouched; the
            // instantiator flags them and triggers recovery.
            (Some(user), _) => user.clone(),
            (None, _) => default.clone(),
        };
        out.insert(key.clone(), merged);
    }

    for key in disk.keys() {
        if !defaults.contains_key(key) {
            debug!(
                path = %tree::join(prefix, key),
                "Dropping key not present in schema"
            );
        }
    }
}

fn merge_dynamic(user: Option<&Value>, seeds: &Value) -> Value {
    let seeds = match seeds.as_table() {
        Some(table) => table,
        None => return seeds.clone(),
    };
    match user {
        Some(Value::Table(user)) => {
            let mut out = Map::new();
            for (key, value) in user {
                let merged = match (value, seeds.get(key)) {
                    (Value::Table(user_sub), Some(Value::Table(seed_sub))) => {
                        Value::Table(fill_from_seed(user_sub, seed_sub))
                    }
                    _ => value.clone(),
                };
                out.insert(key.clone(), merged);
            }
            for (key, seed) in seeds {
                if !out.contains_key(key) {
                    out.insert(key.clone(), seed.clone());
                }
            }
            Value::Table(out)
        }
        Some(other) => other.clone(),
        None => Value::Table(seeds.clone()),
    }
}

/// Inside a dynamic section nothing is deprecated: user keys are all kept,
/// and seed keys the user left out are filled in, recursively.
fn fill_from_seed(user: &Table, seed: &Table) -> Table {
    let mut out = Map::new();
    for (key, value) in user {
        let merged = match (value, seed.get(key)) {
            (Value::Table(user_sub), Some(Value::Table(seed_sub))) => {
                Value::Table(fill_from_seed(user_sub, seed_sub))
            }
            _ => value.clone(),
        };
        out.insert(key.clone(), merged);
    }
    for (key, value) in seed {
        if !out.contains_key(key) {
            out.insert(key.clone(), value.clone());
        }
    }
    out
}
