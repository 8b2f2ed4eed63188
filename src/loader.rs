//! Load pipeline: blueprint, parse, merge, instantiate, recover, rewrite.

use crate::backup;
use crate::error::ConfigError;
use crate::instantiate::instantiate;
use crate::schema::{Blueprint, ConfigSchema};
use crate::tree::merge::merge;
use crate::tree::Resolved;
use crate::writer;
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use toml::Table;
use tracing::{error, warn};

/// Handle to one configuration file with a typed schema.
///
/// Each [`load`](ConfigFile::load) call runs the full pipeline: build the
/// default tree, merge the stored file over it, instantiate the typed
/// value, and rewrite the file in schema order. Corrupt or type-invalid
/// files are backed up and reset to defaults transparently; callers see a
/// successful load with defaulted values.
pub struct ConfigFile<T: ConfigSchema> {
    dir: PathBuf,
    file_name: String,
    write_if_absent: bool,
    _schema: PhantomData<T>,
}

impl<T: ConfigSchema> ConfigFile<T> {
    pub fn new(dir: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            file_name: file_name.into(),
            write_if_absent: false,
            _schema: PhantomData,
        }
    }

    /// Leave an existing file untouched on rewrite; only a missing file is
    /// written. Recovery resets still apply.
    pub fn write_if_absent(mut self) -> Self {
        self.write_if_absent = true;
        self
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }

    pub fn load(&self) -> Result<T, ConfigError> {
        Ok(self.load_with_tree()?.0)
    }

    /// Like [`load`](ConfigFile::load), also returning the resolved tree
    /// for collaborators that query raw values by dotted path.
    pub fn load_with_tree(&self) -> Result<(T, Resolved), ConfigError> {
        let schema = T::schema();
        let blueprint = Blueprint::build(&schema)?;

        fs::create_dir_all(&self.dir)?;
        let path = self.path();
        let existed = path.exists();
        let raw = if existed {
            fs::read_to_string(&path)?
        } else {
            String::new()
        };

        let mut defaults_only = !existed;
        let on_disk: Table = if existed {
            match toml::from_str(&raw) {
                Ok(table) => table,
                Err(parse_err) => {
                    self.reset_to_defaults(&path, &raw, &blueprint, &parse_err.to_string())?;
                    defaults_only = true;
                    Table::new()
                }
            }
        } else {
            Table::new()
        };

        let resolved = merge(on_disk, &blueprint);
        match instantiate::<T>(&schema, &resolved) {
            Ok(value) => {
                if !(self.write_if_absent && existed) {
                    writer::write(&path, &blueprint, &resolved)?;
                }
                Ok((value, resolved))
            }
            Err(instantiate_err) if !defaults_only => {
                self.reset_to_defaults(&path, &raw, &blueprint, &instantiate_err.to_string())?;
                let resolved = merge(Table::new(), &blueprint);
                match instantiate::<T>(&schema, &resolved) {
                    Ok(value) => Ok((value, resolved)),
                    Err(fatal) => Err(self.fatal(&path, fatal)),
                }
            }
            // Instantiating pure defaults failed: the schema and the target
            // type disagree. Nothing left to recover with.
            Err(fatal) => Err(self.fatal(&path, fatal)),
        }
    }

    /// Back up the offending contents and overwrite the file with the
    /// rendered blueprint defaults. At most one reset happens per load.
    fn reset_to_defaults(
        &self,
        path: &Path,
        raw: &str,
        blueprint: &Blueprint,
        reason: &str,
    ) -> Result<(), ConfigError> {
        warn!(
            file = %path.display(),
            reason,
            "Stored configuration could not be loaded; resetting to defaults"
        );
        if let Some(backup_path) = backup::backup(path, raw)? {
            warn!(
                file = %path.display(),
                backup = %backup_path.display(),
                "Previous contents backed up"
            );
        }
        writer::write_defaults(path, blueprint)
    }

    fn fatal(&self, path: &Path, err: crate::error::InstantiateError) -> ConfigError {
        error!(
            file = %path.display(),
            error = %err,
            "Pure defaults failed to instantiate; schema and target type disagree"
        );
        ConfigError::Unrecoverable(err)
    }
}
