//! Confit: schema-driven configuration persistence.
//!
//! Given an explicit schema (shape, defaults, dynamic sections) paired with
//! a serde-deserializable struct, the engine produces, merges, validates,
//! repairs, and rewrites a human-editable TOML file on disk: user edits are
//! kept, new defaults are layered in, deprecated keys are dropped, and
//! corrupt or type-invalid files are backed up and reset to defaults.
//!
//! ```no_run
//! use confit::{ConfigFile, ConfigSchema, Field, Schema};
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize)]
//! struct Settings {
//!     enabled: bool,
//!     greeting: String,
//! }
//!
//! impl ConfigSchema for Settings {
//!     fn schema() -> Schema {
//!         Schema::new(vec![
//!             Field::bool("enabled", false),
//!             Field::string("greeting", "hello"),
//!         ])
//!     }
//! }
//!
//! let settings: Settings = ConfigFile::new("config", "settings.toml")
//!     .load()
//!     .expect("load configuration");
//! ```

pub mod backup;
pub mod defaults;
pub mod error;
pub mod instantiate;
pub mod loader;
pub mod schema;
pub mod tree;
pub mod writer;

pub use error::{ConfigError, InstantiateError, SchemaError};
pub use loader::ConfigFile;
pub use schema::{Blueprint, ConfigSchema, Field, Kind, Schema};
pub use tree::Resolved;
pub use toml::Value;
