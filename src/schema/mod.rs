//! Schema model: an explicit, typed description of a configuration's shape.
//!
//! A [`Schema`] is a flat list of [`Field`]s in declared order; each field
//! carries a [`Kind`] (the tagged set of supported value shapes) and a
//! default value. Nesting comes from `Kind::Struct` and from dots in a
//! field's declared path, which always act as nesting separators.

use toml::Value;

pub mod blueprint;

pub use blueprint::Blueprint;

/// Types that can be loaded by the engine: a serde-deserializable struct
/// paired with the schema describing its on-disk shape and defaults.
pub trait ConfigSchema: serde::de::DeserializeOwned {
    fn schema() -> Schema;
}

/// Ordered description of a configuration section.
#[derive(Debug, Clone)]
pub struct Schema {
    pub fields: Vec<Field>,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }
}

/// The supported field shapes.
#[derive(Debug, Clone)]
pub enum Kind {
    Bool,
    /// 32-bit integer; stored as a TOML integer, range-checked on load.
    Int,
    /// 64-bit integer.
    Long,
    Float,
    Str,
    /// Enumeration serialized as one of its symbolic names.
    /// Matching is case-insensitive; the canonical spelling wins.
    Enum { names: &'static [&'static str] },
    /// Nested structured section with fixed, named fields.
    Struct(Schema),
    /// Ordered sequence of elements of one kind.
    List(Box<Kind>),
    /// Like `List`, but order-insensitive with duplicates removed.
    Set(Box<Kind>),
    /// Open-ended string-keyed mapping ("dynamic section"): keys are not
    /// fixed by the schema and survive rewrites verbatim.
    Map(Box<Kind>),
}

impl Kind {
    /// Human-readable name for diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            Kind::Bool => "boolean",
            Kind::Int => "32-bit integer",
            Kind::Long => "integer",
            Kind::Float => "floating-point number",
            Kind::Str => "string",
            Kind::Enum { .. } => "enumerated name",
            Kind::Struct(_) => "section",
            Kind::List(_) => "list",
            Kind::Set(_) => "list",
            Kind::Map(_) => "key/value section",
        }
    }
}

/// A single schema field: serde-visible name, optional explicit on-disk
/// path (dots nest), declared kind, and default value.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: &'static str,
    pub path: Option<&'static str>,
    pub kind: Kind,
    pub default: Value,
}

impl Field {
    pub fn new(name: &'static str, kind: Kind, default: impl Into<Value>) -> Self {
        Self {
            name,
            path: None,
            kind,
            default: default.into(),
        }
    }

    /// Override the on-disk path. Dots always act as nesting separators;
    /// a literal dot inside a single key name is not supported.
    pub fn at(mut self, path: &'static str) -> Self {
        self.path = Some(path);
        self
    }

    pub fn bool(name: &'static str, default: bool) -> Self {
        Self::new(name, Kind::Bool, default)
    }

    pub fn int(name: &'static str, default: i32) -> Self {
        Self::new(name, Kind::Int, default)
    }

    pub fn long(name: &'static str, default: i64) -> Self {
        Self::new(name, Kind::Long, default)
    }

    pub fn float(name: &'static str, default: f64) -> Self {
        Self::new(name, Kind::Float, default)
    }

    pub fn string(name: &'static str, default: &str) -> Self {
        Self::new(name, Kind::Str, default)
    }

    pub fn enumeration(
        name: &'static str,
        names: &'static [&'static str],
        default: &'static str,
    ) -> Self {
        Self::new(name, Kind::Enum { names }, default)
    }

    /// Nested structured section. Defaults live on the inner fields.
    pub fn structure(name: &'static str, inner: Schema) -> Self {
        Self {
            name,
            path: None,
            kind: Kind::Struct(inner),
            default: Value::Table(toml::map::Map::new()),
        }
    }

    pub fn list(name: &'static str, element: Kind, default: impl Into<Value>) -> Self {
        Self::new(name, Kind::List(Box::new(element)), default)
    }

    pub fn set(name: &'static str, element: Kind, default: impl Into<Value>) -> Self {
        Self::new(name, Kind::Set(Box::new(element)), default)
    }

    /// Dynamic section: a string-keyed mapping seeded with `seeds` as
    /// defaults. Keys added by the user are preserved across rewrites.
    pub fn map(name: &'static str, value_kind: Kind, seeds: Vec<(&str, Value)>) -> Self {
        let mut table = toml::map::Map::new();
        for (key, value) in seeds {
            table.insert(key.to_string(), value);
        }
        Self {
            name,
            path: None,
            kind: Kind::Map(Box::new(value_kind)),
            default: Value::Table(table),
        }
    }
}
