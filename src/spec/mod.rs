//! Specifier trees.
//!
//! A specifier describes the shape and behaviour of one setting. There are
//! three kinds:
//! - **Leaf** - a single value, optionally fixed up, validated and type-mapped
//! - **Namespace** - named sub-fields, with optional shorthand, seed and mapper
//! - **Record** - dynamically keyed entries that all follow one entry schema
//!
//! Specifier trees are immutable once built. Callbacks are shared behind
//! `Arc`, so cloning a tree is cheap and never duplicates user state.
//!
//! ```
//! use serde_json::json;
//! use setset::spec::{Leaf, Namespace, Record};
//!
//! let spec = Namespace::new()
//!     .field("port", Leaf::new().with_default(json!(8080)))
//!     .field(
//!         "server",
//!         Namespace::new()
//!             .with_shorthand(|host| Ok(json!({ "host": host })))
//!             .field("host", Leaf::new().with_default(json!("localhost"))),
//!     )
//!     .field(
//!         "hooks",
//!         Record::new(Namespace::new().field("command", Leaf::new())),
//!     );
//!
//! assert_eq!(spec.fields.len(), 3);
//! ```

mod validate;

pub use validate::{validate_namespace, validate_specifier};

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::traversal::TraversalInfo;

/// Produces a leaf's initial value.
pub type InitialFn = Arc<dyn Fn() -> anyhow::Result<Value> + Send + Sync>;
/// Produces a namespace seed or a record's starter entries. Must return an object.
pub type SeedFn = Arc<dyn Fn() -> anyhow::Result<Value> + Send + Sync>;
/// Checks a leaf value, returning a violation when it is unacceptable.
pub type ValidateFn = Arc<dyn Fn(&Value) -> anyhow::Result<Option<Violation>> + Send + Sync>;
/// Repairs a leaf value, returning `None` when nothing needed fixing.
pub type FixupFn = Arc<dyn Fn(&Value) -> anyhow::Result<Option<Fixup>> + Send + Sync>;
/// Coerces a resolved leaf value into its data representation.
pub type MapTypeFn = Arc<dyn Fn(Value) -> anyhow::Result<Value> + Send + Sync>;
/// Expands a non-object namespace input into its longhand object.
pub type ShorthandFn = Arc<dyn Fn(Value) -> anyhow::Result<Value> + Send + Sync>;
/// Derives extra data fields from a namespace's resolved data. Must return an object.
pub type MapFn = Arc<dyn Fn(&Value, &TraversalInfo) -> anyhow::Result<Value> + Send + Sync>;

/// A validation failure with human-readable reasons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub reasons: Vec<String>,
}

impl Violation {
    pub fn new<I, S>(reasons: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            reasons: reasons.into_iter().map(Into::into).collect(),
        }
    }
}

/// A repaired value, plus messages explaining what was wrong.
#[derive(Debug, Clone, PartialEq)]
pub struct Fixup {
    pub value: Value,
    pub messages: Vec<String>,
}

impl Fixup {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            messages: Vec::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.messages.push(message.into());
        self
    }
}

/// A node in the specifier tree.
#[derive(Clone)]
pub enum Specifier {
    Leaf(Leaf),
    Namespace(Namespace),
    Record(Record),
}

impl Specifier {
    pub fn as_namespace(&self) -> Option<&Namespace> {
        match self {
            Specifier::Namespace(namespace) => Some(namespace),
            _ => None,
        }
    }

    /// Kind name used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Specifier::Leaf(_) => "leaf",
            Specifier::Namespace(_) => "namespace",
            Specifier::Record(_) => "record",
        }
    }

    pub(crate) fn is_shadow(&self) -> bool {
        matches!(self, Specifier::Leaf(leaf) if leaf.shadow)
    }
}

impl fmt::Debug for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Specifier::Leaf(leaf) => fmt::Debug::fmt(leaf, f),
            Specifier::Namespace(namespace) => fmt::Debug::fmt(namespace, f),
            Specifier::Record(record) => fmt::Debug::fmt(record, f),
        }
    }
}

impl From<Leaf> for Specifier {
    fn from(leaf: Leaf) -> Self {
        Specifier::Leaf(leaf)
    }
}

impl From<Namespace> for Specifier {
    fn from(namespace: Namespace) -> Self {
        Specifier::Namespace(namespace)
    }
}

impl From<Record> for Specifier {
    fn from(record: Record) -> Self {
        Specifier::Record(record)
    }
}

/// A single-valued setting.
#[derive(Clone, Default)]
pub struct Leaf {
    pub initial: Option<InitialFn>,
    pub validate: Option<ValidateFn>,
    pub fixup: Option<FixupFn>,
    pub map_type: Option<MapTypeFn>,
    /// Synthetic field that exists for the data shape only (e.g. produced by
    /// a mapper). Skipped when building canonical record entries.
    pub shadow: bool,
}

impl Leaf {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial<F>(mut self, initial: F) -> Self
    where
        F: Fn() -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.initial = Some(Arc::new(initial));
        self
    }

    /// Initialize to a constant.
    pub fn with_default(self, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.with_initial(move || Ok(value.clone()))
    }

    pub fn with_validate<F>(mut self, validate: F) -> Self
    where
        F: Fn(&Value) -> anyhow::Result<Option<Violation>> + Send + Sync + 'static,
    {
        self.validate = Some(Arc::new(validate));
        self
    }

    pub fn with_fixup<F>(mut self, fixup: F) -> Self
    where
        F: Fn(&Value) -> anyhow::Result<Option<Fixup>> + Send + Sync + 'static,
    {
        self.fixup = Some(Arc::new(fixup));
        self
    }

    pub fn with_map_type<F>(mut self, map_type: F) -> Self
    where
        F: Fn(Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.map_type = Some(Arc::new(map_type));
        self
    }

    pub fn shadow(mut self) -> Self {
        self.shadow = true;
        self
    }
}

impl fmt::Debug for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Leaf")
            .field("initial", &self.initial.is_some())
            .field("validate", &self.validate.is_some())
            .field("fixup", &self.fixup.is_some())
            .field("map_type", &self.map_type.is_some())
            .field("shadow", &self.shadow)
            .finish()
    }
}

/// A group of named settings.
#[derive(Clone, Default)]
pub struct Namespace {
    pub fields: BTreeMap<String, Specifier>,
    pub shorthand: Option<ShorthandFn>,
    /// Seed for the namespace's own data, applied before field initializers.
    pub initial: Option<SeedFn>,
    pub map: Option<MapFn>,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, specifier: impl Into<Specifier>) -> Self {
        self.fields.insert(name.into(), specifier.into());
        self
    }

    pub fn with_shorthand<F>(mut self, shorthand: F) -> Self
    where
        F: Fn(Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.shorthand = Some(Arc::new(shorthand));
        self
    }

    pub fn with_initial<F>(mut self, initial: F) -> Self
    where
        F: Fn() -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.initial = Some(Arc::new(initial));
        self
    }

    pub fn with_map<F>(mut self, map: F) -> Self
    where
        F: Fn(&Value, &TraversalInfo) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.map = Some(Arc::new(map));
        self
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Namespace")
            .field("fields", &self.fields)
            .field("shorthand", &self.shorthand.is_some())
            .field("initial", &self.initial.is_some())
            .field("map", &self.map.is_some())
            .finish()
    }
}

/// Dynamically keyed settings sharing one entry schema.
#[derive(Clone)]
pub struct Record {
    /// Schema of every entry. Must be a namespace.
    pub entry: Box<Specifier>,
    /// Starter entries, keyed by entry name, each a partial entry input.
    pub initial: Option<SeedFn>,
}

impl Record {
    pub fn new(entry: impl Into<Specifier>) -> Self {
        Self {
            entry: Box::new(entry.into()),
            initial: None,
        }
    }

    pub fn with_initial<F>(mut self, initial: F) -> Self
    where
        F: Fn() -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.initial = Some(Arc::new(initial));
        self
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("entry", &self.entry)
            .field("initial", &self.initial.is_some())
            .finish()
    }
}
