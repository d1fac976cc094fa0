//! Metadata trees.
//!
//! The metadata tree mirrors the specifier tree and records, per leaf, the
//! current value, the initial value and where the current value came from.
//! Records additionally keep a snapshot of their entries as they were at
//! initialization.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::spec::{Namespace, Specifier};

/// Where a value currently in the data tree came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Initial,
    Change,
}

/// Metadata for one node of the data tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Metadata {
    Leaf(MetadataLeaf),
    Namespace(MetadataNamespace),
    Record(MetadataRecord),
}

/// Metadata for a single value. `None` means the value is absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetadataLeaf {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial: Option<Value>,
    pub from: Provenance,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_shadow: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_passthrough: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetadataNamespace {
    pub fields: BTreeMap<String, Metadata>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetadataRecord {
    pub from: Provenance,
    pub value: BTreeMap<String, Metadata>,
    /// Entries as established at initialization. Never aliased with `value`.
    pub initial: BTreeMap<String, Metadata>,
}

impl MetadataLeaf {
    pub fn new(value: Option<Value>, from: Provenance) -> Self {
        Self {
            initial: value.clone(),
            value,
            from,
            is_shadow: false,
            is_passthrough: false,
        }
    }

    /// Metadata for a key that has no specifier.
    pub fn passthrough(from: Provenance) -> Self {
        Self {
            is_passthrough: true,
            ..Self::new(None, from)
        }
    }

    pub fn shadow(mut self) -> Self {
        self.is_shadow = true;
        self
    }
}

impl MetadataNamespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deep merge `overlay` into `self`. Absent overlay values never erase
    /// present ones.
    pub(crate) fn merge(&mut self, overlay: MetadataNamespace) {
        for (name, metadata) in overlay.fields {
            self.merge_field(name, metadata);
        }
    }

    /// Deep merge `metadata` into the field called `name`.
    pub(crate) fn merge_field(&mut self, name: String, metadata: Metadata) {
        match self.fields.get_mut(&name) {
            Some(existing) => existing.merge(metadata),
            None => {
                self.fields.insert(name, metadata);
            }
        }
    }
}

impl MetadataRecord {
    /// Record metadata whose initial snapshot is a copy of `value`.
    pub fn new(value: BTreeMap<String, Metadata>) -> Self {
        Self {
            from: Provenance::Initial,
            initial: value.clone(),
            value,
        }
    }
}

impl Metadata {
    pub fn as_leaf(&self) -> Option<&MetadataLeaf> {
        match self {
            Metadata::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }

    pub fn as_namespace(&self) -> Option<&MetadataNamespace> {
        match self {
            Metadata::Namespace(namespace) => Some(namespace),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&MetadataRecord> {
        match self {
            Metadata::Record(record) => Some(record),
            _ => None,
        }
    }

    pub(crate) fn as_namespace_mut(&mut self) -> Option<&mut MetadataNamespace> {
        match self {
            Metadata::Namespace(namespace) => Some(namespace),
            _ => None,
        }
    }

    pub(crate) fn as_record_mut(&mut self) -> Option<&mut MetadataRecord> {
        match self {
            Metadata::Record(record) => Some(record),
            _ => None,
        }
    }

    pub(crate) fn merge(&mut self, overlay: Metadata) {
        match (self, overlay) {
            (Metadata::Leaf(base), Metadata::Leaf(overlay)) => {
                if overlay.value.is_some() {
                    base.value = overlay.value;
                }
                if overlay.initial.is_some() {
                    base.initial = overlay.initial;
                }
                base.from = overlay.from;
                base.is_shadow |= overlay.is_shadow;
                base.is_passthrough |= overlay.is_passthrough;
            }
            (Metadata::Namespace(base), Metadata::Namespace(overlay)) => base.merge(overlay),
            (base, overlay) => *base = overlay,
        }
    }
}

impl From<MetadataLeaf> for Metadata {
    fn from(leaf: MetadataLeaf) -> Self {
        Metadata::Leaf(leaf)
    }
}

impl From<MetadataNamespace> for Metadata {
    fn from(namespace: MetadataNamespace) -> Self {
        Metadata::Namespace(namespace)
    }
}

impl From<MetadataRecord> for Metadata {
    fn from(record: MetadataRecord) -> Self {
        Metadata::Record(record)
    }
}

/// Build metadata for already-resolved data. No fixup or validation runs.
pub fn metadata_from_data(specifier: Option<&Specifier>, data: &Value) -> Metadata {
    match (specifier, data) {
        (Some(Specifier::Namespace(namespace)), Value::Object(map)) => {
            metadata_namespace_from_data(namespace, map).into()
        }
        (Some(Specifier::Record(record)), Value::Object(entries)) => {
            let value = entries
                .iter()
                .map(|(name, entry)| (name.clone(), metadata_from_data(Some(&record.entry), entry)))
                .collect();
            MetadataRecord::new(value).into()
        }
        _ => MetadataLeaf::new(Some(data.clone()), Provenance::Initial).into(),
    }
}

/// Build namespace metadata for every key present in `data`.
pub fn metadata_namespace_from_data(
    namespace: &Namespace,
    data: &Map<String, Value>,
) -> MetadataNamespace {
    let fields = data
        .iter()
        .map(|(name, value)| (name.clone(), metadata_from_data(namespace.fields.get(name), value)))
        .collect();
    MetadataNamespace { fields }
}

/// Project the initial values recorded in `metadata` into `target`.
///
/// Leaves contribute their `initial` value (absent initials are skipped),
/// namespaces recurse, records project their initial snapshot.
pub fn data_from_metadata(
    metadata: &MetadataNamespace,
    mut target: Map<String, Value>,
) -> Map<String, Value> {
    for (name, field) in &metadata.fields {
        if let Some(value) = initial_of(field) {
            target.insert(name.clone(), value);
        }
    }
    target
}

fn initial_of(metadata: &Metadata) -> Option<Value> {
    match metadata {
        Metadata::Leaf(leaf) => leaf.initial.clone(),
        Metadata::Namespace(namespace) => {
            Some(Value::Object(data_from_metadata(namespace, Map::new())))
        }
        Metadata::Record(record) => {
            let entries = record
                .initial
                .iter()
                .filter_map(|(name, entry)| initial_of(entry).map(|value| (name.clone(), value)))
                .collect();
            Some(Value::Object(entries))
        }
    }
}
