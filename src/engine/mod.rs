//! The tree interpreter.
//!
//! Three mutually recursive passes walk a specifier tree in lock-step with
//! data and metadata:
//! - [`initialize`] builds first-cut data and metadata from declared defaults
//! - [`normalize`] resolves a partial input into a candidate data tree
//! - [`commit`] merges a candidate into live data and metadata

mod commit;
mod fixup;
mod initialize;
mod normalize;
mod runners;

pub use commit::{commit, commit_namespace};
pub use fixup::{FixupInfo, log_fixup};
pub use initialize::{Initialized, initialize, initialize_namespace};
pub use normalize::{normalize, normalize_namespace};

use serde_json::{Map, Value};

use crate::metadata::{Metadata, MetadataLeaf, MetadataNamespace, MetadataRecord, Provenance};

/// The object stored under `key`, replacing anything that is not an object.
pub(crate) fn object_slot<'a>(
    parent: &'a mut Map<String, Value>,
    key: &str,
) -> &'a mut Map<String, Value> {
    let slot = parent
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    match slot {
        Value::Object(map) => map,
        _ => unreachable!("slot is an object"),
    }
}

pub(crate) fn namespace_slot(metadata: &mut Metadata) -> &mut MetadataNamespace {
    if !matches!(metadata, Metadata::Namespace(_)) {
        *metadata = MetadataNamespace::new().into();
    }
    match metadata {
        Metadata::Namespace(namespace) => namespace,
        _ => unreachable!("slot is a namespace"),
    }
}

pub(crate) fn record_slot(metadata: &mut Metadata) -> &mut MetadataRecord {
    if !matches!(metadata, Metadata::Record(_)) {
        *metadata = MetadataRecord::new(Default::default()).into();
    }
    match metadata {
        Metadata::Record(record) => record,
        _ => unreachable!("slot is a record"),
    }
}

pub(crate) fn leaf_slot(metadata: &mut Metadata, from: Provenance) -> &mut MetadataLeaf {
    if !matches!(metadata, Metadata::Leaf(_)) {
        *metadata = MetadataLeaf::new(None, from).into();
    }
    match metadata {
        Metadata::Leaf(leaf) => leaf,
        _ => unreachable!("slot is a leaf"),
    }
}
