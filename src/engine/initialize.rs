//! Building data and metadata from declared defaults.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::trace;

use super::runners::{run_initializer, run_mapper, run_seed, run_shorthand, run_type_mapper};
use crate::error::{Result, SettingsError};
use crate::metadata::{
    Metadata, MetadataLeaf, MetadataNamespace, MetadataRecord, Provenance,
    metadata_namespace_from_data,
};
use crate::spec::{Leaf, Namespace, Record, Specifier};
use crate::traversal::TraversalInfo;

/// Result of initializing one specifier. `data` is `None` for a leaf without
/// an initializer.
#[derive(Debug, Clone, PartialEq)]
pub struct Initialized {
    pub data: Option<Value>,
    pub metadata: Metadata,
}

/// Initialize any specifier from its declared defaults.
pub fn initialize(specifier: &Specifier, info: &TraversalInfo) -> Result<Initialized> {
    initialize_specifier(specifier, info, false)
}

fn initialize_specifier(
    specifier: &Specifier,
    info: &TraversalInfo,
    is_entry: bool,
) -> Result<Initialized> {
    match specifier {
        Specifier::Leaf(leaf) => initialize_leaf(leaf, info),
        Specifier::Namespace(namespace) => {
            let (data, metadata) = initialize_namespace(namespace, info, is_entry)?;
            Ok(Initialized {
                data: Some(Value::Object(data)),
                metadata: metadata.into(),
            })
        }
        Specifier::Record(record) => {
            let (data, metadata) = initialize_record(record, info)?;
            Ok(Initialized {
                data: Some(Value::Object(data)),
                metadata: metadata.into(),
            })
        }
    }
}

fn initialize_leaf(leaf: &Leaf, info: &TraversalInfo) -> Result<Initialized> {
    trace!(path = %info, "initialize leaf");
    let value = run_initializer(leaf.initial.as_ref(), info)?
        .map(|value| run_type_mapper(leaf, value, info))
        .transpose()?;

    let mut metadata = MetadataLeaf::new(value.clone(), Provenance::Initial);
    if leaf.shadow {
        metadata = metadata.shadow();
    }
    Ok(Initialized {
        data: value,
        metadata: metadata.into(),
    })
}

/// Initialize a namespace.
///
/// The namespace's own seed is applied first and every declared field is
/// initialized on top of it. A field that produces a value replaces the
/// seed's subtree for that key in both data and metadata; a field without a
/// value leaves the seed alone. Seed keys outside `fields` survive. The
/// mapper, if any, runs last and assigns its keys onto the result.
pub fn initialize_namespace(
    namespace: &Namespace,
    info: &TraversalInfo,
    is_entry: bool,
) -> Result<(Map<String, Value>, MetadataNamespace)> {
    trace!(path = %info, "initialize namespace");
    let mut data = run_seed(namespace.initial.as_ref(), info)?;
    let mut metadata = metadata_namespace_from_data(namespace, &data);

    for (name, field) in &namespace.fields {
        let initialized = initialize_specifier(field, &info.append(name), false)?;
        match initialized.data {
            Some(value) => {
                data.insert(name.clone(), value);
                metadata.fields.insert(name.clone(), initialized.metadata);
            }
            None => metadata.merge_field(name.clone(), initialized.metadata),
        }
    }

    let mapped = run_mapper(namespace, &data, info, is_entry)?;
    data.extend(mapped);
    Ok((data, metadata))
}

fn initialize_record(
    record: &Record,
    info: &TraversalInfo,
) -> Result<(Map<String, Value>, MetadataRecord)> {
    trace!(path = %info, "initialize record");
    let starters = run_seed(record.initial.as_ref(), info)?;
    stitch_record(record, &starters, info)
}

/// Build record entries from starter inputs, filling every field a starter
/// does not supply from the canonical entry.
fn stitch_record(
    record: &Record,
    starters: &Map<String, Value>,
    info: &TraversalInfo,
) -> Result<(Map<String, Value>, MetadataRecord)> {
    if starters.is_empty() {
        return Ok((Map::new(), MetadataRecord::new(BTreeMap::new())));
    }

    let entry = entry_namespace(record, info)?;
    let canonical = canonical_entry(entry, &info.append("*"))?;

    let mut data = Map::new();
    let mut entries = BTreeMap::new();
    for (key, starter) in starters {
        let entry_info = info.append(key);
        trace!(path = %entry_info, "stitch record entry");
        let (entry_data, entry_metadata) =
            reconcile_namespace(entry, canonical.clone(), starter, &entry_info, true)?;
        data.insert(key.clone(), Value::Object(entry_data));
        entries.insert(key.clone(), entry_metadata.into());
    }

    Ok((data, MetadataRecord::new(entries)))
}

/// What a fully initialized entry looks like, minus shadow fields. The
/// entry's mapper is not run here; it runs once per stitched entry.
fn canonical_entry(
    entry: &Namespace,
    info: &TraversalInfo,
) -> Result<(Map<String, Value>, MetadataNamespace)> {
    let mut data = Map::new();
    let mut metadata = MetadataNamespace::new();
    for (name, field) in &entry.fields {
        if field.is_shadow() {
            continue;
        }
        let initialized = initialize_specifier(field, &info.append(name), false)?;
        if let Some(value) = initialized.data {
            data.insert(name.clone(), value);
        }
        metadata.fields.insert(name.clone(), initialized.metadata);
    }
    Ok((data, metadata))
}

/// Overlay a caller-given starter onto initialized namespace data.
///
/// Given leaf values replace the initialized ones and become the leaf's
/// recorded initial value. Nested namespaces are reconciled recursively and
/// nested records are stitched from the given entries. `null` counts as not
/// given.
fn reconcile_namespace(
    namespace: &Namespace,
    (mut data, mut metadata): (Map<String, Value>, MetadataNamespace),
    given: &Value,
    info: &TraversalInfo,
    is_entry: bool,
) -> Result<(Map<String, Value>, MetadataNamespace)> {
    let given = run_shorthand(namespace, given, info)?;

    for (name, field) in &namespace.fields {
        if field.is_shadow() {
            continue;
        }
        let Some(value) = given.get(name).filter(|value| !value.is_null()) else {
            continue;
        };
        let field_info = info.append(name);

        match field {
            Specifier::Leaf(_) => {
                data.insert(name.clone(), value.clone());
                metadata.fields.insert(
                    name.clone(),
                    MetadataLeaf::new(Some(value.clone()), Provenance::Initial).into(),
                );
            }
            Specifier::Namespace(child) => {
                let child_data = match data.remove(name) {
                    Some(Value::Object(map)) => map,
                    _ => Map::new(),
                };
                let child_metadata = match metadata.fields.remove(name) {
                    Some(Metadata::Namespace(namespace)) => namespace,
                    _ => MetadataNamespace::new(),
                };
                let (child_data, child_metadata) = reconcile_namespace(
                    child,
                    (child_data, child_metadata),
                    value,
                    &field_info,
                    false,
                )?;
                data.insert(name.clone(), Value::Object(child_data));
                metadata.fields.insert(name.clone(), child_metadata.into());
            }
            Specifier::Record(child) => {
                let Value::Object(starters) = value else {
                    return Err(SettingsError::RecordInput {
                        path: field_info.render(),
                        value: value.clone(),
                    });
                };
                let (child_data, child_metadata) = stitch_record(child, starters, &field_info)?;
                data.insert(name.clone(), Value::Object(child_data));
                metadata.fields.insert(name.clone(), child_metadata.into());
            }
        }
    }

    let mapped = run_mapper(namespace, &data, info, is_entry)?;
    data.extend(mapped);
    Ok((data, metadata))
}

/// A record's entry schema, which must be a namespace.
pub(crate) fn entry_namespace<'a>(
    record: &'a Record,
    info: &TraversalInfo,
) -> Result<&'a Namespace> {
    record
        .entry
        .as_namespace()
        .ok_or_else(|| SettingsError::invalid_record_entry(info.render(), record.entry.kind_name()))
}

/// Initialize a fresh record entry.
pub(crate) fn initialize_entry(
    entry: &Namespace,
    info: &TraversalInfo,
) -> Result<(Map<String, Value>, MetadataNamespace)> {
    initialize_namespace(entry, info, true)
}
