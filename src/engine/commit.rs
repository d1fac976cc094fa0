//! Merging a normalized candidate into live data and metadata.

use serde_json::{Map, Value};
use tracing::trace;

use super::initialize::entry_namespace;
use super::runners::run_mapper;
use super::{leaf_slot, namespace_slot, object_slot, record_slot};
use crate::error::{Result, SettingsError};
use crate::metadata::{Metadata, MetadataLeaf, MetadataNamespace, MetadataRecord, Provenance};
use crate::spec::{Namespace, Record, Specifier};
use crate::traversal::{ROOT_SEGMENT, TraversalInfo};

/// Commit `input` into the slot of `parent_data` named by the last segment
/// of `info`. A missing specifier commits the input as a leaf.
pub fn commit(
    specifier: Option<&Specifier>,
    from: Provenance,
    input: &Value,
    parent_data: &mut Map<String, Value>,
    metadata: &mut Metadata,
    info: &TraversalInfo,
) -> Result<()> {
    let key = info.last().unwrap_or(ROOT_SEGMENT);

    match (specifier, input) {
        (Some(Specifier::Namespace(namespace)), Value::Object(fields)) => commit_namespace(
            namespace,
            from,
            fields,
            object_slot(parent_data, key),
            namespace_slot(metadata),
            info,
            false,
        ),
        (Some(Specifier::Record(record)), Value::Object(entries)) => commit_record(
            record,
            from,
            entries,
            object_slot(parent_data, key),
            record_slot(metadata),
            info,
        ),
        _ => {
            commit_leaf(from, input, key, parent_data, leaf_slot(metadata, from), info);
            Ok(())
        }
    }
}

/// Commit each input field into `data`, then re-run the namespace mapper
/// over the merged data. Keys without a specifier get passthrough metadata.
pub fn commit_namespace(
    namespace: &Namespace,
    from: Provenance,
    input: &Map<String, Value>,
    data: &mut Map<String, Value>,
    metadata: &mut MetadataNamespace,
    info: &TraversalInfo,
    is_entry: bool,
) -> Result<()> {
    trace!(path = %info, "commit namespace");

    for (name, value) in input {
        let specifier = namespace.fields.get(name);
        let field_metadata = metadata.fields.entry(name.clone()).or_insert_with(|| match specifier {
            Some(_) => MetadataLeaf::new(None, from).into(),
            None => MetadataLeaf::passthrough(from).into(),
        });
        commit(specifier, from, value, data, field_metadata, &info.append(name))?;
    }

    let mapped = run_mapper(namespace, data, info, is_entry)?;
    data.extend(mapped);
    Ok(())
}

fn commit_record(
    record: &Record,
    from: Provenance,
    input: &Map<String, Value>,
    data: &mut Map<String, Value>,
    metadata: &mut MetadataRecord,
    info: &TraversalInfo,
) -> Result<()> {
    trace!(path = %info, "commit record");
    let entry = entry_namespace(record, info)?;
    metadata.from = from;

    for (key, entry_input) in input {
        let Value::Object(fields) = entry_input else {
            return Err(SettingsError::RecordInput {
                path: info.render(),
                value: Value::Object(input.clone()),
            });
        };
        let entry_metadata = metadata
            .value
            .entry(key.clone())
            .or_insert_with(|| MetadataNamespace::new().into());
        commit_namespace(
            entry,
            from,
            fields,
            object_slot(data, key),
            namespace_slot(entry_metadata),
            &info.append(key),
            true,
        )?;
    }

    if from == Provenance::Initial {
        metadata.initial = metadata.value.clone();
    }
    Ok(())
}

fn commit_leaf(
    from: Provenance,
    input: &Value,
    key: &str,
    parent_data: &mut Map<String, Value>,
    metadata: &mut MetadataLeaf,
    info: &TraversalInfo,
) {
    trace!(path = %info, value = %input, "commit leaf");
    parent_data.insert(key.to_string(), input.clone());
    metadata.value = Some(input.clone());
    metadata.from = from;
    if from == Provenance::Initial {
        metadata.initial = Some(input.clone());
    }
}
