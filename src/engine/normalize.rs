//! Resolving a partial input into a candidate data tree.
//!
//! Only the keys present in the input are visited. The candidate is a fresh
//! tree; live data and metadata are touched only to create record entries
//! introduced by the input.

use serde_json::{Map, Value};
use tracing::trace;

use super::fixup::{FixupInfo, report_fixup};
use super::initialize::{entry_namespace, initialize_entry};
use super::runners::{run_shorthand, run_type_mapper};
use crate::error::{Result, SettingsError};
use crate::metadata::{Metadata, MetadataNamespace, MetadataRecord};
use std::collections::BTreeMap;
use crate::options::ManagerOptions;
use crate::spec::{Leaf, Namespace, Record, Specifier};
use crate::traversal::TraversalInfo;

/// Normalize `input` against the fields of `namespace`.
///
/// Keys without a specifier pass through unchanged. `data` and `metadata`
/// are written only to add the record entries the input introduces.
pub fn normalize(
    options: &ManagerOptions,
    namespace: &Namespace,
    input: &Map<String, Value>,
    data: &mut Map<String, Value>,
    metadata: &mut MetadataNamespace,
    info: &TraversalInfo,
) -> Result<Map<String, Value>> {
    trace!(path = %info, "normalize");
    let mut candidate = Map::new();

    for (name, value) in input {
        let field_info = info.append(name);
        let resolved = match namespace.fields.get(name) {
            None => {
                trace!(path = %field_info, "no specifier, passing value through");
                value.clone()
            }
            Some(Specifier::Namespace(child)) => Value::Object(within_slot(
                data,
                &mut metadata.fields,
                name,
                Metadata::as_namespace_mut,
                MetadataNamespace::new(),
                |data, metadata| {
                    normalize_namespace(options, child, value, data, metadata, &field_info)
                },
            )?),
            Some(Specifier::Record(record)) => Value::Object(within_slot(
                data,
                &mut metadata.fields,
                name,
                Metadata::as_record_mut,
                MetadataRecord::new(BTreeMap::new()),
                |data, metadata| {
                    normalize_record(options, record, value, data, metadata, &field_info)
                },
            )?),
            Some(Specifier::Leaf(leaf)) => normalize_leaf(options, leaf, value, &field_info)?,
        };
        candidate.insert(name.clone(), resolved);
    }

    Ok(candidate)
}

/// Normalize a namespace input, expanding shorthand for non-object input.
pub fn normalize_namespace(
    options: &ManagerOptions,
    namespace: &Namespace,
    input: &Value,
    data: &mut Map<String, Value>,
    metadata: &mut MetadataNamespace,
    info: &TraversalInfo,
) -> Result<Map<String, Value>> {
    let longhand = run_shorthand(namespace, input, info)?;
    normalize(options, namespace, &longhand, data, metadata, info)
}

fn normalize_record(
    options: &ManagerOptions,
    record: &Record,
    input: &Value,
    data: &mut Map<String, Value>,
    metadata: &mut MetadataRecord,
    info: &TraversalInfo,
) -> Result<Map<String, Value>> {
    trace!(path = %info, "normalize record");
    let Value::Object(entries) = input else {
        return Err(SettingsError::RecordInput {
            path: info.render(),
            value: input.clone(),
        });
    };
    let entry = entry_namespace(record, info)?;

    let mut candidate = Map::new();
    for (key, entry_input) in entries {
        let entry_info = info.append(key);

        if data.get(key).is_none_or(Value::is_null) {
            trace!(path = %entry_info, "new record entry, initializing it");
            let (entry_data, entry_metadata) = initialize_entry(entry, &entry_info)?;
            data.insert(key.clone(), Value::Object(entry_data));
            metadata.value.insert(key.clone(), entry_metadata.into());
        }

        let resolved = within_slot(
            data,
            &mut metadata.value,
            key,
            Metadata::as_namespace_mut,
            MetadataNamespace::new(),
            |data, metadata| {
                normalize_namespace(options, entry, entry_input, data, metadata, &entry_info)
            },
        )?;
        candidate.insert(key.clone(), Value::Object(resolved));
    }

    Ok(candidate)
}

/// Run `normalize_child` against the live data and metadata stored under
/// `name`.
///
/// A missing or mismatched slot is replaced by an empty scratch slot, which
/// is written back only if normalizing created record entries inside it.
fn within_slot<M>(
    data: &mut Map<String, Value>,
    metadata: &mut BTreeMap<String, Metadata>,
    name: &str,
    project: fn(&mut Metadata) -> Option<&mut M>,
    empty: M,
    normalize_child: impl FnOnce(&mut Map<String, Value>, &mut M) -> Result<Map<String, Value>>,
) -> Result<Map<String, Value>>
where
    M: Into<Metadata>,
{
    if let (Some(Value::Object(child_data)), Some(child_metadata)) =
        (data.get_mut(name), metadata.get_mut(name).and_then(project))
    {
        return normalize_child(child_data, child_metadata);
    }

    let mut child_data = Map::new();
    let mut child_metadata = empty;
    let candidate = normalize_child(&mut child_data, &mut child_metadata)?;
    if !child_data.is_empty() {
        data.insert(name.to_string(), Value::Object(child_data));
        metadata.insert(name.to_string(), child_metadata.into());
    }
    Ok(candidate)
}

/// Fixup, then validate, then type-map a leaf input.
fn normalize_leaf(
    options: &ManagerOptions,
    leaf: &Leaf,
    input: &Value,
    info: &TraversalInfo,
) -> Result<Value> {
    let mut value = input.clone();

    if let Some(fixup) = &leaf.fixup {
        let fixed = fixup(&value).map_err(|source| SettingsError::Fixup {
            path: info.render(),
            value: value.clone(),
            source,
        })?;
        if let Some(fixed) = fixed {
            let fixup_info = FixupInfo {
                path: info.render(),
                before: input.clone(),
                after: fixed.value.clone(),
                messages: fixed.messages,
            };
            report_fixup(options, &fixup_info)?;
            value = fixed.value;
        }
    }

    if let Some(validate) = &leaf.validate {
        let violation = validate(&value).map_err(|source| SettingsError::ValidationRun {
            path: info.render(),
            value: value.clone(),
            source,
        })?;
        if let Some(violation) = violation {
            return Err(SettingsError::Validation {
                path: info.render(),
                value,
                reasons: violation.reasons,
            });
        }
    }

    run_type_mapper(leaf, value, info)
}
