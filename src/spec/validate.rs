//! Structural checks on specifier trees.
//!
//! Run once at manager construction in development mode. Callback shapes are
//! enforced by the type system; this walk covers what types cannot express.

use super::{Namespace, Specifier};
use crate::error::{Result, SettingsError};
use crate::traversal::TraversalInfo;

/// Check a specifier tree for structural invariants.
///
/// - Record entries must be namespaces
/// - Field names must be non-empty and must not contain `.`
pub fn validate_specifier(specifier: &Specifier, info: &TraversalInfo) -> Result<()> {
    match specifier {
        Specifier::Leaf(_) => Ok(()),
        Specifier::Namespace(namespace) => validate_namespace(namespace, info),
        Specifier::Record(record) => {
            if record.entry.as_namespace().is_none() {
                return Err(SettingsError::invalid_record_entry(
                    info.render(),
                    record.entry.kind_name(),
                ));
            }
            validate_specifier(&record.entry, info)
        }
    }
}

/// Validate a namespace and everything below it.
pub fn validate_namespace(namespace: &Namespace, info: &TraversalInfo) -> Result<()> {
    for (name, field) in &namespace.fields {
        if name.is_empty() || name.contains('.') {
            return Err(SettingsError::invalid_specifier(
                info.render(),
                format!(
                    "{} has an invalid field name {:?}. Field names must be non-empty and must not contain \".\"",
                    describe(info),
                    name
                ),
            ));
        }
        validate_specifier(field, &info.append(name))?;
    }
    Ok(())
}

fn describe(info: &TraversalInfo) -> String {
    if info.is_root() {
        "Root namespace".to_string()
    } else {
        format!("Namespace at path \"{}\"", info.render())
    }
}
