//! Call sites for schema callbacks.
//!
//! Each runner wraps a failing callback exactly once, with the path of the
//! setting it ran for.

use serde_json::{Map, Value};
use std::borrow::Cow;
use tracing::{debug, trace};

use crate::error::{Result, SettingsError};
use crate::spec::{InitialFn, Leaf, Namespace, SeedFn};
use crate::traversal::TraversalInfo;

pub(crate) fn run_initializer(
    initial: Option<&InitialFn>,
    info: &TraversalInfo,
) -> Result<Option<Value>> {
    let Some(initial) = initial else {
        trace!(path = %info, "no initializer to run");
        return Ok(None);
    };

    trace!(path = %info, "running initializer");
    initial().map(Some).map_err(|source| SettingsError::Initializer {
        path: info.render(),
        source,
    })
}

/// Run a namespace seed or record starter producer. Absent and `null` both
/// mean "no seed".
pub(crate) fn run_seed(seed: Option<&SeedFn>, info: &TraversalInfo) -> Result<Map<String, Value>> {
    let Some(seed) = seed else {
        return Ok(Map::new());
    };

    trace!(path = %info, "running seed initializer");
    let value = seed().map_err(|source| SettingsError::Initializer {
        path: info.render(),
        source,
    })?;
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => Err(SettingsError::Initializer {
            path: info.render(),
            source: anyhow::anyhow!("initializer must return an object but returned {other}"),
        }),
    }
}

pub(crate) fn run_type_mapper(leaf: &Leaf, value: Value, info: &TraversalInfo) -> Result<Value> {
    let Some(map_type) = &leaf.map_type else {
        return Ok(value);
    };

    trace!(path = %info, value = %value, "running type mapper");
    map_type(value).map_err(|source| SettingsError::TypeMapper {
        path: info.render(),
        source,
    })
}

/// Run a namespace mapper over `input`, returning the keys to assign onto
/// the namespace's data. Record entries see their entry name as `key`.
pub(crate) fn run_mapper(
    namespace: &Namespace,
    input: &Map<String, Value>,
    info: &TraversalInfo,
    is_entry: bool,
) -> Result<Map<String, Value>> {
    let Some(map) = &namespace.map else {
        return Ok(Map::new());
    };

    trace!(path = %info, "running mapper");
    let context = if is_entry { info.as_entry() } else { info.clone() };
    let input = Value::Object(input.clone());
    let mapped = map(&input, &context).map_err(|source| SettingsError::Mapper {
        path: info.render(),
        input: input.clone(),
        source,
    })?;
    match mapped {
        Value::Object(fields) => Ok(fields),
        Value::Null => Ok(Map::new()),
        other => Err(SettingsError::Mapper {
            path: info.render(),
            input,
            source: anyhow::anyhow!("mapper must return an object but returned {other}"),
        }),
    }
}

/// Longhand object for a namespace input, expanding shorthand when the input
/// is not an object.
pub(crate) fn run_shorthand<'a>(
    namespace: &Namespace,
    input: &'a Value,
    info: &TraversalInfo,
) -> Result<Cow<'a, Map<String, Value>>> {
    if let Value::Object(map) = input {
        return Ok(Cow::Borrowed(map));
    }

    let Some(shorthand) = &namespace.shorthand else {
        return Err(SettingsError::MissingShorthand {
            path: info.render(),
            value: input.clone(),
        });
    };

    debug!(path = %info, "expanding shorthand");
    let expanded = shorthand(input.clone()).map_err(|source| SettingsError::Shorthand {
        path: info.render(),
        value: input.clone(),
        source,
    })?;
    match expanded {
        Value::Object(map) => Ok(Cow::Owned(map)),
        other => Err(SettingsError::Shorthand {
            path: info.render(),
            value: input.clone(),
            source: anyhow::anyhow!("shorthand must return an object but returned {other}"),
        }),
    }
}
