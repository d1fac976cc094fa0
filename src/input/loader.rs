//! Reading input layers from YAML and JSON.

use anyhow::{Context, Result, bail};
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// Parse a YAML document into an input layer. The document root must be a
/// mapping; a `null` root is an empty layer.
pub fn from_yaml_str(content: &str) -> Result<Value> {
    let value = serde_yaml::from_str::<Value>(content).context("Failed to parse YAML input")?;
    expect_object(value)
}

/// Load an input layer from a `.yaml`, `.yml` or `.json` file.
pub fn load_file(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file {}", path.display()))?;
    debug!(path = %path.display(), "loading settings file");

    match path.extension().and_then(|extension| extension.to_str()) {
        Some("yaml" | "yml") => from_yaml_str(&content)
            .with_context(|| format!("Invalid settings file {}", path.display())),
        Some("json") => {
            let value = serde_json::from_str::<Value>(&content)
                .with_context(|| format!("Failed to parse JSON settings file {}", path.display()))?;
            expect_object(value)
                .with_context(|| format!("Invalid settings file {}", path.display()))
        }
        _ => bail!(
            "Unsupported settings file {}: expected a .yaml, .yml or .json extension",
            path.display()
        ),
    }
}

fn expect_object(value: Value) -> Result<Value> {
    match value {
        Value::Object(_) => Ok(value),
        Value::Null => Ok(Value::Object(Default::default())),
        other => bail!("Settings input must be a mapping, got {other}"),
    }
}
