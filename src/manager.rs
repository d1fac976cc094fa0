//! The settings manager.
//!
//! Owns a specifier tree together with the live data and metadata it
//! produced, and exposes `change`, `reset` and `original`.

use serde_json::{Map, Value};
use tracing::debug;

use crate::engine::{commit_namespace, initialize_namespace, normalize_namespace};
use crate::error::Result;
use crate::input::merge_layers;
use crate::metadata::{MetadataNamespace, Provenance, data_from_metadata};
use crate::options::{ManagerOptions, Mode};
use crate::spec::{Namespace, validate_namespace};
use crate::traversal::TraversalInfo;

/// Settings built from a root namespace.
///
/// ```
/// use serde_json::json;
/// use setset::Manager;
/// use setset::spec::{Leaf, Namespace};
///
/// let spec = Namespace::new().field("port", Leaf::new().with_default(json!(8080)));
/// let mut settings = Manager::new(spec)?;
/// settings.change(json!({ "port": 9000 }))?;
///
/// assert_eq!(settings.data()["port"], json!(9000));
/// assert_eq!(settings.original()["port"], json!(8080));
/// # Ok::<(), setset::SettingsError>(())
/// ```
#[derive(Debug)]
pub struct Manager {
    spec: Namespace,
    options: ManagerOptions,
    data: Map<String, Value>,
    metadata: MetadataNamespace,
}

impl Manager {
    /// Build settings with default options.
    pub fn new(spec: Namespace) -> Result<Self> {
        Self::with_options(spec, ManagerOptions::default())
    }

    /// Build settings, validating the specifier tree first in development
    /// mode.
    pub fn with_options(spec: Namespace, options: ManagerOptions) -> Result<Self> {
        debug!(mode = ?options.mode, "construct");
        let info = TraversalInfo::root();

        if options.mode == Mode::Development {
            validate_namespace(&spec, &info)?;
        }

        let (data, metadata) = initialize_namespace(&spec, &info, false)?;
        Ok(Self {
            spec,
            options,
            data,
            metadata,
        })
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn metadata(&self) -> &MetadataNamespace {
        &self.metadata
    }

    pub fn spec(&self) -> &Namespace {
        &self.spec
    }

    pub fn options(&self) -> &ManagerOptions {
        &self.options
    }

    /// Apply a partial input.
    ///
    /// Either the whole input is normalized and committed, or the call fails
    /// and data and metadata are left exactly as they were.
    pub fn change(&mut self, input: Value) -> Result<&mut Self> {
        debug!(input = %input, "change");
        let info = TraversalInfo::root();
        let mut data = self.data.clone();
        let mut metadata = self.metadata.clone();

        let candidate = normalize_namespace(
            &self.options,
            &self.spec,
            &input,
            &mut data,
            &mut metadata,
            &info,
        )?;
        commit_namespace(
            &self.spec,
            Provenance::Change,
            &candidate,
            &mut data,
            &mut metadata,
            &info,
            false,
        )?;

        self.data = data;
        self.metadata = metadata;
        Ok(self)
    }

    /// Deep-merge `layers` in order and apply the result as one change.
    pub fn change_layers(&mut self, layers: impl IntoIterator<Item = Value>) -> Result<&mut Self> {
        self.change(merge_layers(layers))
    }

    /// Re-run initialization, discarding every change.
    pub fn reset(&mut self) -> Result<&mut Self> {
        debug!("reset");
        let (data, metadata) = initialize_namespace(&self.spec, &TraversalInfo::root(), false)?;
        self.data = data;
        self.metadata = metadata;
        Ok(self)
    }

    /// The data as it was at initialization.
    pub fn original(&self) -> Map<String, Value> {
        debug!("get original");
        data_from_metadata(&self.metadata, Map::new())
    }
}
