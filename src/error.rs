//! Structured error types for settings operations.
//!
//! Every error carries the dotted path of the setting where it occurred.
//! Errors raised by schema callbacks keep the original cause as their source.

use serde::Serialize;
use serde_json::Value;

/// Error kinds for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    // Configuration errors
    Initializer,
    InvalidSpecifier,

    // Input errors
    Shorthand,
    RecordInput,

    // Callback errors
    TypeMapper,
    Mapper,
    Fixup,
    OnFixup,
    ValidationRun,

    // Expected, user-facing
    Validation,
}

/// Error raised while initializing, normalizing or committing settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("There was an unexpected error while running the initializer for setting \"{path}\"")]
    Initializer {
        path: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("There was an unexpected error while running the type mapper for setting \"{path}\"")]
    TypeMapper {
        path: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("There was an unexpected error while running the mapper for setting input \"{path}\"")]
    Mapper {
        path: String,
        input: Value,
        #[source]
        source: anyhow::Error,
    },

    #[error(
        "There was an unexpected error while running the namespace shorthand for setting \"{path}\". The given value was {value}"
    )]
    Shorthand {
        path: String,
        value: Value,
        #[source]
        source: anyhow::Error,
    },

    #[error(
        "Setting \"{path}\" is a namespace with no shorthand so expects an object but received a non-object: {value}"
    )]
    MissingShorthand { path: String, value: Value },

    #[error(
        "Received non-object input for record-kind setting \"{path}\". The input was {value}. Record settings must be objects."
    )]
    RecordInput { path: String, value: Value },

    #[error("Fixup for \"{path}\" failed while running on value {value}")]
    Fixup {
        path: String,
        value: Value,
        #[source]
        source: anyhow::Error,
    },

    #[error("onFixup callback for \"{path}\" failed")]
    OnFixup {
        path: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Your setting \"{path}\" failed validation with value {value}:\n\n- {}", .reasons.join("\n- "))]
    Validation {
        path: String,
        value: Value,
        reasons: Vec<String>,
    },

    #[error("Validation for \"{path}\" unexpectedly failed while running on value {value}")]
    ValidationRun {
        path: String,
        value: Value,
        #[source]
        source: anyhow::Error,
    },

    #[error("{message}")]
    InvalidSpecifier { path: String, message: String },
}

impl SettingsError {
    /// The kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SettingsError::Initializer { .. } => ErrorKind::Initializer,
            SettingsError::TypeMapper { .. } => ErrorKind::TypeMapper,
            SettingsError::Mapper { .. } => ErrorKind::Mapper,
            SettingsError::Shorthand { .. } | SettingsError::MissingShorthand { .. } => {
                ErrorKind::Shorthand
            }
            SettingsError::RecordInput { .. } => ErrorKind::RecordInput,
            SettingsError::Fixup { .. } => ErrorKind::Fixup,
            SettingsError::OnFixup { .. } => ErrorKind::OnFixup,
            SettingsError::Validation { .. } => ErrorKind::Validation,
            SettingsError::ValidationRun { .. } => ErrorKind::ValidationRun,
            SettingsError::InvalidSpecifier { .. } => ErrorKind::InvalidSpecifier,
        }
    }

    /// Dotted path of the setting the error relates to (root is `""`).
    pub fn path(&self) -> &str {
        match self {
            SettingsError::Initializer { path, .. }
            | SettingsError::TypeMapper { path, .. }
            | SettingsError::Mapper { path, .. }
            | SettingsError::Shorthand { path, .. }
            | SettingsError::MissingShorthand { path, .. }
            | SettingsError::RecordInput { path, .. }
            | SettingsError::Fixup { path, .. }
            | SettingsError::OnFixup { path, .. }
            | SettingsError::Validation { path, .. }
            | SettingsError::ValidationRun { path, .. }
            | SettingsError::InvalidSpecifier { path, .. } => path,
        }
    }

    /// The offending value, when the error is about one.
    pub fn value(&self) -> Option<&Value> {
        match self {
            SettingsError::Mapper { input: value, .. }
            | SettingsError::Shorthand { value, .. }
            | SettingsError::MissingShorthand { value, .. }
            | SettingsError::RecordInput { value, .. }
            | SettingsError::Fixup { value, .. }
            | SettingsError::Validation { value, .. }
            | SettingsError::ValidationRun { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Violation reasons reported by a validator. Empty for other errors.
    pub fn reasons(&self) -> &[String] {
        match self {
            SettingsError::Validation { reasons, .. } => reasons,
            _ => &[],
        }
    }

    pub(crate) fn invalid_specifier(path: impl Into<String>, message: impl Into<String>) -> Self {
        SettingsError::InvalidSpecifier {
            path: path.into(),
            message: message.into(),
        }
    }

    pub(crate) fn invalid_record_entry(path: impl Into<String>, kind: &str) -> Self {
        let path = path.into();
        let message = format!(
            "Record entry for setting specifier at path \"{path}\" was invalid. Record entries must be namespaces. Got: {kind}"
        );
        SettingsError::InvalidSpecifier { path, message }
    }
}

/// Result type for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;
