//! Fixup notifications.

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::error::{Result, SettingsError};
use crate::options::ManagerOptions;

/// Describes one automatic correction of a leaf value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixupInfo {
    /// Dotted path of the fixed-up setting.
    pub path: String,
    pub before: Value,
    pub after: Value,
    pub messages: Vec<String>,
}

/// Default fixup handler: logs a warning for fixups that explain themselves.
pub fn log_fixup(info: &FixupInfo) {
    if info.messages.is_empty() {
        return;
    }

    warn!(
        path = %info.path,
        before = %info.before,
        after = %info.after,
        messages = ?info.messages,
        "One of your setting values was invalid. We were able to automatically fix it up now but please update your code."
    );
}

/// Hand a fixup to the configured handler, or to [`log_fixup`].
pub(crate) fn report_fixup(options: &ManagerOptions, info: &FixupInfo) -> Result<()> {
    match &options.on_fixup {
        Some(on_fixup) => on_fixup(info, &log_fixup).map_err(|source| SettingsError::OnFixup {
            path: info.path.clone(),
            source,
        }),
        None => {
            log_fixup(info);
            Ok(())
        }
    }
}
