//! Manager configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::engine::FixupInfo;

/// Runtime mode. Development runs structural checks on the specifier tree
/// before first use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Development,
    Production,
}

/// Fixup hook. Receives the fixup and the default handler, which it may call
/// to keep the default logging.
pub type OnFixup = Arc<dyn Fn(&FixupInfo, &dyn Fn(&FixupInfo)) -> anyhow::Result<()> + Send + Sync>;

/// Options for [`Manager`](crate::Manager).
#[derive(Clone, Default)]
pub struct ManagerOptions {
    pub mode: Mode,
    /// Replaces the default fixup logging when set.
    pub on_fixup: Option<OnFixup>,
}

impl ManagerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_on_fixup<F>(mut self, on_fixup: F) -> Self
    where
        F: Fn(&FixupInfo, &dyn Fn(&FixupInfo)) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.on_fixup = Some(Arc::new(on_fixup));
        self
    }
}

impl fmt::Debug for ManagerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagerOptions")
            .field("mode", &self.mode)
            .field("on_fixup", &self.on_fixup.is_some())
            .finish()
    }
}
