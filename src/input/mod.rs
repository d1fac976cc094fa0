//! Layered settings input.
//!
//! Inputs often come from several places (built-in overrides, a project
//! file, a user file). Layers are deep-merged in order and the result is
//! applied as a single change.

mod loader;
mod merge;

pub use loader::{from_yaml_str, load_file};
pub use merge::{deep_merge, merge_layers};
