//! Settings specification engine.
//!
//! A settings spec is a tree of [`spec::Leaf`], [`spec::Namespace`] and
//! [`spec::Record`] specifiers. A [`Manager`] walks the tree to produce
//! normalized, validated data plus a metadata tree that records, for every
//! value, where it came from and what it was initially.
//!
//! The crate logs through `tracing` and never installs a subscriber.

pub mod engine;
pub mod error;
pub mod input;
pub mod manager;
pub mod metadata;
pub mod options;
pub mod spec;
pub mod traversal;

pub use engine::FixupInfo;
pub use error::{ErrorKind, Result, SettingsError};
pub use manager::Manager;
pub use metadata::{Metadata, MetadataLeaf, MetadataNamespace, MetadataRecord, Provenance};
pub use options::{ManagerOptions, Mode, OnFixup};
pub use spec::{Fixup, Leaf, Namespace, Record, Specifier, Violation};
pub use traversal::TraversalInfo;
