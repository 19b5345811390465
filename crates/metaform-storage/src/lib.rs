//! Metaform Storage - identity and lookup collaborator
//!
//! The core model never stores anything itself. This crate provides the
//! collaborator it expects: a table that hands out non-zero identifiers,
//! keeps display names unique among sibling schemas and resolves bare
//! identifiers back to records.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{StorageError, StorageResult};
pub use memory::MemoryStore;
pub use traits::SchemaStore;
