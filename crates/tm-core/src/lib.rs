//! tm-core - Core library for Tidemark
//!
//! This crate provides the pieces of a migration run that do not touch the
//! database: configuration, script naming and versions, statement splitting,
//! and script discovery across storage media.

pub mod config;
pub mod error;
pub mod lister;
pub mod script;
pub mod source;
pub mod splitter;
pub mod version;

pub use config::{ConfigOverrides, MigrateConfig};
pub use error::{CoreError, CoreResult};
pub use lister::ResourceLister;
pub use script::{MigrationScript, ScriptDescriptor};
pub use source::{DirectorySource, EmbeddedSource, Location, Medium, ScriptSource};
pub use splitter::split_statements;
pub use version::VersionParser;
