//! Migration script types

use serde::Serialize;
use std::fmt;

/// A discovered script before its text has been read
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptDescriptor {
    /// Version parsed from the filename
    pub version: i32,

    /// Bare filename, e.g. `V1__create_users.cql`
    pub filename: String,
}

impl fmt::Display for ScriptDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.filename)
    }
}

/// A script with its contents, ready to be split and applied.
///
/// Rediscovered on every run and never persisted.
#[derive(Debug, Clone)]
pub struct MigrationScript {
    /// Version parsed from the filename
    pub version: i32,

    /// Bare filename
    pub filename: String,

    /// Full script text
    pub raw_text: String,
}

impl MigrationScript {
    /// Attach script text to a descriptor
    pub fn new(descriptor: &ScriptDescriptor, raw_text: String) -> Self {
        Self {
            version: descriptor.version,
            filename: descriptor.filename.clone(),
            raw_text,
        }
    }

    /// Split the script into executable statements
    pub fn statements(&self) -> Vec<String> {
        crate::splitter::split_statements(&self.raw_text)
    }
}
