//! Storage media that migration scripts are discovered from.
//!
//! A [`ScriptSource`] enumerates the files directly under one location and
//! reads them back by name. The medium is decided once, when the source is
//! opened from a [`Location`]:
//!
//! - a path (or `file://` URI) opens a [`DirectorySource`]
//! - `embedded:` or `embedded:<prefix>` opens an [`EmbeddedSource`] over the
//!   scripts packaged into the binary

mod directory;
mod embedded;

pub use directory::DirectorySource;
pub use embedded::EmbeddedSource;

use crate::error::{CoreError, CoreResult};
use rust_embed::RustEmbed;
use std::fmt;
use std::path::PathBuf;

const EMBEDDED_SCHEME: &str = "embedded:";
const FILE_SCHEME: &str = "file://";

/// Storage medium backing a [`ScriptSource`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Medium {
    /// Hierarchical directory on the filesystem
    Directory,
    /// Read-only archive packaged into the binary
    Embedded,
}

impl fmt::Display for Medium {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Medium::Directory => write!(f, "directory"),
            Medium::Embedded => write!(f, "embedded"),
        }
    }
}

/// Capability to enumerate and read scripts from one location
pub trait ScriptSource: Send + Sync {
    /// Medium this source reads from
    fn medium(&self) -> Medium;

    /// Human-readable location, used in messages
    fn location(&self) -> String;

    /// Bare names of the files directly under the location, in no particular
    /// order
    fn entries(&self) -> CoreResult<Vec<String>>;

    /// Read the full text of `filename`
    fn read(&self, filename: &str) -> CoreResult<String>;
}

/// Parsed migrations location
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// Filesystem directory
    Directory(PathBuf),
    /// Folder inside the packaged archive (`""` for its root)
    Embedded { prefix: String },
}

impl Location {
    /// Parse a configured location string.
    ///
    /// Any `scheme://` other than `file://` is rejected with
    /// [`CoreError::UnsupportedMedium`].
    pub fn parse(raw: &str) -> CoreResult<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "migrations location cannot be empty".to_string(),
            });
        }

        if let Some(prefix) = raw.strip_prefix(EMBEDDED_SCHEME) {
            return Ok(Location::Embedded {
                prefix: prefix.trim_matches('/').to_string(),
            });
        }

        if let Some(path) = raw.strip_prefix(FILE_SCHEME) {
            return Ok(Location::Directory(PathBuf::from(path)));
        }

        if let Some((scheme, _)) = raw.split_once("://") {
            return Err(CoreError::UnsupportedMedium {
                location: raw.to_string(),
                reason: format!("no strategy can enumerate '{scheme}://' locations"),
            });
        }

        Ok(Location::Directory(PathBuf::from(raw)))
    }

    /// Open the source for this location.
    ///
    /// `E` is the packaged archive consulted for [`Location::Embedded`].
    pub fn open<E: RustEmbed + 'static>(&self) -> CoreResult<Box<dyn ScriptSource>> {
        let source: Box<dyn ScriptSource> = match self {
            Location::Directory(path) => Box::new(DirectorySource::open(path)?),
            Location::Embedded { prefix } => Box::new(EmbeddedSource::<E>::open(prefix)?),
        };
        log::debug!(
            "Opened {} migrations source at {}",
            source.medium(),
            source.location()
        );
        Ok(source)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Directory(path) => write!(f, "{}", path.display()),
            Location::Embedded { prefix } => write!(f, "{EMBEDDED_SCHEME}{prefix}"),
        }
    }
}

#[cfg(test)]
#[path = "source_test.rs"]
mod tests;
