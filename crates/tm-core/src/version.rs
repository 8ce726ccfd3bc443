//! Version extraction from migration script names.
//!
//! Scripts are named `V<digits>__<description>.<ext>`, for example
//! `V3__add_col.cql`. The ASCII digits are the version.

use crate::error::{CoreError, CoreResult};
use regex::Regex;

/// Extension used when none is configured.
pub const DEFAULT_EXTENSION: &str = "cql";

/// Matches and parses versioned script names for one file extension.
#[derive(Debug, Clone)]
pub struct VersionParser {
    pattern: Regex,
    extension: String,
}

impl VersionParser {
    /// Build a parser for scripts ending in `.<extension>`.
    ///
    /// A leading dot in `extension` is ignored, so `"cql"` and `".cql"` are
    /// equivalent.
    pub fn new(extension: &str) -> Self {
        let extension = extension.trim_start_matches('.').to_string();
        let pattern = Regex::new(&format!(r"^V([0-9]+)__.*\.{}$", regex::escape(&extension)))
            .expect("escaped extension forms a valid regex");
        Self { pattern, extension }
    }

    /// The extension this parser accepts, without the leading dot
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Whether `filename` follows the versioned naming pattern
    pub fn matches(&self, filename: &str) -> bool {
        self.pattern.is_match(filename)
    }

    /// Extract the version from `filename`.
    ///
    /// Fails with [`CoreError::InvalidFilename`] when the name does not follow
    /// the pattern or the digits do not fit a 32-bit signed integer.
    pub fn extract(&self, filename: &str) -> CoreResult<i32> {
        let caps = self
            .pattern
            .captures(filename)
            .ok_or_else(|| CoreError::InvalidFilename {
                filename: filename.to_string(),
                reason: format!("expected V<digits>__<description>.{}", self.extension),
            })?;

        caps[1]
            .parse::<i32>()
            .map_err(|e| CoreError::InvalidFilename {
                filename: filename.to_string(),
                reason: format!("version '{}' is not a valid integer: {e}", &caps[1]),
            })
    }
}

impl Default for VersionParser {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSION)
    }
}

#[cfg(test)]
#[path = "version_test.rs"]
mod tests;
