//! Run configuration and parsing for tidemark.yml
//!
//! The configuration is built once at process start and handed to the engine
//! by value. Nothing in the library crates reads environment variables.

use crate::error::{CoreError, CoreResult};
use crate::source::Location;
use crate::version::{VersionParser, DEFAULT_EXTENSION};
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// File names looked up by [`MigrateConfig::load_from_dir`], in order
pub const CONFIG_FILE_NAMES: &[&str] = &["tidemark.yml", "tidemark.yaml"];

const DEFAULT_MIGRATIONS: &str = "migrations";
const DEFAULT_LEDGER_TABLE: &str = "schema_migrations";

/// Everything a migration run needs to know about its target
#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MigrateConfig {
    /// Keyspace (namespace) the scripts run against
    #[serde(default)]
    pub keyspace: String,

    /// Authentication credential for the session
    #[serde(default)]
    pub token: String,

    /// Path to the connection bundle
    #[serde(default)]
    pub bundle_path: String,

    /// Where scripts are discovered: a directory path or `embedded:<prefix>`
    #[serde(default = "default_migrations")]
    pub migrations: String,

    /// Script file extension, without the dot
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Name of the ledger table
    #[serde(default = "default_ledger_table")]
    pub ledger_table: String,
}

/// Values that take precedence over the file, typically from the CLI
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub keyspace: Option<String>,
    pub token: Option<String>,
    pub bundle_path: Option<String>,
    pub migrations: Option<String>,
    pub extension: Option<String>,
    pub ledger_table: Option<String>,
}

fn default_migrations() -> String {
    DEFAULT_MIGRATIONS.to_string()
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

fn default_ledger_table() -> String {
    DEFAULT_LEDGER_TABLE.to_string()
}

impl Default for MigrateConfig {
    fn default() -> Self {
        Self {
            keyspace: String::new(),
            token: String::new(),
            bundle_path: String::new(),
            migrations: default_migrations(),
            extension: default_extension(),
            ledger_table: default_ledger_table(),
        }
    }
}

impl fmt::Debug for MigrateConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrateConfig")
            .field("keyspace", &self.keyspace)
            .field("token", &"<redacted>")
            .field("bundle_path", &self.bundle_path)
            .field("migrations", &self.migrations)
            .field("extension", &self.extension)
            .field("ledger_table", &self.ledger_table)
            .finish()
    }
}

impl MigrateConfig {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Load `tidemark.yml` (or `.yaml`) from `dir`, falling back to defaults
    /// when neither exists
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        for name in CONFIG_FILE_NAMES {
            let path = dir.join(name);
            if path.exists() {
                log::debug!("Loading config from {}", path.display());
                return Self::load(&path);
            }
        }
        Ok(Self::default())
    }

    /// Overlay `overrides` onto this configuration
    pub fn apply(mut self, overrides: ConfigOverrides) -> Self {
        let ConfigOverrides {
            keyspace,
            token,
            bundle_path,
            migrations,
            extension,
            ledger_table,
        } = overrides;

        if let Some(v) = keyspace {
            self.keyspace = v;
        }
        if let Some(v) = token {
            self.token = v;
        }
        if let Some(v) = bundle_path {
            self.bundle_path = v;
        }
        if let Some(v) = migrations {
            self.migrations = v;
        }
        if let Some(v) = extension {
            self.extension = v;
        }
        if let Some(v) = ledger_table {
            self.ledger_table = v;
        }
        self
    }

    /// Trim every value and reject missing or malformed ones
    pub fn validate(mut self) -> CoreResult<Self> {
        for (name, value) in [
            ("keyspace", &mut self.keyspace),
            ("token", &mut self.token),
            ("bundle_path", &mut self.bundle_path),
            ("migrations", &mut self.migrations),
            ("extension", &mut self.extension),
            ("ledger_table", &mut self.ledger_table),
        ] {
            *value = value.trim().to_string();
            if value.is_empty() {
                return Err(CoreError::ConfigInvalid {
                    message: format!("'{name}' is required and cannot be blank"),
                });
            }
        }

        for (name, value) in [
            ("keyspace", &self.keyspace),
            ("ledger_table", &self.ledger_table),
        ] {
            if !is_plain_identifier(value) {
                return Err(CoreError::ConfigInvalid {
                    message: format!(
                        "'{name}' must start with a letter or underscore and contain only letters, digits, and underscores, got '{value}'"
                    ),
                });
            }
        }

        Ok(self)
    }

    /// Parsed migrations location
    pub fn location(&self) -> CoreResult<Location> {
        Location::parse(&self.migrations)
    }

    /// Version parser for the configured extension
    pub fn version_parser(&self) -> VersionParser {
        VersionParser::new(&self.extension)
    }
}

/// Whether `s` matches `[A-Za-z_][A-Za-z0-9_]*`, the identifier shape safe to
/// splice into statements unquoted
pub fn is_plain_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
