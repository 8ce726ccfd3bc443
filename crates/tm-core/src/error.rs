//! Error types for tm-core

use thiserror::Error;

/// Discovery, parsing, and configuration errors
#[derive(Error, Debug)]
pub enum CoreError {
    /// C001: Configuration file not found
    #[error("[C001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// C002: Invalid configuration value
    #[error("[C002] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// C003: Migrations location does not exist
    #[error("[C003] Migrations location not found: {location}")]
    NotFound { location: String },

    /// C004: Migrations location cannot be enumerated by any supported medium
    #[error("[C004] Unsupported migrations medium for '{location}': {reason}")]
    UnsupportedMedium { location: String, reason: String },

    /// C005: Script name does not follow V<digits>__<description>.<ext>
    #[error("[C005] Bad migration filename '{filename}': {reason}")]
    InvalidFilename { filename: String, reason: String },

    /// C006: Two scripts share a version
    #[error("[C006] Duplicate migration version {version}: '{first}' and '{second}'")]
    DuplicateVersion {
        version: i32,
        first: String,
        second: String,
    },

    /// C007: Script listed but missing from its medium
    #[error("[C007] Missing migration script: {filename}")]
    MissingScript { filename: String },

    /// C008: Script is not valid UTF-8
    #[error("[C008] Migration script '{filename}' is not valid UTF-8")]
    InvalidEncoding { filename: String },

    /// C009: IO error with path context
    #[error("[C009] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// C010: YAML parse error
    #[error("[C010] Config parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
