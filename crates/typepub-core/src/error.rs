//! Errors raised while loading settings and generation inputs.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for loading settings, package indexes, and version tables.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read settings at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to read {what} at {path}: {source}")]
    InputRead {
        what: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {what} at {path}: {source}")]
    InputParse {
        what: &'static str,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid version '{version}' for {name}: {source}")]
    InvalidVersion {
        name: String,
        version: String,
        #[source]
        source: semver::Error,
    },

    #[error("Failed to read LICENSE at {path}: {source}")]
    LicenseRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
