//! Package generation error types.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Generation error codes.
pub mod codes {
    pub const PACKAGE_JSON_NOT_FOUND: &str = "PACKAGE_JSON_NOT_FOUND";
    pub const PACKAGE_JSON_READ_FAILED: &str = "PACKAGE_JSON_READ_FAILED";
    pub const PACKAGE_JSON_PARSE_FAILED: &str = "PACKAGE_JSON_PARSE_FAILED";
    pub const PACKAGE_JSON_INVALID: &str = "PACKAGE_JSON_INVALID";
    pub const OUTPUT_DIR_CREATE_FAILED: &str = "OUTPUT_DIR_CREATE_FAILED";
    pub const OUTPUT_DIR_CLEAR_FAILED: &str = "OUTPUT_DIR_CLEAR_FAILED";
    pub const OUTPUT_WRITE_FAILED: &str = "OUTPUT_WRITE_FAILED";
    pub const FILE_COPY_FAILED: &str = "FILE_COPY_FAILED";
    pub const VERSION_NOT_FOUND: &str = "VERSION_NOT_FOUND";
    pub const MANIFEST_SERIALIZE_FAILED: &str = "MANIFEST_SERIALIZE_FAILED";
    pub const TASK_FAILED: &str = "TASK_FAILED";
}

/// Error that aborts generation of one package.
#[derive(Error, Debug)]
pub enum GenError {
    #[error("package.json not found: {}", path.display())]
    PackageJsonNotFound { path: PathBuf },

    #[error("Failed to read {}: {source}", path.display())]
    PackageJsonRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid JSON in {}: {source}", path.display())]
    PackageJsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid {}: {message}", path.display())]
    PackageJsonInvalid { path: PathBuf, message: String },

    #[error("Failed to create output directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to clear output directory {}: {source}", path.display())]
    ClearDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to copy {} to {}: {source}", from.display(), to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("No version known for {name}")]
    VersionNotFound { name: String },

    #[error("Failed to serialize package.json: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Output task failed: {0}")]
    Task(String),
}

impl GenError {
    /// Stable error code for machine-readable output.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::PackageJsonNotFound { .. } => codes::PACKAGE_JSON_NOT_FOUND,
            Self::PackageJsonRead { .. } => codes::PACKAGE_JSON_READ_FAILED,
            Self::PackageJsonParse { .. } => codes::PACKAGE_JSON_PARSE_FAILED,
            Self::PackageJsonInvalid { .. } => codes::PACKAGE_JSON_INVALID,
            Self::CreateDir { .. } => codes::OUTPUT_DIR_CREATE_FAILED,
            Self::ClearDir { .. } => codes::OUTPUT_DIR_CLEAR_FAILED,
            Self::Write { .. } => codes::OUTPUT_WRITE_FAILED,
            Self::Copy { .. } => codes::FILE_COPY_FAILED,
            Self::VersionNotFound { .. } => codes::VERSION_NOT_FOUND,
            Self::Serialize(_) => codes::MANIFEST_SERIALIZE_FAILED,
            Self::Task(_) => codes::TASK_FAILED,
        }
    }

    /// Whether the partial manifest in the source tree was the problem.
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::PackageJsonNotFound { .. }
                | Self::PackageJsonRead { .. }
                | Self::PackageJsonParse { .. }
                | Self::PackageJsonInvalid { .. }
        )
    }

    /// Whether creating, clearing, writing, or copying in the output tree failed.
    #[must_use]
    pub fn is_filesystem_error(&self) -> bool {
        matches!(
            self,
            Self::CreateDir { .. } | Self::ClearDir { .. } | Self::Write { .. } | Self::Copy { .. }
        )
    }

    pub(crate) fn invalid(path: &Path, message: impl Into<String>) -> Self {
        Self::PackageJsonInvalid {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}

impl From<tokio::task::JoinError> for GenError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::Task(e.to_string())
    }
}
