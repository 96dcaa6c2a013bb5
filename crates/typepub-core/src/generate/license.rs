//! The license text shipped in every generated package.

use crate::error::Error;
use std::path::Path;
use std::sync::Arc;

/// License text, loaded once and shared read-only across generations.
#[derive(Debug, Clone)]
pub struct License(Arc<str>);

impl License {
    /// Read the license file.
    pub fn load(path: &Path) -> Result<Self, Error> {
        std::fs::read_to_string(path)
            .map(Self::from_text)
            .map_err(|source| Error::LicenseRead {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Read the license shipped with the tool.
    pub fn load_default() -> Result<Self, Error> {
        Self::load(&crate::paths::license_path())
    }

    #[must_use]
    pub fn from_text(text: impl Into<Arc<str>>) -> Self {
        Self(text.into())
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.0
    }

    /// Another handle on the same text, for handing to write tasks.
    #[must_use]
    pub fn shared(&self) -> Arc<str> {
        Arc::clone(&self.0)
    }
}
