//! Publish versions of generated packages.

use super::AnyPackage;
use crate::error::Error;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Version a package will be published as.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version(semver::Version);

impl Version {
    #[must_use]
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self(semver::Version::new(major, minor, patch))
    }

    /// Parse a version string such as `4.1.0`.
    pub fn parse(s: &str) -> Result<Self, semver::Error> {
        semver::Version::parse(s).map(Self)
    }

    /// String written to the manifest's `version` field.
    #[must_use]
    pub fn version_string(&self) -> String {
        self.0.to_string()
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Resolves the version each package is published as.
pub trait VersionResolver: Send + Sync {
    /// `None` when no version is known for `pkg`.
    fn get_version(&self, pkg: &AnyPackage) -> Option<Version>;
}

/// Versions keyed by full npm name, loaded from a JSON object such as
/// `{ "@types/lodash": "4.1.0" }`.
#[derive(Debug, Clone, Default)]
pub struct VersionTable {
    versions: HashMap<String, Version>,
}

impl VersionTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a version table from disk.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::InputRead {
            what: "versions",
            path: path.to_path_buf(),
            source,
        })?;
        let raw: HashMap<String, String> =
            serde_json::from_str(&content).map_err(|source| Error::InputParse {
                what: "versions",
                path: path.to_path_buf(),
                source,
            })?;

        let mut table = Self::new();
        for (name, version) in raw {
            let parsed = Version::parse(&version).map_err(|source| Error::InvalidVersion {
                name: name.clone(),
                version: version.clone(),
                source,
            })?;
            table.insert(name, parsed);
        }
        Ok(table)
    }

    /// Record the version for a full npm name.
    pub fn insert(&mut self, full_npm_name: impl Into<String>, version: Version) {
        self.versions.insert(full_npm_name.into(), version);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

impl VersionResolver for VersionTable {
    fn get_version(&self, pkg: &AnyPackage) -> Option<Version> {
        self.versions.get(pkg.full_npm_name()).cloned()
    }
}
