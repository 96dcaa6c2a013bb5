//! Typing package model.
//!
//! Provides:
//! - The two kinds of publishable package (`TypingPackage`, `NotNeededPackage`)
//! - npm name helpers for the `@types` scope
//! - The collaborator traits the generator queries (`PackageSet`, `VersionResolver`)
//! - JSON-backed implementations of those collaborators (`PackageIndex`, `VersionTable`)

pub mod index;
pub mod version;

pub use index::PackageIndex;
pub use version::{Version, VersionResolver, VersionTable};

use crate::config::GenerateOptions;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// npm scope every generated typings package is published under.
pub const TYPES_SCOPE: &str = "@types";

/// Marker for "any major version" in a declared dependency.
pub const WILDCARD: &str = "*";

/// Encode a scoped npm name for use inside another scope: `@foo/bar` becomes `foo__bar`.
///
/// Unscoped names are returned unchanged.
#[must_use]
pub fn mangle_scoped_package(name: &str) -> String {
    match name.strip_prefix('@').and_then(|rest| rest.split_once('/')) {
        Some((scope, pkg)) => format!("{scope}__{pkg}"),
        None => name.to_string(),
    }
}

/// Full `@types`-scoped npm name for a library or typing name.
#[must_use]
pub fn full_npm_name(name: &str) -> String {
    format!("{TYPES_SCOPE}/{}", mangle_scoped_package(name))
}

/// Major version a typing declares for one of its dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawMajor", into = "RawMajor")]
pub enum DependencyVersion {
    /// A specific major version.
    Major(u32),
    /// Any version (`"*"`).
    Any,
}

impl DependencyVersion {
    /// Semver range injected into `dependencies` for this major version.
    #[must_use]
    pub fn semver_range(self) -> String {
        match self {
            Self::Any => WILDCARD.to_string(),
            Self::Major(major) => format!("^{major}"),
        }
    }

    /// Whether a typing at `major` satisfies this requirement.
    #[must_use]
    pub fn accepts(self, major: u32) -> bool {
        match self {
            Self::Any => true,
            Self::Major(m) => m == major,
        }
    }
}

impl fmt::Display for DependencyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str(WILDCARD),
            Self::Major(major) => write!(f, "{major}"),
        }
    }
}

/// Wire form of `DependencyVersion`: a number or `"*"`.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawMajor {
    Number(u32),
    Text(String),
}

impl TryFrom<RawMajor> for DependencyVersion {
    type Error = String;

    fn try_from(raw: RawMajor) -> Result<Self, Self::Error> {
        match raw {
            RawMajor::Number(n) => Ok(Self::Major(n)),
            RawMajor::Text(s) if s == WILDCARD => Ok(Self::Any),
            RawMajor::Text(s) => s
                .parse()
                .map(Self::Major)
                .map_err(|_| format!("expected a major version or \"*\", got \"{s}\"")),
        }
    }
}

impl From<DependencyVersion> for RawMajor {
    fn from(v: DependencyVersion) -> Self {
        match v {
            DependencyVersion::Major(n) => Self::Number(n),
            DependencyVersion::Any => Self::Text(WILDCARD.to_string()),
        }
    }
}

/// A typing's dependency on another library's typings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageDependency {
    /// Plain library name, e.g. `react`.
    pub name: String,
    /// Required major version of that library's typings.
    pub major_version: DependencyVersion,
}

impl PackageDependency {
    #[must_use]
    pub fn new(name: impl Into<String>, major_version: DependencyVersion) -> Self {
        Self {
            name: name.into(),
            major_version,
        }
    }

    /// `@types`-scoped name of this dependency.
    #[must_use]
    pub fn types_name(&self) -> String {
        full_npm_name(&self.name)
    }
}

/// Author credited in the manifest and README.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    pub name: String,
    pub url: String,
}

/// A package bundling declaration files for one library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypingPackage {
    /// Human-readable library name, e.g. `Lodash`.
    pub library_name: String,
    /// Directory name in the declarations repository, e.g. `lodash` or `foo__bar`.
    pub typing_name: String,
    /// Published npm name, e.g. `@types/lodash`.
    pub full_npm_name: String,
    /// Declarations repository URL, without `.git`.
    pub source_repo_url: String,
    pub dependencies: Vec<PackageDependency>,
    /// Declaration files relative to the source directory.
    pub files: Vec<String>,
    pub contributors: Vec<Contributor>,
    pub content_hash: String,
    /// Minimum TypeScript version the declarations need.
    pub typescript_version: String,
    pub output_directory: PathBuf,
    /// Path below `types/` in the declarations repository.
    pub sub_directory_path: String,
    /// Global values the declarations expose.
    pub globals: Vec<String>,
    /// Upstream project name or URL, if known.
    pub project_name: Option<String>,
    /// Whether the source directory provides a partial `package.json`.
    pub has_package_json: bool,
}

impl TypingPackage {
    /// Directory holding this typing's sources.
    #[must_use]
    pub fn source_directory(&self, options: &GenerateOptions) -> PathBuf {
        options
            .definitely_typed_path
            .join("types")
            .join(&self.sub_directory_path)
    }

    /// Source path of `file`, relative to this typing's source directory.
    #[must_use]
    pub fn file_path(&self, file: &str, options: &GenerateOptions) -> PathBuf {
        self.source_directory(options).join(file)
    }
}

/// A stub package for a library that ships its own declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotNeededPackage {
    pub library_name: String,
    /// Directory name the typing used to live under.
    pub typing_name: String,
    /// Published stub name, e.g. `@types/moment`.
    pub full_npm_name: String,
    /// The real package consumers should depend on instead.
    pub real_package_name: String,
    pub source_repo_url: String,
    /// README published with the stub.
    pub readme: String,
    pub output_directory: PathBuf,
}

impl NotNeededPackage {
    /// Standard README for a stub package.
    #[must_use]
    pub fn stub_readme(library_name: &str, source_repo_url: &str, full_npm_name: &str) -> String {
        format!(
            "This is a stub types definition for {library_name} ({source_repo_url}).\n\n\
             {library_name} provides its own type definitions, so you don't need {full_npm_name} installed!"
        )
    }
}

/// Either kind of publishable package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnyPackage {
    Typing(TypingPackage),
    NotNeeded(NotNeededPackage),
}

impl AnyPackage {
    #[must_use]
    pub fn is_not_needed(&self) -> bool {
        matches!(self, Self::NotNeeded(_))
    }

    #[must_use]
    pub fn full_npm_name(&self) -> &str {
        match self {
            Self::Typing(t) => &t.full_npm_name,
            Self::NotNeeded(n) => &n.full_npm_name,
        }
    }

    #[must_use]
    pub fn typing_name(&self) -> &str {
        match self {
            Self::Typing(t) => &t.typing_name,
            Self::NotNeeded(n) => &n.typing_name,
        }
    }

    #[must_use]
    pub fn output_directory(&self) -> &std::path::Path {
        match self {
            Self::Typing(t) => &t.output_directory,
            Self::NotNeeded(n) => &n.output_directory,
        }
    }
}

impl From<TypingPackage> for AnyPackage {
    fn from(t: TypingPackage) -> Self {
        Self::Typing(t)
    }
}

impl From<NotNeededPackage> for AnyPackage {
    fn from(n: NotNeededPackage) -> Self {
        Self::NotNeeded(n)
    }
}

/// Registry of every known typing package.
pub trait PackageSet: Send + Sync {
    /// Whether a typings package exists that satisfies `dependency`.
    fn has_typing_for(&self, dependency: &PackageDependency) -> bool;
}
