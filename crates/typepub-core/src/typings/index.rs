//! Package index loading.
//!
//! The index is a JSON file listing every typing package and every stub:
//!
//! ```json
//! {
//!   "typings": [
//!     { "typingName": "lodash", "libraryName": "Lodash", "majorVersion": 4,
//!       "files": ["index.d.ts"], "contributors": [{ "name": "Brian", "url": "https://github.com/bz" }] }
//!   ],
//!   "notNeeded": [
//!     { "typingName": "moment", "libraryName": "Moment", "sourceRepoURL": "https://github.com/moment/moment" }
//!   ]
//! }
//! ```

use super::{
    full_npm_name, mangle_scoped_package, AnyPackage, Contributor, NotNeededPackage,
    PackageDependency, PackageSet, TypingPackage,
};
use crate::config::GenerateOptions;
use crate::error::Error;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use typepub_util::hash::blake3_named_files;

/// Repository declarations are exported from unless an entry says otherwise.
pub const DEFAULT_SOURCE_REPO_URL: &str = "https://github.com/DefinitelyTyped/DefinitelyTyped";

/// TypeScript version assumed when an entry does not declare one.
pub const DEFAULT_TYPESCRIPT_VERSION: &str = "2.0";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndexFile {
    #[serde(default)]
    typings: Vec<TypingEntry>,
    #[serde(default)]
    not_needed: Vec<NotNeededEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TypingEntry {
    typing_name: String,
    library_name: String,
    major_version: Option<u32>,
    #[serde(rename = "sourceRepoURL")]
    source_repo_url: Option<String>,
    #[serde(default)]
    dependencies: Vec<PackageDependency>,
    files: Vec<String>,
    #[serde(default)]
    contributors: Vec<Contributor>,
    content_hash: Option<String>,
    #[serde(rename = "typeScriptVersion")]
    typescript_version: Option<String>,
    sub_directory_path: Option<String>,
    #[serde(default)]
    globals: Vec<String>,
    project_name: Option<String>,
    #[serde(default)]
    has_package_json: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NotNeededEntry {
    typing_name: String,
    library_name: String,
    #[serde(rename = "sourceRepoURL")]
    source_repo_url: String,
    real_package_name: Option<String>,
    readme: Option<String>,
}

/// Every known package, queryable as a `PackageSet`.
#[derive(Debug, Clone, Default)]
pub struct PackageIndex {
    typings: Vec<TypingPackage>,
    not_needed: Vec<NotNeededPackage>,
    /// Typing name -> major versions present (`None` = unversioned entry).
    majors: HashMap<String, Vec<Option<u32>>>,
}

impl PackageIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load an index file, resolving source and output locations from `options`.
    ///
    /// Entries without a `contentHash` get one computed from their declaration files.
    pub fn load(path: &Path, options: &GenerateOptions) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::InputRead {
            what: "package index",
            path: path.to_path_buf(),
            source,
        })?;
        let file: IndexFile =
            serde_json::from_str(&content).map_err(|source| Error::InputParse {
                what: "package index",
                path: path.to_path_buf(),
                source,
            })?;

        let mut index = Self::new();

        for entry in file.typings {
            let major = entry.major_version;
            let typing = typing_from_entry(entry, options)?;
            index.add_typing(typing, major);
        }

        for entry in file.not_needed {
            index.add_not_needed(not_needed_from_entry(entry, options));
        }

        Ok(index)
    }

    /// Register a typing package at the given major version.
    pub fn add_typing(&mut self, typing: TypingPackage, major: Option<u32>) {
        self.majors
            .entry(typing.typing_name.clone())
            .or_default()
            .push(major);
        self.typings.push(typing);
    }

    /// Register a stub package.
    pub fn add_not_needed(&mut self, pkg: NotNeededPackage) {
        self.not_needed.push(pkg);
    }

    #[must_use]
    pub fn typings(&self) -> &[TypingPackage] {
        &self.typings
    }

    #[must_use]
    pub fn not_needed(&self) -> &[NotNeededPackage] {
        &self.not_needed
    }

    /// Every package, typings first, in index order.
    #[must_use]
    pub fn all_packages(&self) -> Vec<AnyPackage> {
        self.typings
            .iter()
            .cloned()
            .map(AnyPackage::from)
            .chain(self.not_needed.iter().cloned().map(AnyPackage::from))
            .collect()
    }
}

impl PackageSet for PackageIndex {
    fn has_typing_for(&self, dependency: &PackageDependency) -> bool {
        self.majors
            .get(&mangle_scoped_package(&dependency.name))
            .is_some_and(|majors| {
                majors
                    .iter()
                    .any(|m| m.map_or(true, |m| dependency.major_version.accepts(m)))
            })
    }
}

fn typing_from_entry(entry: TypingEntry, options: &GenerateOptions) -> Result<TypingPackage, Error> {
    let sub_directory_path = entry
        .sub_directory_path
        .unwrap_or_else(|| entry.typing_name.clone());

    let mut typing = TypingPackage {
        full_npm_name: full_npm_name(&entry.typing_name),
        output_directory: options.output_path.join(&entry.typing_name),
        library_name: entry.library_name,
        source_repo_url: entry
            .source_repo_url
            .unwrap_or_else(|| DEFAULT_SOURCE_REPO_URL.to_string()),
        dependencies: entry.dependencies,
        files: entry.files,
        contributors: entry.contributors,
        content_hash: String::new(),
        typescript_version: entry
            .typescript_version
            .unwrap_or_else(|| DEFAULT_TYPESCRIPT_VERSION.to_string()),
        sub_directory_path,
        globals: entry.globals,
        project_name: entry.project_name,
        has_package_json: entry.has_package_json,
        typing_name: entry.typing_name,
    };

    typing.content_hash = match entry.content_hash {
        Some(hash) => hash,
        None => {
            let paths: Vec<_> = typing
                .files
                .iter()
                .map(|f| (f.as_str(), typing.file_path(f, options)))
                .collect();
            blake3_named_files(paths.iter().map(|(f, p)| (*f, p.as_path()))).map_err(|source| {
                Error::InputRead {
                    what: "declaration files",
                    path: typing.source_directory(options),
                    source,
                }
            })?
        }
    };

    Ok(typing)
}

fn not_needed_from_entry(entry: NotNeededEntry, options: &GenerateOptions) -> NotNeededPackage {
    let full_npm_name = full_npm_name(&entry.typing_name);
    let readme = entry.readme.unwrap_or_else(|| {
        NotNeededPackage::stub_readme(&entry.library_name, &entry.source_repo_url, &full_npm_name)
    });

    NotNeededPackage {
        real_package_name: entry
            .real_package_name
            .unwrap_or_else(|| entry.typing_name.clone()),
        output_directory: options.output_path.join(&entry.typing_name),
        library_name: entry.library_name,
        typing_name: entry.typing_name,
        full_npm_name,
        source_repo_url: entry.source_repo_url,
        readme,
    }
}
