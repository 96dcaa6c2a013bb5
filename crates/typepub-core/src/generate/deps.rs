//! Inferred `@types` dependencies.
//!
//! A typing that depends on another library gets a dependency on that
//! library's typings package, unless the manifest already handles it.

use crate::typings::{DependencyVersion, PackageSet, TypingPackage};
use serde_json::{Map, Value};

/// A `dependencies` / `peerDependencies` section of a manifest.
pub type DependencyMap = Map<String, Value>;

/// Add inferred dependencies to `dependencies`, skipping any already
/// specified in either `dependencies` or `peer_dependencies`.
///
/// A dependency `foo` is already handled when either map has a key `foo` or
/// `@types/foo`. Dependencies without a typings package are skipped.
pub fn add_inferred_dependencies(
    dependencies: &mut DependencyMap,
    peer_dependencies: &DependencyMap,
    typing: &TypingPackage,
    packages: &dyn PackageSet,
) {
    for dependency in &typing.dependencies {
        let types_dependency = dependency.types_name();
        let handles = |deps: &DependencyMap| {
            deps.contains_key(&dependency.name) || deps.contains_key(&types_dependency)
        };

        if !handles(&*dependencies)
            && !handles(peer_dependencies)
            && packages.has_typing_for(dependency)
        {
            dependencies.insert(
                types_dependency,
                Value::String(dependency_semver(dependency.major_version)),
            );
        }
    }
}

/// Range written for an inferred dependency: `"*"` or `"^{major}"`.
#[must_use]
pub fn dependency_semver(version: DependencyVersion) -> String {
    version.semver_range()
}
