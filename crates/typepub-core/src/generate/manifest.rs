//! `package.json` synthesis.
//!
//! Field order follows https://docs.npmjs.com/files/package.json and is fixed
//! by the declaration order of the structs below, so the same inputs always
//! serialize to the same bytes.

use super::deps::{add_inferred_dependencies, DependencyMap};
use super::error::GenError;
use crate::config::GenerateOptions;
use crate::typings::{Contributor, NotNeededPackage, PackageSet, TypingPackage, Version, WILDCARD};
use serde::Serialize;
use serde_json::Value;
use std::io;
use std::path::Path;

/// License every generated package is published under.
pub const LICENSE_ID: &str = "MIT";

/// Manifest of a typings package.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TypingManifest<'a> {
    name: &'a str,
    version: String,
    description: String,
    license: &'static str,
    contributors: &'a [Contributor],
    main: &'static str,
    repository: Repository,
    scripts: DependencyMap,
    dependencies: DependencyMap,
    peer_dependencies: DependencyMap,
    types_publisher_content_hash: &'a str,
    type_script_version: &'a str,
}

#[derive(Debug, Serialize)]
struct Repository {
    #[serde(rename = "type")]
    kind: &'static str,
    url: String,
}

/// Manifest of a stub package.
#[derive(Debug, Serialize)]
struct NotNeededManifest<'a> {
    name: &'a str,
    version: String,
    /// Always `null`: the declarations come from the dependency.
    typings: Option<&'a str>,
    description: String,
    main: &'static str,
    scripts: DependencyMap,
    author: &'static str,
    repository: &'a str,
    license: &'static str,
    dependencies: DependencyMap,
}

/// The `dependencies` / `peerDependencies` a typing's source tree declares.
#[derive(Debug, Default)]
pub struct PartialManifest {
    pub dependencies: DependencyMap,
    pub peer_dependencies: DependencyMap,
}

/// Read the partial `package.json` a typing may ship in its source directory.
///
/// Other fields of the partial manifest are ignored; missing sections are empty.
pub async fn read_partial_manifest(path: &Path) -> Result<PartialManifest, GenError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(GenError::PackageJsonNotFound {
                path: path.to_path_buf(),
            })
        }
        Err(source) => {
            return Err(GenError::PackageJsonRead {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let value: Value = serde_json::from_str(&content).map_err(|source| GenError::PackageJsonParse {
        path: path.to_path_buf(),
        source,
    })?;

    let Value::Object(mut root) = value else {
        return Err(GenError::invalid(path, "package.json must be a JSON object"));
    };

    Ok(PartialManifest {
        dependencies: take_section(&mut root, "dependencies", path)?,
        peer_dependencies: take_section(&mut root, "peerDependencies", path)?,
    })
}

fn take_section(
    root: &mut serde_json::Map<String, Value>,
    section: &str,
    path: &Path,
) -> Result<DependencyMap, GenError> {
    match root.remove(section) {
        None | Some(Value::Null) => Ok(DependencyMap::new()),
        Some(Value::Object(map)) => Ok(map),
        Some(_) => Err(GenError::invalid(
            path,
            format!("'{section}' must be an object"),
        )),
    }
}

/// Build the `package.json` text for a typings package.
///
/// When the typing has a partial manifest its dependency sections are the
/// starting point; inferred `@types` dependencies are added on top.
pub async fn create_package_json(
    typing: &TypingPackage,
    version: &Version,
    packages: &dyn PackageSet,
    options: &GenerateOptions,
) -> Result<String, GenError> {
    let PartialManifest {
        mut dependencies,
        peer_dependencies,
    } = if typing.has_package_json {
        read_partial_manifest(&typing.file_path("package.json", options)).await?
    } else {
        PartialManifest::default()
    };

    add_inferred_dependencies(&mut dependencies, &peer_dependencies, typing, packages);

    let manifest = TypingManifest {
        name: &typing.full_npm_name,
        version: version.version_string(),
        description: format!("TypeScript definitions for {}", typing.library_name),
        license: LICENSE_ID,
        contributors: &typing.contributors,
        main: "",
        repository: Repository {
            kind: "git",
            url: format!("{}.git", typing.source_repo_url),
        },
        scripts: DependencyMap::new(),
        dependencies,
        peer_dependencies,
        types_publisher_content_hash: &typing.content_hash,
        type_script_version: &typing.typescript_version,
    };

    to_json(&manifest)
}

/// Build the `package.json` text for a stub package.
pub fn create_not_needed_package_json(
    pkg: &NotNeededPackage,
    version: &Version,
) -> Result<String, GenError> {
    let mut dependencies = DependencyMap::new();
    dependencies.insert(
        pkg.real_package_name.clone(),
        Value::String(WILDCARD.to_string()),
    );

    let manifest = NotNeededManifest {
        name: &pkg.full_npm_name,
        version: version.version_string(),
        typings: None,
        description: format!(
            "Stub TypeScript definitions entry for {}, which provides its own types definitions",
            pkg.library_name
        ),
        main: "",
        scripts: DependencyMap::new(),
        author: "",
        repository: &pkg.source_repo_url,
        license: LICENSE_ID,
        dependencies,
    };

    to_json(&manifest)
}

/// Serialize with 4-space indentation.
fn to_json<T: Serialize>(value: &T) -> Result<String, GenError> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut ser).map_err(GenError::Serialize)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typings::{DependencyVersion, PackageDependency};
    use serde_json::json;
    use std::path::PathBuf;
    use tempfile::tempdir;

    struct AllKnown;

    impl PackageSet for AllKnown {
        fn has_typing_for(&self, _: &PackageDependency) -> bool {
            true
        }
    }

    fn lodash() -> TypingPackage {
        TypingPackage {
            library_name: "lodash".into(),
            typing_name: "lodash".into(),
            full_npm_name: "@types/lodash".into(),
            source_repo_url: "https://github.com/DefinitelyTyped/DefinitelyTyped".into(),
            dependencies: vec![],
            files: vec!["index.d.ts".into()],
            contributors: vec![Contributor {
                name: "Brian Zengel".into(),
                url: "https://github.com/bczengel".into(),
            }],
            content_hash: "0123abcd".into(),
            typescript_version: "2.0".into(),
            output_directory: PathBuf::from("out/lodash"),
            sub_directory_path: "lodash".into(),
            globals: vec!["_".into()],
            project_name: Some("http://lodash.com/".into()),
            has_package_json: false,
        }
    }

    fn keys(text: &str) -> Vec<String> {
        let value: Value = serde_json::from_str(text).unwrap();
        value.as_object().unwrap().keys().cloned().collect()
    }

    #[tokio::test]
    async fn test_lodash_manifest() {
        let options = GenerateOptions::default();
        let text = create_package_json(&lodash(), &Version::new(4, 1, 0), &AllKnown, &options)
            .await
            .unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["name"], "@types/lodash");
        assert_eq!(value["version"], "4.1.0");
        assert_eq!(value["description"], "TypeScript definitions for lodash");
        assert_eq!(value["license"], "MIT");
        assert_eq!(value["main"], "");
        assert_eq!(
            value["repository"],
            json!({ "type": "git", "url": "https://github.com/DefinitelyTyped/DefinitelyTyped.git" })
        );
        assert_eq!(value["scripts"], json!({}));
        assert_eq!(value["dependencies"], json!({}));
        assert_eq!(value["peerDependencies"], json!({}));
        assert_eq!(value["typesPublisherContentHash"], "0123abcd");
        assert_eq!(value["typeScriptVersion"], "2.0");
        assert_eq!(
            value["contributors"],
            json!([{ "name": "Brian Zengel", "url": "https://github.com/bczengel" }])
        );
    }

    #[tokio::test]
    async fn test_manifest_key_order_and_indent() {
        let options = GenerateOptions::default();
        let text = create_package_json(&lodash(), &Version::new(4, 1, 0), &AllKnown, &options)
            .await
            .unwrap();

        assert_eq!(
            keys(&text),
            vec![
                "name",
                "version",
                "description",
                "license",
                "contributors",
                "main",
                "repository",
                "scripts",
                "dependencies",
                "peerDependencies",
                "typesPublisherContentHash",
                "typeScriptVersion",
            ]
        );
        assert!(text.starts_with("{\n    \"name\": \"@types/lodash\",\n"));
    }

    #[tokio::test]
    async fn test_manifest_is_deterministic() {
        let options = GenerateOptions::default();
        let mut typing = lodash();
        typing.dependencies = vec![
            PackageDependency::new("react", DependencyVersion::Major(16)),
            PackageDependency::new("node", DependencyVersion::Any),
        ];

        let a = create_package_json(&typing, &Version::new(4, 1, 0), &AllKnown, &options)
            .await
            .unwrap();
        let b = create_package_json(&typing, &Version::new(4, 1, 0), &AllKnown, &options)
            .await
            .unwrap();

        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_merges_partial_manifest() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("types").join("lodash");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(
            src.join("package.json"),
            r#"{
                "private": true,
                "dependencies": { "react": "^16.0.0", "moment": ">=2.14.0" },
                "peerDependencies": { "@types/node": "*" }
            }"#,
        )
        .unwrap();
        let options =
            GenerateOptions::default().with_definitely_typed_path(dir.path().to_path_buf());
        let mut typing = lodash();
        typing.has_package_json = true;
        typing.dependencies = vec![
            PackageDependency::new("react", DependencyVersion::Major(16)),
            PackageDependency::new("node", DependencyVersion::Major(7)),
            PackageDependency::new("jquery", DependencyVersion::Major(3)),
        ];

        let text = create_package_json(&typing, &Version::new(4, 1, 0), &AllKnown, &options)
            .await
            .unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();

        assert_eq!(
            keys(&value["dependencies"].to_string()),
            vec!["react", "moment", "@types/jquery"]
        );
        assert_eq!(value["dependencies"]["@types/jquery"], "^3");
        assert!(value["dependencies"].get("@types/react").is_none());
        assert_eq!(value["peerDependencies"], json!({ "@types/node": "*" }));
        assert!(value.get("private").is_none());
    }

    #[tokio::test]
    async fn test_missing_partial_manifest_is_an_error() {
        let dir = tempdir().unwrap();
        let options =
            GenerateOptions::default().with_definitely_typed_path(dir.path().to_path_buf());
        let mut typing = lodash();
        typing.has_package_json = true;

        let err = create_package_json(&typing, &Version::new(4, 1, 0), &AllKnown, &options)
            .await
            .unwrap_err();

        assert!(matches!(err, GenError::PackageJsonNotFound { .. }));
    }

    #[tokio::test]
    async fn test_malformed_partial_manifest_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("package.json");

        std::fs::write(&path, "{ \"dependencies\": ").unwrap();
        let err = read_partial_manifest(&path).await.unwrap_err();
        assert!(matches!(err, GenError::PackageJsonParse { .. }));

        std::fs::write(&path, "[]").unwrap();
        let err = read_partial_manifest(&path).await.unwrap_err();
        assert!(matches!(err, GenError::PackageJsonInvalid { .. }));

        std::fs::write(&path, r#"{ "dependencies": ["react"] }"#).unwrap();
        let err = read_partial_manifest(&path).await.unwrap_err();
        assert!(matches!(err, GenError::PackageJsonInvalid { .. }));
    }

    #[test]
    fn test_not_needed_manifest() {
        let pkg = NotNeededPackage {
            library_name: "Moment".into(),
            typing_name: "moment".into(),
            full_npm_name: "@types/moment".into(),
            real_package_name: "moment".into(),
            source_repo_url: "https://github.com/moment/moment".into(),
            readme: "stub".into(),
            output_directory: PathBuf::from("out/moment"),
        };

        let text = create_not_needed_package_json(&pkg, &Version::new(2, 14, 0)).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();

        assert_eq!(
            keys(&text),
            vec![
                "name",
                "version",
                "typings",
                "description",
                "main",
                "scripts",
                "author",
                "repository",
                "license",
                "dependencies",
            ]
        );
        assert_eq!(value["name"], "@types/moment");
        assert_eq!(value["version"], "2.14.0");
        assert!(value["typings"].is_null());
        assert_eq!(
            value["description"],
            "Stub TypeScript definitions entry for Moment, which provides its own types definitions"
        );
        assert_eq!(value["author"], "");
        assert_eq!(value["repository"], "https://github.com/moment/moment");
        assert_eq!(value["dependencies"], json!({ "moment": "*" }));
    }
}
