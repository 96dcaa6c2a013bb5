//! Package generation.
//!
//! Turns a typing package (or a stub for a library with bundled types) into a
//! publishable directory:
//! - `package.json` with inferred `@types` dependencies
//! - `README.md` (stubs bring their own)
//! - `LICENSE`
//! - the declaration files, for typings packages

pub mod clock;
pub mod deps;
pub mod error;
pub mod license;
pub mod log;
pub mod manifest;
pub mod output;
pub mod readme;

pub use clock::{Clock, FixedClock, SystemClock};
pub use deps::{add_inferred_dependencies, dependency_semver, DependencyMap};
pub use error::{codes as gen_codes, GenError};
pub use license::License;
pub use log::GenerateLog;
pub use manifest::{create_not_needed_package_json, create_package_json};
pub use output::{clear_output_path, output_file_path, write_common_outputs, TaskGroup};
pub use readme::create_readme;

use crate::config::GenerateOptions;
use crate::typings::{
    AnyPackage, NotNeededPackage, PackageSet, TypingPackage, Version, VersionResolver,
};
use std::sync::Arc;

/// Generates packages to disk.
///
/// Holds what every generation in a process shares: options, the license
/// text, and the clock READMEs are stamped from.
#[derive(Clone)]
pub struct Generator {
    options: GenerateOptions,
    license: License,
    clock: Arc<dyn Clock>,
}

impl Generator {
    #[must_use]
    pub fn new(options: GenerateOptions, license: License) -> Self {
        Self {
            options,
            license,
            clock: Arc::new(SystemClock),
        }
    }

    /// Stamp READMEs from `clock` instead of the system time.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Generate either kind of package, returning the steps taken.
    pub async fn generate_any(
        &self,
        pkg: &AnyPackage,
        packages: &dyn PackageSet,
        versions: &dyn VersionResolver,
    ) -> Result<GenerateLog, GenError> {
        let version = resolve_version(pkg, versions)?;
        match pkg {
            AnyPackage::Typing(typing) => self.generate_typing(typing, &version, packages).await,
            AnyPackage::NotNeeded(stub) => self.generate_not_needed(stub, &version).await,
        }
    }

    async fn generate_typing(
        &self,
        typing: &TypingPackage,
        version: &Version,
        packages: &dyn PackageSet,
    ) -> Result<GenerateLog, GenError> {
        let mut log = GenerateLog::new();

        let package_json = create_package_json(typing, version, packages, &self.options).await?;
        let readme = create_readme(typing, &self.options, self.clock.as_ref());

        log.push("Write metadata files to disk");
        write_common_outputs(
            &typing.output_directory,
            package_json,
            readme,
            &self.license,
            &mut log,
        )
        .await?;

        output::copy_files(
            &typing.source_directory(&self.options),
            &typing.output_directory,
            &typing.files,
            &mut log,
        )
        .await?;

        Ok(log)
    }

    async fn generate_not_needed(
        &self,
        pkg: &NotNeededPackage,
        version: &Version,
    ) -> Result<GenerateLog, GenError> {
        let mut log = GenerateLog::new();

        let package_json = create_not_needed_package_json(pkg, version)?;

        log.push("Write metadata files to disk");
        write_common_outputs(
            &pkg.output_directory,
            package_json,
            pkg.readme.clone(),
            &self.license,
            &mut log,
        )
        .await?;

        Ok(log)
    }
}

fn resolve_version(pkg: &AnyPackage, versions: &dyn VersionResolver) -> Result<Version, GenError> {
    versions
        .get_version(pkg)
        .ok_or_else(|| GenError::VersionNotFound {
            name: pkg.full_npm_name().to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typings::{Contributor, DependencyVersion, PackageDependency, PackageIndex, VersionTable};
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Value};
    use std::fs;
    use std::path::Path;
    use tempfile::{tempdir, TempDir};
    use typepub_util::fs::relative_files;

    const LICENSE_TEXT: &str = "This project is licensed under the MIT license.\n";

    struct Fixture {
        root: TempDir,
        generator: Generator,
    }

    impl Fixture {
        fn new() -> Self {
            let root = tempdir().unwrap();
            let options = GenerateOptions::default()
                .with_definitely_typed_path(root.path().join("dt"))
                .with_output_path(root.path().join("output"));
            let generator = Generator::new(options, License::from_text(LICENSE_TEXT))
                .with_clock(FixedClock(Utc.with_ymd_and_hms(2017, 3, 1, 0, 0, 5).unwrap()));
            Self { root, generator }
        }

        fn source(&self, typing: &str, file: &str, content: &str) {
            let path = self.root.path().join("dt/types").join(typing).join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }

        fn output(&self, typing: &str) -> std::path::PathBuf {
            self.root.path().join("output").join(typing)
        }

        fn typing(&self, name: &str, files: &[&str]) -> TypingPackage {
            TypingPackage {
                library_name: name.into(),
                typing_name: name.into(),
                full_npm_name: format!("@types/{name}"),
                source_repo_url: "https://github.com/DefinitelyTyped/DefinitelyTyped".into(),
                dependencies: vec![],
                files: files.iter().map(|f| (*f).to_string()).collect(),
                contributors: vec![Contributor {
                    name: "Brian Zengel".into(),
                    url: "https://github.com/bczengel".into(),
                }],
                content_hash: "c0ffee".into(),
                typescript_version: "2.0".into(),
                output_directory: self.output(name),
                sub_directory_path: name.into(),
                globals: vec![],
                project_name: None,
                has_package_json: false,
            }
        }
    }

    fn versions(entries: &[(&str, Version)]) -> VersionTable {
        let mut table = VersionTable::new();
        for (name, version) in entries {
            table.insert(*name, version.clone());
        }
        table
    }

    fn read_json(path: &Path) -> Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_generate_lodash() {
        let fx = Fixture::new();
        fx.source("lodash", "index.d.ts", "declare const _: any;");
        let pkg = AnyPackage::from(fx.typing("lodash", &["index.d.ts"]));
        let table = versions(&[("@types/lodash", Version::new(4, 1, 0))]);

        let log = fx
            .generator
            .generate_any(&pkg, &PackageIndex::new(), &table)
            .await
            .unwrap();

        let out = fx.output("lodash");
        assert_eq!(
            relative_files(&out).unwrap(),
            vec!["LICENSE", "README.md", "index.d.ts", "package.json"]
        );
        let manifest = read_json(&out.join("package.json"));
        assert_eq!(manifest["name"], "@types/lodash");
        assert_eq!(manifest["version"], "4.1.0");
        assert_eq!(manifest["dependencies"], json!({}));
        assert_eq!(manifest["peerDependencies"], json!({}));
        assert_eq!(fs::read_to_string(out.join("LICENSE")).unwrap(), LICENSE_TEXT);
        assert_eq!(
            fs::read_to_string(out.join("index.d.ts")).unwrap(),
            "declare const _: any;"
        );
        assert!(fs::read_to_string(out.join("README.md"))
            .unwrap()
            .contains(" * Last updated: Wed, 01 Mar 2017 00:00:05 GMT\r\n"));

        assert_eq!(
            log.lines(),
            [
                "Write metadata files to disk".to_string(),
                format!("Create output path {}", out.display()),
                "Clear out old files".to_string(),
                "Copy index.d.ts".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_regeneration_drops_removed_files() {
        let fx = Fixture::new();
        fx.source("node", "index.d.ts", "");
        fx.source("node", "inspector.d.ts", "");
        let table = versions(&[("@types/node", Version::new(7, 0, 12))]);
        let packages = PackageIndex::new();

        let before = AnyPackage::from(fx.typing("node", &["index.d.ts", "inspector.d.ts"]));
        fx.generator.generate_any(&before, &packages, &table).await.unwrap();
        let after = AnyPackage::from(fx.typing("node", &["index.d.ts"]));
        fx.generator.generate_any(&after, &packages, &table).await.unwrap();

        assert_eq!(
            relative_files(&fx.output("node")).unwrap(),
            vec!["LICENSE", "README.md", "index.d.ts", "package.json"]
        );
    }

    #[tokio::test]
    async fn test_inferred_dependencies_reach_the_manifest() {
        let fx = Fixture::new();
        fx.source("react-dom", "index.d.ts", "");
        let mut typing = fx.typing("react-dom", &["index.d.ts"]);
        typing.dependencies = vec![
            PackageDependency::new("react", DependencyVersion::Major(16)),
            PackageDependency::new("scheduler", DependencyVersion::Any),
        ];
        let mut packages = PackageIndex::new();
        packages.add_typing(fx.typing("react", &[]), Some(16));
        let table = versions(&[("@types/react-dom", Version::new(16, 0, 3))]);

        fx.generator
            .generate_any(&typing.into(), &packages, &table)
            .await
            .unwrap();

        let manifest = read_json(&fx.output("react-dom").join("package.json"));
        assert_eq!(manifest["dependencies"], json!({ "@types/react": "^16" }));
    }

    #[tokio::test]
    async fn test_missing_declaration_file_fails_generation() {
        let fx = Fixture::new();
        fx.source("jquery", "index.d.ts", "");
        let pkg = AnyPackage::from(fx.typing("jquery", &["index.d.ts", "legacy.d.ts"]));
        let table = versions(&[("@types/jquery", Version::new(2, 0, 41))]);

        let err = fx
            .generator
            .generate_any(&pkg, &PackageIndex::new(), &table)
            .await
            .unwrap_err();

        assert_eq!(err.code(), gen_codes::FILE_COPY_FAILED);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_write_failure_reaches_the_caller() {
        use std::os::unix::fs::PermissionsExt;

        let fx = Fixture::new();
        fx.source("lodash", "index.d.ts", "");
        let out = fx.output("lodash");
        fs::create_dir_all(&out).unwrap();
        fs::set_permissions(&out, fs::Permissions::from_mode(0o555)).unwrap();

        // Permission bits do not bind privileged users
        if fs::write(out.join(".writable"), "").is_ok() {
            fs::set_permissions(&out, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let pkg = AnyPackage::from(fx.typing("lodash", &["index.d.ts"]));
        let table = versions(&[("@types/lodash", Version::new(4, 1, 0))]);
        let result = fx
            .generator
            .generate_any(&pkg, &PackageIndex::new(), &table)
            .await;
        fs::set_permissions(&out, fs::Permissions::from_mode(0o755)).unwrap();

        let err = result.unwrap_err();
        assert_eq!(err.code(), gen_codes::OUTPUT_WRITE_FAILED);
        assert!(matches!(err, GenError::Write { .. }));
    }

    #[tokio::test]
    async fn test_missing_version_fails_before_touching_disk() {
        let fx = Fixture::new();
        let pkg = AnyPackage::from(fx.typing("lodash", &["index.d.ts"]));

        let err = fx
            .generator
            .generate_any(&pkg, &PackageIndex::new(), &VersionTable::new())
            .await
            .unwrap_err();

        assert!(matches!(err, GenError::VersionNotFound { ref name } if name == "@types/lodash"));
        assert!(!fx.output("lodash").exists());
    }

    #[tokio::test]
    async fn test_generate_not_needed() {
        let fx = Fixture::new();
        let out = fx.output("moment");
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join("index.d.ts"), "left over from the typed era").unwrap();
        let stub = NotNeededPackage {
            library_name: "Moment".into(),
            typing_name: "moment".into(),
            full_npm_name: "@types/moment".into(),
            real_package_name: "moment".into(),
            source_repo_url: "https://github.com/moment/moment".into(),
            readme: "Moment provides its own type definitions.".into(),
            output_directory: out.clone(),
        };
        let table = versions(&[("@types/moment", Version::new(2, 13, 0))]);

        let log = fx
            .generator
            .generate_any(&stub.into(), &PackageIndex::new(), &table)
            .await
            .unwrap();

        assert_eq!(
            relative_files(&out).unwrap(),
            vec!["LICENSE", "README.md", "package.json"]
        );
        let manifest = read_json(&out.join("package.json"));
        assert!(manifest["typings"].is_null());
        assert_eq!(manifest["dependencies"], json!({ "moment": "*" }));
        assert_eq!(
            fs::read_to_string(out.join("README.md")).unwrap(),
            "Moment provides its own type definitions."
        );
        assert_eq!(log.lines().len(), 3);
        assert_eq!(log.lines()[0], "Write metadata files to disk");
    }
}
