//! `typepub generate` command implementation.

use futures::stream::{self, StreamExt};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use typepub_core::generate::{GenError, GenerateLog, Generator, License};
use typepub_core::typings::{AnyPackage, PackageIndex, VersionTable};
use typepub_core::{Config, GenerateOptions};
use typepub_util::fs::relative_files;

use crate::logging::TARGET;

/// Arguments of the generate command.
#[derive(Debug, Clone)]
pub struct GenerateArgs {
    pub index: PathBuf,
    pub versions: PathBuf,
    pub settings: Option<PathBuf>,
    pub definitely_typed: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub branch: Option<String>,
    pub jobs: usize,
    pub names: Vec<String>,
}

/// Generate report for JSON output.
#[derive(Serialize)]
struct GenerateReport {
    ok: bool,
    generated: usize,
    failed: usize,
    packages: Vec<PackageReport>,
}

/// One package in the JSON report.
#[derive(Serialize)]
struct PackageReport {
    name: String,
    ok: bool,
    not_needed: bool,
    output_dir: String,
    #[serde(skip_serializing_if = "GenerateLog::is_empty")]
    log: GenerateLog,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    files: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorInfo>,
}

#[derive(Serialize)]
struct ErrorInfo {
    code: &'static str,
    message: String,
}

/// Run the generate command.
pub fn run(config: &Config, args: GenerateArgs) -> Result<()> {
    let cwd = &config.cwd;
    let options = resolve_options(cwd, &args)?;
    info!(
        target: TARGET,
        dt = %options.definitely_typed_path.display(),
        output = %options.output_path.display(),
        "GENERATE command invoked"
    );

    let license = License::load_default().into_diagnostic()?;
    let index = PackageIndex::load(&absolutize(cwd, &args.index), &options).into_diagnostic()?;
    let versions = VersionTable::load(&absolutize(cwd, &args.versions)).into_diagnostic()?;
    let selected = select_packages(&index, &args.names)?;

    let generator = Generator::new(options, license);
    let runtime = tokio::runtime::Runtime::new().into_diagnostic()?;
    let results = runtime.block_on(generate_all(
        &generator,
        &selected,
        &index,
        &versions,
        args.jobs,
    ));

    let packages: Vec<PackageReport> = selected
        .iter()
        .zip(results)
        .map(|(pkg, result)| report(pkg, result))
        .collect();
    let failed = packages.iter().filter(|p| !p.ok).count();
    let report = GenerateReport {
        ok: failed == 0,
        generated: packages.len() - failed,
        failed,
        packages,
    };

    if config.json_logs {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).into_diagnostic()?
        );
    } else {
        print_summary(&report);
    }

    if !report.ok {
        std::process::exit(1);
    }
    Ok(())
}

/// Settings file (or defaults), then command-line overrides.
fn resolve_options(cwd: &Path, args: &GenerateArgs) -> Result<GenerateOptions> {
    let mut options = match &args.settings {
        Some(path) => GenerateOptions::load(&absolutize(cwd, path)),
        None => GenerateOptions::discover(cwd),
    }
    .into_diagnostic()?;

    if let Some(dt) = &args.definitely_typed {
        options = options.with_definitely_typed_path(absolutize(cwd, dt));
    }
    if let Some(output) = &args.output {
        options = options.with_output_path(absolutize(cwd, output));
    }
    if let Some(branch) = &args.branch {
        options = options.with_source_branch(branch.clone());
    }
    Ok(options)
}

fn absolutize(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

/// All packages, or the named ones in the order given, one per output directory.
fn select_packages(index: &PackageIndex, names: &[String]) -> Result<Vec<AnyPackage>> {
    let all = index.all_packages();
    if names.is_empty() {
        return dedupe_by_output(all);
    }

    let named = names
        .iter()
        .map(|name| {
            all.iter()
                .find(|pkg| pkg.typing_name() == name || pkg.full_npm_name() == name)
                .cloned()
                .ok_or_else(|| miette::miette!("Unknown package: {name}"))
        })
        .collect::<Result<Vec<_>>>()?;
    dedupe_by_output(named)
}

/// Generations sharing an output directory would clear each other's files.
///
/// Repeats of one package keep the first occurrence; two different packages
/// claiming the same directory are rejected.
fn dedupe_by_output(packages: Vec<AnyPackage>) -> Result<Vec<AnyPackage>> {
    let mut claimed: HashMap<PathBuf, String> = HashMap::new();
    let mut selected = Vec::with_capacity(packages.len());

    for pkg in packages {
        let label = describe(&pkg);
        match claimed.get(pkg.output_directory()) {
            Some(first) if *first == label => {}
            Some(first) => {
                return Err(miette::miette!(
                    "Output directory {} claimed by both {first} and {label}",
                    pkg.output_directory().display()
                ));
            }
            None => {
                claimed.insert(pkg.output_directory().to_path_buf(), label);
                selected.push(pkg);
            }
        }
    }

    Ok(selected)
}

fn describe(pkg: &AnyPackage) -> String {
    if pkg.is_not_needed() {
        format!("{} (not needed)", pkg.full_npm_name())
    } else {
        pkg.full_npm_name().to_string()
    }
}

/// Generate `packages` with at most `jobs` in flight; results keep input order.
async fn generate_all(
    generator: &Generator,
    packages: &[AnyPackage],
    index: &PackageIndex,
    versions: &VersionTable,
    jobs: usize,
) -> Vec<Result<GenerateLog, GenError>> {
    let mut results: Vec<(usize, Result<GenerateLog, GenError>)> =
        stream::iter(packages.iter().enumerate())
            .map(|(i, pkg)| async move {
                let result = generator.generate_any(pkg, index, versions).await;
                log_result(pkg, &result);
                (i, result)
            })
            .buffer_unordered(jobs.max(1))
            .collect()
            .await;

    results.sort_by_key(|(i, _)| *i);
    results.into_iter().map(|(_, r)| r).collect()
}

fn log_result(pkg: &AnyPackage, result: &Result<GenerateLog, GenError>) {
    let name = pkg.full_npm_name();
    match result {
        Ok(log) => {
            for line in log.lines() {
                debug!(target: TARGET, package = name, "{line}");
            }
            info!(target: TARGET, package = name, steps = log.lines().len(), "generated");
        }
        Err(e) => {
            error!(target: TARGET, package = name, code = e.code(), "{e}");
        }
    }
}

fn report(pkg: &AnyPackage, result: Result<GenerateLog, GenError>) -> PackageReport {
    let output_dir = pkg.output_directory();
    let (log, error) = match result {
        Ok(log) => (log, None),
        Err(e) => (
            GenerateLog::new(),
            Some(ErrorInfo {
                code: e.code(),
                message: e.to_string(),
            }),
        ),
    };
    let files = if error.is_none() {
        relative_files(output_dir).unwrap_or_else(|e| {
            warn!(
                target: TARGET,
                package = pkg.full_npm_name(),
                dir = %output_dir.display(),
                "could not list generated files: {e}"
            );
            Vec::new()
        })
    } else {
        Vec::new()
    };

    PackageReport {
        name: pkg.full_npm_name().to_string(),
        ok: error.is_none(),
        not_needed: pkg.is_not_needed(),
        output_dir: output_dir.display().to_string(),
        log,
        files,
        error,
    }
}

fn print_summary(report: &GenerateReport) {
    for pkg in &report.packages {
        match &pkg.error {
            None => println!("generated {} -> {}", pkg.name, pkg.output_dir),
            Some(e) => eprintln!("error: {}: {} ({})", pkg.name, e.message, e.code),
        }
    }
    println!(
        "{} generated, {} failed",
        report.generated, report.failed
    );
}
