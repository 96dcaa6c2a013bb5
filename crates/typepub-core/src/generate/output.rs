//! Output directory staging.
//!
//! Every generation starts by resetting the package's output directory, so
//! nothing from a previous run survives into the published tree. Files are
//! then written as concurrent task groups that fail on the first error.

use super::error::GenError;
use super::license::License;
use super::log::GenerateLog;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;
use typepub_util::fs::{atomic_write, empty_dir};

/// Manifest filename inside a package.
pub const PACKAGE_JSON: &str = "package.json";
/// README filename inside a package.
pub const README_MD: &str = "README.md";
/// License filename inside a package.
pub const LICENSE: &str = "LICENSE";

/// A group of concurrent output operations joined as one.
///
/// `join` returns the first error observed. Tasks still in flight at that
/// point are detached rather than aborted, so they may finish and leave
/// files behind; the next `clear_output_path` removes them.
pub struct TaskGroup {
    set: JoinSet<Result<(), GenError>>,
}

impl TaskGroup {
    #[must_use]
    pub fn new() -> Self {
        Self {
            set: JoinSet::new(),
        }
    }

    /// Start `task` on the runtime.
    pub fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = Result<(), GenError>> + Send + 'static,
    {
        self.set.spawn(task);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.set.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Wait for every task, or for the first failure.
    pub async fn join(mut self) -> Result<(), GenError> {
        while let Some(joined) = self.set.join_next().await {
            let result = joined.map_err(GenError::from).and_then(|r| r);
            if let Err(e) = result {
                self.set.detach_all();
                return Err(e);
            }
        }
        Ok(())
    }
}

impl Default for TaskGroup {
    fn default() -> Self {
        Self::new()
    }
}

/// Create `dir` if needed, then remove everything inside it.
pub async fn clear_output_path(dir: &Path, log: &mut GenerateLog) -> Result<(), GenError> {
    log.push(format!("Create output path {}", dir.display()));
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| GenError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;

    log.push("Clear out old files");
    let target = dir.to_path_buf();
    tokio::task::spawn_blocking(move || empty_dir(&target))
        .await?
        .map_err(|source| GenError::ClearDir {
            path: dir.to_path_buf(),
            source,
        })?;

    Ok(())
}

/// Resolve `filename` inside `dir`, creating intermediate directories when
/// the file does not sit directly in `dir`.
pub async fn output_file_path(dir: &Path, filename: &str) -> Result<PathBuf, GenError> {
    let full = dir.join(filename);

    if let Some(parent) = full.parent() {
        if parent != dir {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| GenError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
    }

    Ok(full)
}

/// Write `content` to `filename` inside `dir`.
pub async fn write_output_file(
    dir: PathBuf,
    filename: &'static str,
    content: Arc<str>,
) -> Result<(), GenError> {
    let path = output_file_path(&dir, filename).await?;
    let target = path.clone();
    tokio::task::spawn_blocking(move || atomic_write(&target, content.as_bytes()))
        .await?
        .map_err(|source| GenError::Write { path, source })
}

/// Reset `dir`, then write `package.json`, `README.md`, and `LICENSE` concurrently.
pub async fn write_common_outputs(
    dir: &Path,
    package_json: String,
    readme: String,
    license: &License,
    log: &mut GenerateLog,
) -> Result<(), GenError> {
    clear_output_path(dir, log).await?;

    let mut group = TaskGroup::new();
    for (filename, content) in [
        (PACKAGE_JSON, Arc::<str>::from(package_json)),
        (README_MD, Arc::<str>::from(readme)),
        (LICENSE, license.shared()),
    ] {
        group.spawn(write_output_file(dir.to_path_buf(), filename, content));
    }
    group.join().await
}

/// Copy each of `files` from `source_dir` to the same relative path in `dir`, concurrently.
pub async fn copy_files(
    source_dir: &Path,
    dir: &Path,
    files: &[String],
    log: &mut GenerateLog,
) -> Result<(), GenError> {
    let mut group = TaskGroup::new();

    for file in files {
        log.push(format!("Copy {file}"));
        let from = source_dir.join(file);
        let dir = dir.to_path_buf();
        let file = file.clone();
        group.spawn(async move {
            let to = output_file_path(&dir, &file).await?;
            tokio::fs::copy(&from, &to)
                .await
                .map_err(|source| GenError::Copy { from, to, source })?;
            Ok(())
        });
    }

    group.join().await
}
