use std::path::{Path, PathBuf};

/// Environment variable to override the installation root (for testing).
pub const ROOT_ENV: &str = "TYPEPUB_ROOT";

/// Name of the license file shipped with the tool and copied into every package.
pub const LICENSE_FILE_NAME: &str = "LICENSE";

/// Get the installation root of the tool.
///
/// Respects `TYPEPUB_ROOT`. Otherwise walks up from the running executable
/// until a directory containing `LICENSE` is found, falling back to the
/// workspace root this crate was built from.
#[must_use]
pub fn install_root() -> PathBuf {
    if let Ok(root) = std::env::var(ROOT_ENV) {
        return PathBuf::from(root);
    }

    if let Some(root) = std::env::current_exe()
        .ok()
        .and_then(|exe| find_license_dir(&exe))
    {
        return root;
    }

    // crates/typepub-core -> workspace root
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

/// Walk up from `start` looking for a directory that holds `LICENSE`.
#[must_use]
pub fn find_license_dir(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        if current.join(LICENSE_FILE_NAME).is_file() {
            return Some(current);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Path of the shared license file.
#[must_use]
pub fn license_path() -> PathBuf {
    install_root().join(LICENSE_FILE_NAME)
}
