//! Content digests for declaration files.

use std::fs::File;
use std::io;
use std::path::Path;

/// Hex BLAKE3 digest of a file's bytes.
///
/// # Errors
/// Returns an error if the file cannot be opened or read.
pub fn blake3_file(path: &Path) -> io::Result<String> {
    let mut hasher = blake3::Hasher::new();
    hasher.update_reader(File::open(path)?)?;
    Ok(hasher.finalize().to_hex().to_string())
}

/// Hash a set of named files into a single digest.
///
/// Each entry contributes its name and the digest of its content, in the
/// order given, so renaming or reordering files changes the result.
///
/// # Errors
/// Returns an error if any file cannot be read.
pub fn blake3_named_files<'a, I>(files: I) -> io::Result<String>
where
    I: IntoIterator<Item = (&'a str, &'a Path)>,
{
    let mut hasher = blake3::Hasher::new();

    for (name, path) in files {
        hasher.update(name.as_bytes());
        hasher.update(b"\0");
        hasher.update(blake3_file(path)?.as_bytes());
        hasher.update(b"\n");
    }

    Ok(hasher.finalize().to_hex().to_string())
}
