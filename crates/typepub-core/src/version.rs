//! Tool version reporting.

use std::fmt::Write;

/// Version of the typepub crates.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// `typepub <version>`, with the git hash appended when the build recorded one.
#[must_use]
pub fn version_string() -> String {
    let mut s = format!("typepub {VERSION}");
    if let Some(hash) = option_env!("TYPEPUB_BUILD_GIT_HASH") {
        let _ = write!(s, " ({hash})");
    }
    s
}
