//! README text for typings packages.

use super::clock::{format_utc, Clock};
use crate::config::GenerateOptions;
use crate::typings::TypingPackage;

/// Line terminator used in generated READMEs.
pub const README_NEWLINE: &str = "\r\n";

/// Prefix of the line carrying the generation timestamp.
///
/// Anything hashing generated output should drop or normalize this line.
pub const LAST_UPDATED_PREFIX: &str = " * Last updated: ";

/// Build the README for a typings package.
///
/// The "Last updated" line is stamped from `clock`, so two generations of an
/// unchanged package differ only in that line.
#[must_use]
pub fn create_readme(typing: &TypingPackage, options: &GenerateOptions, clock: &dyn Clock) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push("# Installation".into());
    lines.push(format!("> `npm install --save {}`", typing.full_npm_name));
    lines.push(String::new());

    lines.push("# Summary".into());
    match &typing.project_name {
        Some(project) => lines.push(format!(
            "This package contains type definitions for {} ({project}).",
            typing.library_name
        )),
        None => lines.push(format!(
            "This package contains type definitions for {}.",
            typing.library_name
        )),
    }
    lines.push(String::new());

    lines.push("# Details".into());
    lines.push(format!(
        "Files were exported from {}/tree/{}/types/{}",
        typing.source_repo_url, options.source_branch, typing.sub_directory_path
    ));
    lines.push(String::new());

    lines.push("Additional Details".into());
    lines.push(format!("{LAST_UPDATED_PREFIX}{}", format_utc(clock.now())));
    let dependencies: Vec<&str> = typing.dependencies.iter().map(|d| d.name.as_str()).collect();
    lines.push(format!(" * Dependencies: {}", join_or_none(&dependencies)));
    let globals: Vec<&str> = typing.globals.iter().map(String::as_str).collect();
    lines.push(format!(" * Global values: {}", join_or_none(&globals)));
    lines.push(String::new());

    lines.push("# Credits".into());
    let contributors = typing
        .contributors
        .iter()
        .map(|c| format!("{} <{}>", c.name, c.url))
        .collect::<Vec<_>>()
        .join(", ");
    lines.push(format!("These definitions were written by {contributors}."));
    lines.push(String::new());

    lines.join(README_NEWLINE)
}

fn join_or_none(items: &[&str]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

/// Drop the timestamp line so READMEs from different runs can be compared.
#[must_use]
pub fn strip_timestamp(readme: &str) -> String {
    readme
        .split(README_NEWLINE)
        .filter(|line| !line.starts_with(LAST_UPDATED_PREFIX))
        .collect::<Vec<_>>()
        .join(README_NEWLINE)
}
