//! Tracing setup for the `typepub` binary.
//!
//! Library crates never log; generation progress comes back as a
//! `GenerateLog` value and is replayed here as events under the
//! `typepub` target.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Target every CLI event is emitted under.
pub const TARGET: &str = "typepub";

/// `-v` count to the level applied to `typepub` events.
fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// `RUST_LOG` (default `warn`) for dependencies, plus our own target at `level`.
fn build_filter(level: LevelFilter) -> EnvFilter {
    let ours: Directive = format!("{TARGET}={level}")
        .parse()
        .unwrap_or_else(|_| Directive::from(level));
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"))
        .add_directive(ours)
}

/// Install the global subscriber. Everything goes to stderr so stdout
/// stays reserved for command output such as the `--json` report.
///
/// With `json`, each event is one flattened JSON object per line:
/// ```json
/// {"timestamp":"...","level":"INFO","target":"typepub","package":"@types/lodash","steps":4,"message":"generated"}
/// ```
pub fn init(verbosity: u8, json: bool) {
    let registry = tracing_subscriber::registry().with(build_filter(level_for(verbosity)));

    if json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}
