use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default settings filename, looked up in the working directory.
pub const SETTINGS_FILE_NAME: &str = "typepub.json";

/// Branch of the source repository that README links point at.
pub const DEFAULT_SOURCE_BRANCH: &str = "master";

/// Runtime configuration for the typepub CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Current working directory.
    pub cwd: PathBuf,

    /// Whether to emit JSON logs.
    pub json_logs: bool,

    /// Verbosity level (0 = INFO, 1 = DEBUG, 2+ = TRACE).
    pub verbosity: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            json_logs: false,
            verbosity: 0,
        }
    }
}

impl Config {
    /// Create a new config with the given working directory.
    #[must_use]
    pub fn new(cwd: PathBuf) -> Self {
        Self {
            cwd,
            ..Default::default()
        }
    }

    /// Set verbosity level.
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set JSON log output.
    #[must_use]
    pub fn with_json_logs(mut self, json: bool) -> Self {
        self.json_logs = json;
        self
    }
}

/// Where typing sources live and where generated packages go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateOptions {
    /// Checkout of the declarations repository; sources live under `types/`.
    pub definitely_typed_path: PathBuf,
    /// Root under which each package gets its own output directory.
    pub output_path: PathBuf,
    /// Branch named in README source links.
    pub source_branch: String,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            definitely_typed_path: PathBuf::from("../DefinitelyTyped"),
            output_path: PathBuf::from("./output"),
            source_branch: DEFAULT_SOURCE_BRANCH.to_string(),
        }
    }
}

/// On-disk settings; every field is optional and falls back to the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    definitely_typed_path: Option<PathBuf>,
    output_path: Option<PathBuf>,
    source_branch: Option<String>,
}

impl GenerateOptions {
    /// Load options from a JSON settings file.
    ///
    /// Relative paths in the file are resolved against the file's directory.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let file: SettingsFile =
            serde_json::from_str(&content).map_err(|source| Error::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;

        let base = path.parent().unwrap_or(Path::new("."));
        let defaults = Self::default();
        Ok(Self {
            definitely_typed_path: base.join(
                file.definitely_typed_path
                    .unwrap_or(defaults.definitely_typed_path),
            ),
            output_path: base.join(file.output_path.unwrap_or(defaults.output_path)),
            source_branch: file.source_branch.unwrap_or(defaults.source_branch),
        })
    }

    /// Load `typepub.json` from `cwd` if present, otherwise use defaults
    /// resolved against `cwd`.
    pub fn discover(cwd: &Path) -> Result<Self, Error> {
        let path = cwd.join(SETTINGS_FILE_NAME);
        if path.exists() {
            return Self::load(&path);
        }

        let defaults = Self::default();
        Ok(Self {
            definitely_typed_path: cwd.join(defaults.definitely_typed_path),
            output_path: cwd.join(defaults.output_path),
            source_branch: defaults.source_branch,
        })
    }

    /// Set the declarations checkout path.
    #[must_use]
    pub fn with_definitely_typed_path(mut self, path: PathBuf) -> Self {
        self.definitely_typed_path = path;
        self
    }

    /// Set the output root.
    #[must_use]
    pub fn with_output_path(mut self, path: PathBuf) -> Self {
        self.output_path = path;
        self
    }

    /// Set the source branch.
    #[must_use]
    pub fn with_source_branch(mut self, branch: impl Into<String>) -> Self {
        self.source_branch = branch.into();
        self
    }
}
