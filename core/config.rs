use crate::collect::CollectOptions;
use crate::error::{AppError, Result};
use crate::naming;
use crate::rules::ExclusionRules;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_CONFIG_FILENAME: &str = "codecollect.toml";
pub const DEFAULT_OUTPUT_FILE_NAME: &str = "all_code.txt";
pub const SOURCE_ENV_VAR: &str = "CODECOLLECT_SOURCE";

const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    ".git",
    "node_modules",
    ".pnpm-store",
    "dist",
    "build",
    "out",
    "logs",
    ".cache",
    ".tmp",
    "coverage",
    ".idea",
    ".vscode",
];

const DEFAULT_EXCLUDED_FILES: &[&str] = &[
    ".gitignore",
    "extract-codes.js",
    "tokens.json",
    "all_code.txt",
    ".DS_Store",
    "Thumbs.db",
];

const DEFAULT_EXCLUDED_EXTENSIONS: &[&str] = &[".log", ".swp", ".tsbuildinfo"];

const DEFAULT_NESTED_EXCLUSIONS: &[(&str, &str)] = &[("components", "ui")];

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub exclusions: ExclusionsConfig,
    #[serde(default)]
    pub walk: WalkConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    #[serde(default)]
    pub source_folder: Option<PathBuf>,
    #[serde(default)]
    pub output_folder_name: Option<String>,
    #[serde(default = "default_output_file_name")]
    pub output_file_name: String,
    /// Directory the output folder is created in. Defaults to the working
    /// directory; a compiled binary has no script folder to write next to.
    #[serde(default)]
    pub output_root: Option<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ExclusionsConfig {
    #[serde(default = "default_excluded_dirs")]
    pub dirs: Vec<String>,
    #[serde(default = "default_excluded_files")]
    pub files: Vec<String>,
    #[serde(default = "default_excluded_extensions")]
    pub extensions: Vec<String>,
    #[serde(default = "default_nested_exclusions")]
    pub nested: Vec<NestedPair>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct WalkConfig {
    #[serde(default)]
    pub entry_order: EntryOrder,
    #[serde(default)]
    pub follow_symlinks: bool,
    #[serde(default)]
    pub on_read_error: ReadErrorPolicy,
}

/// A `(parent, child)` directory pair. Written as `["parent", "child"]` in TOML
/// and as `parent/child` on the command line.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct NestedPair {
    pub parent: String,
    pub child: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EntryOrder {
    /// Entries sorted by file name within each directory.
    #[default]
    Name,
    /// Whatever order the directory listing returns.
    Native,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReadErrorPolicy {
    #[default]
    Abort,
    Skip,
}

/// Where the aggregate file goes, resolved once per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputTarget {
    pub folder_name: String,
    pub dir: PathBuf,
    pub file: PathBuf,
}

fn default_output_file_name() -> String {
    DEFAULT_OUTPUT_FILE_NAME.to_string()
}
fn default_excluded_dirs() -> Vec<String> {
    DEFAULT_EXCLUDED_DIRS.iter().map(|s| s.to_string()).collect()
}
fn default_excluded_files() -> Vec<String> {
    DEFAULT_EXCLUDED_FILES.iter().map(|s| s.to_string()).collect()
}
fn default_excluded_extensions() -> Vec<String> {
    DEFAULT_EXCLUDED_EXTENSIONS
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_nested_exclusions() -> Vec<NestedPair> {
    DEFAULT_NESTED_EXCLUSIONS
        .iter()
        .map(|(parent, child)| NestedPair::new(*parent, *child))
        .collect()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            source_folder: None,
            output_folder_name: None,
            output_file_name: default_output_file_name(),
            output_root: None,
        }
    }
}
impl Default for ExclusionsConfig {
    fn default() -> Self {
        Self {
            dirs: default_excluded_dirs(),
            files: default_excluded_files(),
            extensions: default_excluded_extensions(),
            nested: default_nested_exclusions(),
        }
    }
}
impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            entry_order: EntryOrder::default(),
            follow_symlinks: false,
            on_read_error: ReadErrorPolicy::default(),
        }
    }
}

impl NestedPair {
    pub fn new(parent: impl Into<String>, child: impl Into<String>) -> Self {
        Self {
            parent: parent.into(),
            child: child.into(),
        }
    }
}

impl From<(String, String)> for NestedPair {
    fn from((parent, child): (String, String)) -> Self {
        Self { parent, child }
    }
}

impl From<NestedPair> for (String, String) {
    fn from(pair: NestedPair) -> Self {
        (pair.parent, pair.child)
    }
}

impl fmt::Display for NestedPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.parent, self.child)
    }
}

impl FromStr for NestedPair {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().replace('\\', "/");
        let parts: Vec<&str> = normalized.split('/').filter(|p| !p.is_empty()).collect();
        match parts.as_slice() {
            [parent, child] => Ok(NestedPair::new(*parent, *child)),
            _ => Err(AppError::InvalidArgument(format!(
                "Nested exclusion '{}' must have the form PARENT/CHILD",
                s
            ))),
        }
    }
}

impl Config {
    pub fn resolve_config_path(
        base_dir: &Path,
        cli_config_file: Option<&String>,
        cli_disable_config: bool,
    ) -> Result<Option<PathBuf>> {
        if cli_disable_config {
            log::debug!("Config file loading disabled via CLI flag.");
            return Ok(None);
        }

        match cli_config_file {
            Some(p_str) => {
                let mut path = PathBuf::from(shellexpand::tilde(p_str).as_ref());
                if path.is_relative() {
                    path = base_dir.join(path);
                }
                if !path.exists() && path.extension().is_none() {
                    path.set_extension("toml");
                }
                if !path.exists() {
                    return Err(AppError::Config(format!(
                        "Specified config file not found at path: {}",
                        path.display()
                    )));
                }
                log::debug!("Using specified config file path: {}", path.display());
                Ok(Some(path))
            }
            None => {
                let default_path = base_dir.join(DEFAULT_CONFIG_FILENAME);
                if default_path.is_file() {
                    log::debug!("Using default config file path: {}", default_path.display());
                    Ok(Some(default_path))
                } else {
                    log::debug!(
                        "No config file specified and default not found at: {}",
                        default_path.display()
                    );
                    Ok(None)
                }
            }
        }
    }

    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        log::info!("Loading configuration from: {}", config_path.display());
        let toml_content = fs::read_to_string(config_path).map_err(|e| AppError::FileRead {
            path: config_path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&toml_content).map_err(|e| match e {
            AppError::TomlParse(msg) => AppError::TomlParse(format!(
                "Error parsing config file '{}': {}",
                config_path.display(),
                msg
            )),
            other => other,
        })
    }

    pub fn from_toml_str(toml_content: &str) -> Result<Self> {
        toml::from_str::<Config>(toml_content).map_err(|e| {
            AppError::TomlParse(format!("{}. Check TOML syntax and structure.", e))
        })
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Picks the source folder: an explicit override wins, then the config file.
    /// The path is tilde-expanded but not checked for existence.
    pub fn resolve_source_folder(&self, cli_source: Option<&Path>) -> Result<PathBuf> {
        let chosen = cli_source
            .map(Path::to_path_buf)
            .or_else(|| self.general.source_folder.clone())
            .ok_or_else(|| {
                AppError::InvalidArgument(format!(
                    "No source folder given. Pass it as an argument, set {} or `general.source_folder` in {}.",
                    SOURCE_ENV_VAR, DEFAULT_CONFIG_FILENAME
                ))
            })?;
        let expanded = shellexpand::tilde(&chosen.to_string_lossy()).into_owned();
        Ok(PathBuf::from(expanded))
    }

    pub fn resolve_output_target(&self, source: &Path) -> Result<OutputTarget> {
        if self.general.output_file_name.trim().is_empty() {
            return Err(AppError::Config(
                "`general.output_file_name` must not be empty".to_string(),
            ));
        }
        let folder_name = naming::resolve_output_folder_name(
            self.general.output_folder_name.as_deref(),
            &source.to_string_lossy(),
        );
        let root = match &self.general.output_root {
            Some(root) => PathBuf::from(shellexpand::tilde(&root.to_string_lossy()).as_ref()),
            None => env::current_dir()?,
        };
        let dir = root.join(&folder_name);
        let file = dir.join(&self.general.output_file_name);
        log::debug!(
            "Output target resolved: folder '{}', file {}",
            folder_name,
            file.display()
        );
        Ok(OutputTarget {
            folder_name,
            dir,
            file,
        })
    }

    pub fn exclusion_rules(&self) -> ExclusionRules {
        ExclusionRules::from_config(&self.exclusions)
    }

    pub fn collect_options(&self) -> CollectOptions {
        CollectOptions {
            entry_order: self.walk.entry_order,
            follow_symlinks: self.walk.follow_symlinks,
            on_read_error: self.walk.on_read_error,
            skip_path: None,
        }
    }
}
