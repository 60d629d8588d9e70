//! Configuration schema (schemagen.toml)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Output dialect of the generated query builder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    /// TypeScript, extensionless imports
    Ts,

    /// TypeScript `.mts` modules
    Mts,

    /// ES modules plus declaration files
    Esm,

    /// CommonJS plus declaration files
    Cjs,

    /// TypeScript for Deno, explicit `.ts` imports
    Deno,
}

impl Target {
    pub const ALL: [Target; 5] = [Target::Ts, Target::Mts, Target::Esm, Target::Cjs, Target::Deno];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ts => "ts",
            Self::Mts => "mts",
            Self::Esm => "esm",
            Self::Cjs => "cjs",
            Self::Deno => "deno",
        }
    }
}

impl Default for Target {
    fn default() -> Self {
        Self::Ts
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Target {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                ConfigError::ParseError(format!(
                    "Unknown target '{}'. Supported: ts, mts, esm, cjs, deno",
                    s
                ))
            })
    }
}

/// Where the introspection connection comes from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// JSON schema snapshot to introspect instead of a live server
    #[serde(default)]
    pub snapshot: Option<PathBuf>,
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Output dialect
    #[serde(default)]
    pub target: Target,

    /// Directory the query builder is generated into
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Package name of the runtime library imported by generated code
    #[serde(default = "default_runtime_package")]
    pub runtime_package: String,

    /// Directory holding static support files (embedded set when absent)
    #[serde(default)]
    pub support_dir: Option<PathBuf>,

    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Project root path (for resolving relative paths)
    #[serde(skip)]
    pub project_root: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("dbschema/qb")
}

fn default_runtime_package() -> String {
    "edgedb".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target: Target::default(),
            output_dir: default_output_dir(),
            runtime_package: default_runtime_package(),
            support_dir: None,
            connection: ConnectionConfig::default(),
            project_root: std::env::current_dir().unwrap_or_default(),
        }
    }
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        let mut config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        // Set project root to parent of config file
        if let Some(parent) = path.parent() {
            config.project_root = parent.to_path_buf();
        }

        Ok(config)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Resolve a configured path against the project root
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}
