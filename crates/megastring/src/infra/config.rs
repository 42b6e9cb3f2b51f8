//! Configuration management utilities.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use dirs_next::config_dir;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static DEFAULT_CONFIG: &str = include_str!("../../assets/default-config.toml");
static DEFAULT_WORKSPACE_CONFIG_PATH: &str = ".megastring/config.toml";

pub const DEFAULT_SOURCES_FILE: &str = "LLM_MEGASTRING_SOURCES.txt";
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

const ENV_SOURCES: &str = "MEGASTRING_SOURCES";
const ENV_DEBOUNCE_MS: &str = "MEGASTRING_DEBOUNCE_MS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse TOML config {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value '{value}' for {var}")]
    InvalidEnv { var: &'static str, value: String },
    #[error("unable to determine working directory: {0}")]
    WorkingDir(#[source] io::Error),
}

/// Layered configuration loaded from defaults, user, workspace, and env.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub sources: Sources,
    #[serde(default)]
    pub watch: Watch,
    #[serde(default)]
    pub clipboard: ClipboardSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Sources {
    #[serde(default)]
    file: Option<PathBuf>,
}

impl Sources {
    /// Path-list file; relative paths resolve against the working directory.
    pub fn file(&self) -> PathBuf {
        self.file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCES_FILE))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Watch {
    #[serde(default)]
    debounce_ms: Option<u64>,
}

impl Watch {
    pub fn debounce_ms(&self) -> u64 {
        self.debounce_ms.unwrap_or(DEFAULT_DEBOUNCE_MS)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ClipboardSettings {
    #[serde(default)]
    command_fallback: Option<bool>,
}

impl ClipboardSettings {
    /// Whether to try `pbcopy`/`xclip`/`wl-copy` style commands when `arboard` fails.
    pub fn command_fallback(&self) -> bool {
        self.command_fallback.unwrap_or(true)
    }
}

/// Environment overrides for critical settings.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    sources: Option<String>,
    debounce_ms: Option<String>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            sources: env::var(ENV_SOURCES).ok(),
            debounce_ms: env::var(ENV_DEBOUNCE_MS).ok(),
        }
    }

    #[cfg(test)]
    fn for_tests(sources: Option<&str>, debounce_ms: Option<&str>) -> Self {
        Self {
            sources: sources.map(str::to_owned),
            debounce_ms: debounce_ms.map(str::to_owned),
        }
    }
}

impl Config {
    /// Load configuration from defaults, user/global config, workspace config, and env overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let env = EnvOverrides::from_env();
        let global = global_config_path();
        let workspace = workspace_config_path()?;
        Self::load_with_layers(global, workspace, env)
    }

    fn load_with_layers(
        global: Option<PathBuf>,
        workspace: Option<PathBuf>,
        env_overrides: EnvOverrides,
    ) -> Result<Self, ConfigError> {
        let mut layers: Vec<Config> = Vec::new();

        layers.push(Self::from_str(DEFAULT_CONFIG, "built-in defaults")?);

        if let Some(global_path) = global.filter(|path| path.exists()) {
            layers.push(Self::from_file(&global_path)?);
        }

        if let Some(workspace_path) = workspace.filter(|path| path.exists()) {
            layers.push(Self::from_file(&workspace_path)?);
        }

        let merged = layers.into_iter().reduce(Config::merge).unwrap_or_default();
        apply_env_overrides(merged, env_overrides)
    }

    /// Apply command-line flags on top of every other layer.
    pub fn with_overrides(mut self, sources: Option<PathBuf>, debounce_ms: Option<u64>) -> Self {
        if let Some(file) = sources {
            self.sources.file = Some(file);
        }
        if let Some(ms) = debounce_ms {
            self.watch.debounce_ms = Some(ms);
        }
        self
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_str(&data, &path.display().to_string())
    }

    fn from_str(contents: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            origin: origin.to_owned(),
            source,
        })
    }

    fn merge(self, other: Self) -> Self {
        Self {
            sources: Sources {
                file: other.sources.file.or(self.sources.file),
            },
            watch: Watch {
                debounce_ms: other.watch.debounce_ms.or(self.watch.debounce_ms),
            },
            clipboard: ClipboardSettings {
                command_fallback: other
                    .clipboard
                    .command_fallback
                    .or(self.clipboard.command_fallback),
            },
        }
    }
}

fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|base| base.join("megastring/config.toml"))
}

fn workspace_config_path() -> Result<Option<PathBuf>, ConfigError> {
    let cwd = env::current_dir().map_err(ConfigError::WorkingDir)?;
    let root = find_repo_root(&cwd).unwrap_or(cwd);
    Ok(Some(root.join(DEFAULT_WORKSPACE_CONFIG_PATH)))
}

fn find_repo_root(start: &Path) -> Option<PathBuf> {
    let mut current = start;
    loop {
        if current.join(".git").exists() {
            return Some(current.to_path_buf());
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

fn apply_env_overrides(mut config: Config, env: EnvOverrides) -> Result<Config, ConfigError> {
    if let Some(sources) = env.sources.filter(|value| !value.trim().is_empty()) {
        config.sources.file = Some(PathBuf::from(sources));
    }
    if let Some(raw) = env.debounce_ms {
        let ms = raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidEnv {
                var: ENV_DEBOUNCE_MS,
                value: raw.clone(),
            })?;
        config.watch.debounce_ms = Some(ms);
    }
    Ok(config)
}
