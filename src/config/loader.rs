//! Configuration File Loading
//!
//! Finds the first existing `config.toml` on the search path and parses
//! it into a [`SessionConfig`]. Missing files mean defaults.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use super::SessionConfig;
use crate::error::{Error, Result};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "SHELLBRIDGE_CONFIG";
/// Environment variable overriding the configured shell
pub const SHELL_ENV: &str = "SHELLBRIDGE_SHELL";

const APP_DIR: &str = "shellbridge";
const FILE_NAME: &str = "config.toml";

/// Configuration file loader
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Candidate files, in priority order
    search_paths: Vec<PathBuf>,
    /// File the last successful load came from
    current_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Loader over the default search path
    pub fn new() -> Self {
        Self::with_search_paths(Self::default_search_paths())
    }

    pub fn with_search_paths(search_paths: Vec<PathBuf>) -> Self {
        Self {
            search_paths,
            current_path: None,
        }
    }

    /// Load from the first existing file, then apply environment overrides.
    ///
    /// Returns defaults when no file exists.
    pub fn load(&mut self) -> Result<SessionConfig> {
        let mut config = match self.find_config_file() {
            Some(path) => {
                let config = Self::load_file(&path)?;
                debug!("Loaded configuration from {}", path.display());
                self.current_path = Some(path);
                config
            }
            None => {
                debug!("No configuration file found, using defaults");
                SessionConfig::default()
            }
        };

        apply_shell_override(&mut config, env::var_os(SHELL_ENV));
        config.validate()?;
        Ok(config)
    }

    /// Like [`ConfigLoader::load`], but logs and falls back to defaults on error
    pub fn load_or_default(&mut self) -> SessionConfig {
        match self.load() {
            Ok(config) => config,
            Err(e) => {
                warn!("Falling back to default configuration: {}", e);
                let mut config = SessionConfig::default();
                apply_shell_override(&mut config, env::var_os(SHELL_ENV));
                config
            }
        }
    }

    /// Parse and validate a single configuration file
    pub fn load_file(path: &Path) -> Result<SessionConfig> {
        let content = fs::read_to_string(path).map_err(|e| Error::ConfigLoadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: SessionConfig =
            toml::from_str(&content).map_err(|e| Error::ConfigParseFailed {
                format: "TOML".to_string(),
                reason: e.to_string(),
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Write a configuration as TOML, creating parent directories
    pub fn save(config: &SessionConfig, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(config).map_err(|e| Error::ConfigParseFailed {
            format: "TOML".to_string(),
            reason: e.to_string(),
        })?;

        fs::write(path, content)?;
        Ok(())
    }

    fn find_config_file(&self) -> Option<PathBuf> {
        self.search_paths.iter().find(|p| p.is_file()).cloned()
    }

    /// `$SHELLBRIDGE_CONFIG`, then the platform config dir, then `~/.shellbridge`
    fn default_search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Some(explicit) = env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
            paths.push(PathBuf::from(explicit));
        }

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join(APP_DIR).join(FILE_NAME));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(format!(".{}", APP_DIR)).join(FILE_NAME));
        }

        paths
    }

    /// File the last successful load came from
    pub fn current_path(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Add a lower-priority search path
    pub fn add_search_path(&mut self, path: PathBuf) {
        self.search_paths.push(path);
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn apply_shell_override(config: &mut SessionConfig, shell: Option<OsString>) {
    if let Some(shell) = shell.filter(|s| !s.is_empty()) {
        debug!("Shell overridden from {}: {:?}", SHELL_ENV, shell);
        config.shell = PathBuf::from(shell);
    }
}
