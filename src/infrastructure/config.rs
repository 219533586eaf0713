use crate::domain::{config::ProbeConfig, error::{ProbeError, ProbeResult}};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_DIR: &str = "mtdprobe";
const PROJECT_DIR: &str = ".mtdprobe";
const CONFIG_FILE: &str = "config.toml";

/// Configuration manager
///
/// Exactly one file is used: the project file if one is found walking up
/// from the working directory, otherwise the global file. Missing files
/// fall back to the built-in defaults.
pub struct ConfigManager {
    global_config_path: Option<PathBuf>,
    project_config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Create new configuration manager
    pub fn new() -> Self {
        Self {
            global_config_path: Self::get_global_config_path(),
            project_config_path: Self::find_project_config_path(),
        }
    }

    /// The configuration file in effect: the project file if present,
    /// otherwise the global one. `None` when neither exists.
    pub fn active_config_path(&self) -> Option<&PathBuf> {
        [self.project_config_path.as_ref(), self.global_config_path.as_ref()]
            .into_iter()
            .flatten()
            .find(|path| path.exists())
    }

    /// Load configuration from specific path
    pub fn load_config_from_path(&self, path: &Path) -> ProbeResult<ProbeConfig> {
        let content = fs::read_to_string(path).map_err(|e| ProbeError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: ProbeConfig = toml::from_str(&content).map_err(|e| ProbeError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to specific path
    pub fn save_config_to_path(&self, path: &Path, config: &ProbeConfig) -> ProbeResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ProbeError::Config {
                message: format!("Failed to create config directory {}: {}", parent.display(), e),
            })?;
        }

        let content = toml::to_string_pretty(config).map_err(|e| ProbeError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        fs::write(path, content).map_err(|e| ProbeError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })
    }

    /// Write a default configuration to `path`. Refuses to overwrite.
    pub fn init_config(&self, path: &Path) -> ProbeResult<()> {
        if path.exists() {
            return Err(ProbeError::Config {
                message: format!("Configuration already exists at {}", path.display()),
            });
        }

        self.save_config_to_path(path, &ProbeConfig::default())
    }

    /// Default location of a project configuration under `dir`
    pub fn project_config_path_in(dir: &Path) -> PathBuf {
        dir.join(PROJECT_DIR).join(CONFIG_FILE)
    }

    /// Get the global config path (if the home directory is known)
    pub fn get_global_config_path_ref(&self) -> Option<&PathBuf> {
        self.global_config_path.as_ref()
    }

    fn get_global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config").join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Find project configuration path by walking up directory tree
    fn find_project_config_path() -> Option<PathBuf> {
        let current_dir = std::env::current_dir().ok()?;
        let mut path = current_dir.as_path();

        loop {
            let config_path = Self::project_config_path_in(path);
            if config_path.exists() {
                return Some(config_path);
            }

            path = path.parent()?;
        }
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
