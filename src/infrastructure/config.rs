use crate::domain::config::FocusConfig;
use crate::domain::error::{FocusError, FocusResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the configured auth secret
pub const AUTH_SECRET_ENV: &str = "FOCUSD_AUTH_SECRET";

/// Configuration manager
pub struct ConfigManager {
    global_config_path: PathBuf,
    project_config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Create new configuration manager
    pub fn new() -> FocusResult<Self> {
        let global_config_path = Self::get_global_config_path()?;
        let project_config_path = Self::find_project_config_path();

        Ok(Self {
            global_config_path,
            project_config_path,
        })
    }

    /// Load configuration. A project-local file supersedes the global one;
    /// missing keys fall back to defaults via serde. The auth secret can
    /// also come from the environment, which takes precedence over both.
    pub fn load_config(&self) -> FocusResult<FocusConfig> {
        let mut config = FocusConfig::default();

        if self.global_config_path.exists() {
            config = self.load_config_from_path(&self.global_config_path)?;
        }

        if let Some(project_path) = &self.project_config_path {
            if project_path.exists() {
                config = self.load_config_from_path(project_path)?;
            }
        }

        if let Ok(secret) = std::env::var(AUTH_SECRET_ENV) {
            if !secret.trim().is_empty() {
                config.auth.secret = secret;
            }
        }

        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_config_from_path(&self, path: &Path) -> FocusResult<FocusConfig> {
        let content = fs::read_to_string(path).map_err(|e| FocusError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        toml::from_str(&content).map_err(|e| FocusError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })
    }

    /// Save configuration to a specific path
    pub fn save_config_to_path(&self, path: &Path, config: &FocusConfig) -> FocusResult<()> {
        let content = toml::to_string_pretty(config).map_err(|e| FocusError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        fs::write(path, content).map_err(|e| FocusError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })
    }

    /// Write a default global configuration file
    pub fn init_global_config(&self) -> FocusResult<PathBuf> {
        if self.global_config_path.exists() {
            return Err(FocusError::Config {
                message: "Global configuration already exists".to_string(),
            });
        }
        if let Some(parent) = self.global_config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| FocusError::Config {
                message: format!("Failed to create config directory: {}", e),
            })?;
        }
        self.save_config_to_path(&self.global_config_path, &FocusConfig::default())?;
        Ok(self.global_config_path.clone())
    }

    /// Write a default project configuration under `path`
    pub fn init_project_config(&self, path: &Path) -> FocusResult<PathBuf> {
        let config_dir = path.join(".billow-focusd");
        let config_file = config_dir.join("config.toml");

        if config_file.exists() {
            return Err(FocusError::Config {
                message: "Project configuration already exists".to_string(),
            });
        }

        fs::create_dir_all(&config_dir).map_err(|e| FocusError::Config {
            message: format!("Failed to create .billow-focusd directory: {}", e),
        })?;

        self.save_config_to_path(&config_file, &FocusConfig::default())?;
        Ok(config_file)
    }

    /// Get global configuration path
    fn get_global_config_path() -> FocusResult<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| FocusError::Config {
            message: "Could not determine home directory".to_string(),
        })?;

        Ok(home.join(".config").join("billow-focusd").join("config.toml"))
    }

    /// Find project configuration path by walking up the directory tree
    fn find_project_config_path() -> Option<PathBuf> {
        let current_dir = std::env::current_dir().ok()?;
        let mut path = current_dir.as_path();

        loop {
            let config_path = path.join(".billow-focusd").join("config.toml");
            if config_path.exists() {
                return Some(config_path);
            }

            path = path.parent()?;
        }
    }

    /// Get the current project config path (if any)
    pub fn get_project_config_path(&self) -> Option<&PathBuf> {
        self.project_config_path.as_ref()
    }

    /// Get the global config path
    pub fn get_global_config_path_ref(&self) -> &PathBuf {
        &self.global_config_path
    }
}
