use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info, warn};

use crate::system::{FileSystemInterface, StandardFileSystem};

use super::types::Config;

/// Reads, validates and writes the TOML configuration through a
/// [`FileSystemInterface`], so tests can run against an in-memory file system
pub struct ConfigLoader<F: FileSystemInterface> {
    file_system: F,
    config_path: PathBuf,
}

impl<F: FileSystemInterface> ConfigLoader<F> {
    pub fn new(file_system: F, config_path: PathBuf) -> Self {
        Self {
            file_system,
            config_path,
        }
    }

    /// Load and validate the configuration. A missing file yields the
    /// defaults, which are written out when possible.
    pub fn load_config(&self) -> Result<Config> {
        let path = self.config_path.display();
        debug!("Loading configuration from {}", path);

        if !self.config_exists() {
            info!("No configuration at {}, using defaults", path);
            let config = Config::default();
            self.write_defaults(&config);
            return Ok(config);
        }

        let content = self
            .file_system
            .read_config_file(&self.config_path)
            .with_context(|| format!("Failed to read configuration file: {}", path))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration file: {}", path))?;
        config
            .validate()
            .with_context(|| format!("Invalid configuration in {}", path))?;

        Ok(config)
    }

    /// Write `config` to the configured path, creating its directory first
    pub fn save_config(&self, config: &Config) -> Result<()> {
        if let Some(dir) = self.config_path.parent() {
            self.file_system
                .create_config_dir(dir)
                .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
        }

        let content = toml::to_string_pretty(config).context("Failed to serialize configuration")?;
        self.file_system
            .write_config_file(&self.config_path, &content)
            .with_context(|| {
                format!(
                    "Failed to write configuration file: {}",
                    self.config_path.display()
                )
            })?;

        info!("Configuration written to {}", self.config_path.display());
        Ok(())
    }

    fn write_defaults(&self, config: &Config) {
        if let Err(e) = self.save_config(config) {
            warn!("Default configuration not saved: {:#}", e);
        }
    }

    /// Re-read the file after SIGHUP or a detected change
    pub fn reload_config(&self) -> Result<Config> {
        debug!("Reloading configuration");
        self.load_config()
    }

    /// Whether the file changed after `last_modified`. A missing file never
    /// counts as changed.
    pub fn is_config_modified(&self, last_modified: SystemTime) -> Result<bool> {
        if !self.config_exists() {
            return Ok(false);
        }
        let modified = self
            .file_system
            .get_config_modified_time(&self.config_path)?;
        Ok(modified > last_modified)
    }

    pub fn config_modified_time(&self) -> Option<SystemTime> {
        self.file_system
            .get_config_modified_time(&self.config_path)
            .ok()
    }

    pub fn get_config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn config_exists(&self) -> bool {
        self.file_system.config_file_exists(&self.config_path)
    }
}

impl ConfigLoader<StandardFileSystem> {
    pub fn new_production(config_path: PathBuf) -> Self {
        Self::new(StandardFileSystem, config_path)
    }

    /// Loader for `~/.config/audio-status-menu/config.toml`
    pub fn new_with_default_path() -> Result<Self> {
        Ok(Self::new_production(Self::default_config_path()?))
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let home_dir = dirs::home_dir().context("Failed to get home directory")?;
        Ok(home_dir.join(".config/audio-status-menu/config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::MockFileSystem;

    fn loader(file_system: &MockFileSystem) -> ConfigLoader<MockFileSystem> {
        ConfigLoader::new(file_system.clone(), PathBuf::from("/test/config.toml"))
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let mock_fs = MockFileSystem::new();
        loader(&mock_fs).save_config(&Config::default()).unwrap();

        assert_eq!(
            mock_fs.get_directory_creation_calls(),
            vec![PathBuf::from("/test")]
        );
        assert_eq!(mock_fs.get_write_calls()[0].0, PathBuf::from("/test/config.toml"));
    }

    #[test]
    fn test_defaults_used_when_directory_cannot_be_created() {
        let mock_fs = MockFileSystem::new();
        mock_fs.set_create_dir_failure(true);

        let config = loader(&mock_fs).load_config().unwrap();

        assert_eq!(config, Config::default());
        assert!(mock_fs.get_write_calls().is_empty());
    }

    #[test]
    fn test_touch_marks_config_modified() {
        let mock_fs = MockFileSystem::new();
        mock_fs.add_file("/test/config.toml", String::new());
        let loader = loader(&mock_fs);

        let loaded_at = loader.config_modified_time().unwrap();
        assert!(!loader.is_config_modified(loaded_at).unwrap());

        mock_fs.touch("/test/config.toml");
        assert!(loader.is_config_modified(loaded_at).unwrap());
    }
}
