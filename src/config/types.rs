use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::audio::DeviceId;
use crate::status_bar::LayoutType;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub menu: MenuConfig,

    #[serde(default)]
    pub status_bar: StatusBarConfig,

    #[serde(default)]
    pub preferences: PreferencesConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,
    pub file_logging: bool,
    pub json_logs: bool,
    pub log_retention_days: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    /// Debounce delay of the deferred menu recompute
    pub update_delay_ms: u64,
    pub app_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusBarConfig {
    /// Added to the summary view's fitting width
    pub padding: f64,
}

/// Initial values for the preference store
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferencesConfig {
    pub layout_type: LayoutType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_device: Option<DeviceId>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            file_logging: false,
            json_logs: false,
            log_retention_days: 7,
        }
    }
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            update_delay_ms: 150,
            app_name: "AudioMate".to_string(),
        }
    }
}

impl Default for StatusBarConfig {
    fn default() -> Self {
        Self { padding: 10.0 }
    }
}

impl MenuConfig {
    pub fn update_delay(&self) -> Duration {
        Duration::from_millis(self.update_delay_ms)
    }
}

impl Config {
    /// Reject values the menu cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.menu.update_delay_ms == 0 {
            bail!("menu.update_delay_ms must be greater than zero");
        }
        if self.menu.app_name.trim().is_empty() {
            bail!("menu.app_name must not be empty");
        }
        if !self.status_bar.padding.is_finite() || self.status_bar.padding < 0.0 {
            bail!(
                "status_bar.padding must be a non-negative number, got {}",
                self.status_bar.padding
            );
        }
        Ok(())
    }
}
