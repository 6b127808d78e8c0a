//! Configuration management for battview
//!
//! Handles platform selection, refresh timers, graphic geometry and demo defaults.
//! TOML-based config files with per-field defaults, overridable from the environment.

mod sections;

pub use sections::{
    DemoConfig, DisplayConfig, MockBatteryConfig, PlatformConfig, PlatformKind, RefreshConfig,
};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Standard configuration paths
pub const CONFIG_DIR: &str = "/etc/battview";
pub const CONFIG_FILE: &str = "config.toml";

/// Environment variable naming an explicit config file
pub const ENV_CONFIG: &str = "BATTVIEW_CONFIG";
/// Environment variable overriding `platform.kind`
pub const ENV_PLATFORM: &str = "BATTVIEW_PLATFORM";

/// Main battview configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BattviewConfig {
    #[serde(default)]
    pub platform: PlatformConfig,

    #[serde(default)]
    pub refresh: RefreshConfig,

    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub demo: DemoConfig,
}

impl BattviewConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default locations, then apply environment overrides
    pub fn load_default() -> Result<Self, ConfigError> {
        let mut config = Self::load_from_locations()?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn load_from_locations() -> Result<Self, ConfigError> {
        // An explicit file must exist
        if let Ok(explicit) = std::env::var(ENV_CONFIG) {
            return Self::load(Path::new(&explicit));
        }

        // Try user config first, then system config
        let user_config = user_config_path(
            std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
            std::env::var_os("HOME").map(PathBuf::from),
        );
        if let Some(user_config) = user_config.filter(|p| p.exists()) {
            return Self::load(&user_config);
        }

        let system_config = Path::new(CONFIG_DIR).join(CONFIG_FILE);
        if system_config.exists() {
            return Self::load(&system_config);
        }

        // Return default config if no file exists
        tracing::warn!("No configuration file found, using defaults");
        Ok(Self::default())
    }

    /// Apply overrides looked up by environment variable name
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(kind) = lookup(ENV_PLATFORM) {
            self.platform.kind = PlatformKind::parse(&kind).ok_or_else(|| {
                ConfigError::Invalid(format!("{}={} is not a known platform", ENV_PLATFORM, kind))
            })?;
            tracing::info!("Platform overridden to {}", self.platform.kind.as_str());
        }
        Ok(())
    }

    /// Reject values the view cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.refresh.render_interval_ms == 0 || self.refresh.live_region_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "refresh intervals must be greater than zero".into(),
            ));
        }
        if self.platform.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "platform.poll_interval_ms must be greater than zero".into(),
            ));
        }
        if !(self.display.liquid_height.is_finite() && self.display.liquid_height > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "display.liquid_height must be positive, got {}",
                self.display.liquid_height
            )));
        }
        if self.demo.default_level > 100 {
            return Err(ConfigError::Invalid(format!(
                "demo.default_level must be 0-100, got {}",
                self.demo.default_level
            )));
        }
        Ok(())
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, contents)?;
        tracing::info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// Per-user config location following the XDG base directory layout
pub fn user_config_path(
    xdg_config_home: Option<PathBuf>,
    home: Option<PathBuf>,
) -> Option<PathBuf> {
    xdg_config_home
        .filter(|p| p.is_absolute())
        .or_else(|| home.map(|h| h.join(".config")))
        .map(|base| base.join("battview").join(CONFIG_FILE))
}
