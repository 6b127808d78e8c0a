//! Configuration sections

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Which battery platform to observe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
    /// Linux power supply class
    #[default]
    Sysfs,
    /// Mock battery driven by the `[platform.mock]` reading
    Mock,
    /// Mock platform whose query always rejects
    Failing,
    /// No battery query, demo mode only
    None,
}

impl PlatformKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformKind::Sysfs => "sysfs",
            PlatformKind::Mock => "mock",
            PlatformKind::Failing => "failing",
            PlatformKind::None => "none",
        }
    }

    /// Parse from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "sysfs" => Some(PlatformKind::Sysfs),
            "mock" => Some(PlatformKind::Mock),
            "failing" => Some(PlatformKind::Failing),
            "none" | "absent" => Some(PlatformKind::None),
            _ => None,
        }
    }
}

/// Reading reported by the mock platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockBatteryConfig {
    /// Fraction of charge (0.0 - 1.0)
    #[serde(default = "default_mock_level")]
    pub level: f64,

    #[serde(default)]
    pub charging: bool,

    /// Seconds until full, absent for unknown
    #[serde(default)]
    pub charging_time: Option<f64>,

    /// Seconds until empty, absent for unknown
    #[serde(default = "default_mock_discharging_time")]
    pub discharging_time: Option<f64>,
}

fn default_mock_level() -> f64 {
    0.8
}

fn default_mock_discharging_time() -> Option<f64> {
    Some(4.0 * 3600.0)
}

impl Default for MockBatteryConfig {
    fn default() -> Self {
        Self {
            level: default_mock_level(),
            charging: false,
            charging_time: None,
            discharging_time: default_mock_discharging_time(),
        }
    }
}

/// Platform settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    #[serde(default)]
    pub kind: PlatformKind,

    /// Power supply class directory scanned by the sysfs platform
    #[serde(default = "default_power_supply_dir")]
    pub power_supply_dir: PathBuf,

    /// How often sysfs is re-read for changes (milliseconds)
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    #[serde(default)]
    pub mock: MockBatteryConfig,
}

fn default_power_supply_dir() -> PathBuf {
    PathBuf::from("/sys/class/power_supply")
}

fn default_poll_interval() -> u64 {
    1000
}

impl PlatformConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            kind: PlatformKind::default(),
            power_supply_dir: default_power_supply_dir(),
            poll_interval_ms: default_poll_interval(),
            mock: MockBatteryConfig::default(),
        }
    }
}

/// Periodic refresh timers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// Fallback re-render from the active source (milliseconds)
    #[serde(default = "default_render_interval")]
    pub render_interval_ms: u64,

    /// Live region text refresh (milliseconds)
    #[serde(default = "default_live_region_interval")]
    pub live_region_interval_ms: u64,
}

fn default_render_interval() -> u64 {
    3000
}

fn default_live_region_interval() -> u64 {
    1500
}

impl RefreshConfig {
    pub fn render_interval(&self) -> Duration {
        Duration::from_millis(self.render_interval_ms)
    }

    pub fn live_region_interval(&self) -> Duration {
        Duration::from_millis(self.live_region_interval_ms)
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            render_interval_ms: default_render_interval(),
            live_region_interval_ms: default_live_region_interval(),
        }
    }
}

/// Battery graphic geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Height of the liquid graphic; an empty battery is offset by all of it
    #[serde(default = "default_liquid_height")]
    pub liquid_height: f64,
}

fn default_liquid_height() -> f64 {
    168.0
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            liquid_height: default_liquid_height(),
        }
    }
}

/// Demo mode settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoConfig {
    /// Slider position on start and after reset (0-100)
    #[serde(default = "default_demo_level")]
    pub default_level: u8,
}

fn default_demo_level() -> u8 {
    50
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            default_level: default_demo_level(),
        }
    }
}
