//! Locally owned demo state

use battview_hal::{BatteryState, UNBOUNDED};
use std::fmt;

/// Discharge time the slider assumes for a full battery (seconds)
pub const SIMULATED_FULL_RUNTIME: f64 = 5.0 * 3600.0;

/// Canned device profiles for demo mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DevicePreset {
    Laptop,
    Tablet,
    Phone,
}

impl DevicePreset {
    pub fn all() -> &'static [DevicePreset] {
        &[DevicePreset::Laptop, DevicePreset::Tablet, DevicePreset::Phone]
    }

    pub fn name(&self) -> &'static str {
        match self {
            DevicePreset::Laptop => "laptop",
            DevicePreset::Tablet => "tablet",
            DevicePreset::Phone => "phone",
        }
    }

    /// The reading this preset simulates
    pub fn battery(&self) -> BatteryState {
        match self {
            DevicePreset::Laptop => BatteryState::new(0.72, true, 30.0 * 60.0, UNBOUNDED),
            DevicePreset::Tablet => BatteryState::new(0.45, false, UNBOUNDED, 3.0 * 3600.0),
            DevicePreset::Phone => BatteryState::new(0.18, false, UNBOUNDED, 1.2 * 3600.0),
        }
    }

    /// Slider position matching the preset level
    pub fn slider(&self) -> u8 {
        match self {
            DevicePreset::Laptop => 72,
            DevicePreset::Tablet => 45,
            DevicePreset::Phone => 18,
        }
    }
}

impl fmt::Display for DevicePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Battery authored by the user instead of the platform
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedState {
    pub battery: BatteryState,
    /// Slider position (0-100)
    pub slider: u8,
    /// Last preset applied, if the user picked one
    pub preset: Option<DevicePreset>,
}

impl SimulatedState {
    /// Battery at the slider position, not charging, no estimates
    pub fn with_slider(slider: u8) -> Self {
        let slider = slider.min(100);
        Self {
            battery: BatteryState::unbounded(f64::from(slider) / 100.0, false),
            slider,
            preset: None,
        }
    }

    /// Overwrite everything with a preset
    pub fn apply_preset(&mut self, preset: DevicePreset) {
        *self = Self {
            battery: preset.battery(),
            slider: preset.slider(),
            preset: Some(preset),
        };
    }

    /// Move the slider; the discharge estimate grows as the level drops
    pub fn set_slider(&mut self, value: u8) {
        self.slider = value.min(100);
        self.battery.level = f64::from(self.slider) / 100.0;
        self.battery.discharging_time = (1.0 - self.battery.level) * SIMULATED_FULL_RUNTIME;
    }

    /// Enter demo mode from the current slider position
    pub fn start_demo(&mut self) {
        self.battery.level = f64::from(self.slider) / 100.0;
        self.battery.charging = false;
        self.battery.charging_time = UNBOUNDED;
    }

    pub fn nudge(&mut self, delta: i16) {
        let value = i16::from(self.slider).saturating_add(delta).clamp(0, 100) as u8;
        self.set_slider(value);
    }
}

impl Default for SimulatedState {
    fn default() -> Self {
        Self::with_slider(50)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_midpoint() {
        let sim = SimulatedState::default();
        assert_eq!(sim.battery, BatteryState::unbounded(0.5, false));
        assert_eq!(sim.slider, 50);
        assert_eq!(sim.preset, None);
    }

    #[test]
    fn test_presets_overwrite_wholesale() {
        let mut sim = SimulatedState::default();
        sim.apply_preset(DevicePreset::Laptop);
        sim.apply_preset(DevicePreset::Tablet);

        assert_eq!(
            sim.battery,
            BatteryState::new(0.45, false, UNBOUNDED, 3.0 * 3600.0)
        );
        assert_eq!(sim.slider, 45);
        assert_eq!(sim.preset, Some(DevicePreset::Tablet));
    }

    #[test]
    fn test_preset_idempotent() {
        let mut once = SimulatedState::default();
        once.apply_preset(DevicePreset::Phone);
        let mut twice = once.clone();
        twice.apply_preset(DevicePreset::Phone);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_slider_updates_discharge() {
        let mut sim = SimulatedState::default();
        sim.set_slider(30);
        assert_eq!(sim.battery.level, 0.3);
        assert!((sim.battery.discharging_time - 3.5 * 3600.0).abs() < 1e-6);

        sim.set_slider(0);
        assert!((sim.battery.discharging_time - SIMULATED_FULL_RUNTIME).abs() < 1e-6);

        sim.set_slider(250);
        assert_eq!(sim.slider, 100);
        assert_eq!(sim.battery.level, 1.0);
        assert_eq!(sim.battery.discharging_time, 0.0);
    }

    #[test]
    fn test_nudge_clamps() {
        let mut sim = SimulatedState::with_slider(3);
        sim.nudge(-10);
        assert_eq!(sim.slider, 0);
        sim.nudge(150);
        assert_eq!(sim.slider, 100);
    }

    #[test]
    fn test_nudge_extreme_deltas() {
        let mut sim = SimulatedState::with_slider(60);
        sim.nudge(i16::MAX);
        assert_eq!(sim.slider, 100);
        sim.nudge(i16::MIN);
        assert_eq!(sim.slider, 0);
    }

    #[test]
    fn test_start_demo_from_slider() {
        let mut sim = SimulatedState::default();
        sim.apply_preset(DevicePreset::Laptop);
        sim.start_demo();
        assert_eq!(sim.battery.level, 0.72);
        assert!(!sim.battery.charging);
        assert_eq!(sim.battery.charging_time, UNBOUNDED);
    }

    #[test]
    fn test_preset_names() {
        let names: Vec<_> = DevicePreset::all().iter().map(|p| p.to_string()).collect();
        assert_eq!(names, ["laptop", "tablet", "phone"]);
    }
}
