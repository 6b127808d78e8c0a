//! Pure formatting rules for the battery view
//!
//! Everything the render path derives from a [`BatteryState`] goes through
//! these functions so it can be checked without a surface.
//!
//! [`BatteryState`]: battview_hal::BatteryState

use std::fmt;

/// Shown instead of a duration that is unknown or does not apply
pub const PLACEHOLDER: &str = "--:--";

/// Clamp a level into [0, 1]; NaN counts as empty
pub fn clamp_level(level: f64) -> f64 {
    if level.is_nan() {
        0.0
    } else {
        level.clamp(0.0, 1.0)
    }
}

/// Whole percent after clamping
pub fn percent(level: f64) -> u8 {
    (clamp_level(level) * 100.0).round() as u8
}

/// Format seconds as `Hh MMm` or `Mm`
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return PLACEHOLDER.to_string();
    }

    let hours = (seconds / 3600.0).floor() as u64;
    let minutes = ((seconds % 3600.0) / 60.0).floor() as u64;

    if hours > 0 {
        format!("{}h {:02}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

/// Vertical offset of the liquid graphic: 0 when full, `height` when empty
pub fn liquid_offset(level: f64, height: f64) -> f64 {
    height * (1.0 - clamp_level(level))
}

/// Headline status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Charging,
    Normal,
    Low,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Charging => "Charging",
            Status::Normal => "Normal",
            Status::Low => "Low battery",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rough health guess from the level alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Health {
    Good,
    Fair,
    Low,
}

impl Health {
    pub fn as_str(&self) -> &'static str {
        match self {
            Health::Good => "Good",
            Health::Fair => "Fair",
            Health::Low => "Low",
        }
    }
}

impl fmt::Display for Health {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn status_for(percent: u8, charging: bool) -> Status {
    if charging {
        Status::Charging
    } else if percent > 20 {
        Status::Normal
    } else {
        Status::Low
    }
}

pub fn health_for(percent: u8) -> Health {
    if percent > 80 {
        Health::Good
    } else if percent > 40 {
        Health::Fair
    } else {
        Health::Low
    }
}

/// Low and not charging, drawn with a pulsing outline
pub fn is_low_pulse(percent: u8, charging: bool) -> bool {
    percent <= 15 && !charging
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time_placeholder() {
        assert_eq!(format_time(-5.0), PLACEHOLDER);
        assert_eq!(format_time(f64::INFINITY), PLACEHOLDER);
        assert_eq!(format_time(f64::NAN), PLACEHOLDER);
    }

    #[test]
    fn test_format_time_minutes() {
        assert_eq!(format_time(0.0), "0m");
        assert_eq!(format_time(59.0), "0m");
        assert_eq!(format_time(90.0), "1m");
        assert_eq!(format_time(3599.0), "59m");
    }

    #[test]
    fn test_format_time_hours() {
        assert_eq!(format_time(3600.0), "1h 00m");
        assert_eq!(format_time(5400.0), "1h 30m");
        assert_eq!(format_time(1.2 * 3600.0), "1h 12m");
        assert_eq!(format_time(36_000.0 + 540.0), "10h 09m");
    }

    #[test]
    fn test_clamp_and_percent() {
        assert_eq!(percent(1.7), 100);
        assert_eq!(percent(-0.3), 0);
        assert_eq!(percent(f64::NAN), 0);
        assert_eq!(percent(0.724), 72);
    }

    #[test]
    fn test_liquid_offset() {
        assert_eq!(liquid_offset(1.0, 168.0), 0.0);
        assert_eq!(liquid_offset(0.0, 168.0), 168.0);
        assert_eq!(liquid_offset(0.5, 168.0), 84.0);
        assert_eq!(liquid_offset(2.0, 168.0), 0.0);
        assert_eq!(liquid_offset(-1.0, 168.0), 168.0);
    }

    #[test]
    fn test_status() {
        assert_eq!(status_for(50, false), Status::Normal);
        assert_eq!(status_for(15, false), Status::Low);
        assert_eq!(status_for(15, true), Status::Charging);
        assert_eq!(status_for(21, false), Status::Normal);
        assert_eq!(status_for(20, false), Status::Low);
        assert_eq!(Status::Low.to_string(), "Low battery");
    }

    #[test]
    fn test_health() {
        assert_eq!(health_for(90), Health::Good);
        assert_eq!(health_for(50), Health::Fair);
        assert_eq!(health_for(10), Health::Low);
        assert_eq!(health_for(80), Health::Fair);
        assert_eq!(health_for(40), Health::Low);
    }

    #[test]
    fn test_low_pulse() {
        assert!(is_low_pulse(15, false));
        assert!(!is_low_pulse(15, true));
        assert!(!is_low_pulse(16, false));
    }
}
