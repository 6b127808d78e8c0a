//! Rendered widget tree
//!
//! The controller writes into a [`Surface`]; the terminal frontend only reads it.
//! Every element has a stable [`ElementId`] and a visible text, which is what
//! the live region and the tests compare.

use std::fmt::Write as _;

/// Stable identifiers of rendered elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ElementId {
    LevelText,
    SvgPercent,
    ProgressFill,
    LiquidRect,
    LiquidFallback,
    ChargingText,
    StatusText,
    HealthText,
    TimeText,
    BoltBox,
    BatteryWrap,
    DemoControls,
    DemoToggle,
    DemoRange,
    SimDevice,
    SupportText,
    DeviceText,
    BatteryLive,
    Notice,
}

impl ElementId {
    pub fn all() -> &'static [ElementId] {
        &[
            ElementId::LevelText,
            ElementId::SvgPercent,
            ElementId::ProgressFill,
            ElementId::LiquidRect,
            ElementId::LiquidFallback,
            ElementId::ChargingText,
            ElementId::StatusText,
            ElementId::HealthText,
            ElementId::TimeText,
            ElementId::BoltBox,
            ElementId::BatteryWrap,
            ElementId::DemoControls,
            ElementId::DemoToggle,
            ElementId::DemoRange,
            ElementId::SimDevice,
            ElementId::SupportText,
            ElementId::DeviceText,
            ElementId::BatteryLive,
            ElementId::Notice,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ElementId::LevelText => "levelTxt",
            ElementId::SvgPercent => "svg-percent",
            ElementId::ProgressFill => "progressFill",
            ElementId::LiquidRect => "liquid-rect",
            ElementId::LiquidFallback => "liquidFallback",
            ElementId::ChargingText => "chargingTxt",
            ElementId::StatusText => "statusTxt",
            ElementId::HealthText => "healthTxt",
            ElementId::TimeText => "timeTxt",
            ElementId::BoltBox => "boltBox",
            ElementId::BatteryWrap => "battery-wrap",
            ElementId::DemoControls => "demoControls",
            ElementId::DemoToggle => "demoToggle",
            ElementId::DemoRange => "demoRange",
            ElementId::SimDevice => "simDevice",
            ElementId::SupportText => "supportTxt",
            ElementId::DeviceText => "deviceTxt",
            ElementId::BatteryLive => "batteryLive",
            ElementId::Notice => "notice",
        }
    }
}

/// Charge bolt icon
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bolt {
    pub charging: bool,
    pub opacity: f32,
}

impl Default for Bolt {
    fn default() -> Self {
        Self {
            charging: false,
            opacity: 0.35,
        }
    }
}

/// Everything derived from one battery reading
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BatteryView {
    /// Numeric readout, e.g. `72%`
    pub level_text: String,
    /// Overlay on the graphic
    pub svg_percent: String,
    /// Fill bar width in percent
    pub fill_percent: u8,
    /// Downward offset of the liquid graphic
    pub liquid_offset: f64,
    /// Plain-text fallback liquid height in percent
    pub liquid_fallback: u8,
    pub charging_text: String,
    pub status_text: String,
    pub health_text: String,
    pub time_text: String,
    pub bolt: Bolt,
    /// Low and not charging
    pub low_pulse: bool,
}

/// Demo controls panel
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DemoPanel {
    pub visible: bool,
    pub checked: bool,
    /// Slider position (0-100)
    pub range: u8,
    pub sim_device: String,
}

/// The whole rendered widget tree
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Surface {
    pub battery: BatteryView,
    pub demo: DemoPanel,
    pub support_text: String,
    pub device_text: String,
    /// Screen-reader summary, refreshed on its own timer
    pub live_region: String,
    /// User-facing notice, if one is pending
    pub notice: Option<String>,
}

impl Surface {
    /// Visible text (or attribute value) of an element
    pub fn text(&self, id: ElementId) -> String {
        let b = &self.battery;
        match id {
            ElementId::LevelText => b.level_text.clone(),
            ElementId::SvgPercent => b.svg_percent.clone(),
            ElementId::ProgressFill => format!("{}%", b.fill_percent),
            ElementId::LiquidRect => format!("translate(0, {})", b.liquid_offset),
            ElementId::LiquidFallback => format!("{}%", b.liquid_fallback),
            ElementId::ChargingText => b.charging_text.clone(),
            ElementId::StatusText => b.status_text.clone(),
            ElementId::HealthText => b.health_text.clone(),
            ElementId::TimeText => b.time_text.clone(),
            ElementId::BoltBox => {
                if b.bolt.charging {
                    format!("charging opacity:{}", b.bolt.opacity)
                } else {
                    format!("opacity:{}", b.bolt.opacity)
                }
            }
            ElementId::BatteryWrap => {
                if b.low_pulse {
                    "lowpulse".to_string()
                } else {
                    String::new()
                }
            }
            ElementId::DemoControls => {
                let display = if self.demo.visible { "block" } else { "none" };
                display.to_string()
            }
            ElementId::DemoToggle => {
                let checked = if self.demo.checked { "checked" } else { "" };
                checked.to_string()
            }
            ElementId::DemoRange => self.demo.range.to_string(),
            ElementId::SimDevice => self.demo.sim_device.clone(),
            ElementId::SupportText => self.support_text.clone(),
            ElementId::DeviceText => self.device_text.clone(),
            ElementId::BatteryLive => self.live_region.clone(),
            ElementId::Notice => self.notice.clone().unwrap_or_default(),
        }
    }

    /// `id=text` for every element, one per line
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for id in ElementId::all() {
            let _ = writeln!(out, "{}={}", id.as_str(), self.text(*id));
        }
        out
    }

    /// The summary the live region announces, built from rendered text
    pub fn live_summary(&self) -> String {
        format!(
            "{} - {} - {}",
            self.text(ElementId::LevelText),
            self.text(ElementId::StatusText),
            self.text(ElementId::TimeText)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_ids_unique() {
        let mut names: Vec<_> = ElementId::all().iter().map(|id| id.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), ElementId::all().len());
    }

    #[test]
    fn test_attribute_texts() {
        let mut surface = Surface::default();
        surface.battery.liquid_offset = 84.0;
        surface.battery.fill_percent = 50;
        surface.battery.low_pulse = true;
        surface.demo.visible = true;

        assert_eq!(surface.text(ElementId::LiquidRect), "translate(0, 84)");
        assert_eq!(surface.text(ElementId::ProgressFill), "50%");
        assert_eq!(surface.text(ElementId::BatteryWrap), "lowpulse");
        assert_eq!(surface.text(ElementId::DemoControls), "block");
        assert_eq!(surface.text(ElementId::BoltBox), "opacity:0.35");
        assert_eq!(surface.text(ElementId::Notice), "");
    }

    #[test]
    fn test_live_summary_uses_rendered_text() {
        let mut surface = Surface::default();
        surface.battery.level_text = "42%".into();
        surface.battery.status_text = "Normal".into();
        surface.battery.time_text = "2h 06m".into();

        assert_eq!(surface.live_summary(), "42% - Normal - 2h 06m");
    }

    #[test]
    fn test_dump_lists_every_element() {
        let dump = Surface::default().dump();
        assert_eq!(dump.lines().count(), ElementId::all().len());
        assert!(dump.contains("levelTxt="));
        assert!(dump.contains("demoControls=none"));
    }
}
