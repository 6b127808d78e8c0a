//! Battery view controller
//!
//! Single owner of the simulated battery, the live platform handle and the
//! rendered [`Surface`]. Every input arrives as a [`Message`] and is handled
//! synchronously by [`ViewController::update`]; work that needs the runtime
//! comes back out as [`Command`]s.
//!
//! Source selection:
//!
//! ```text
//! Uninitialized --acquired--> Live
//! Uninitialized --absent/failed--> Simulated
//! Live <--demo on/off, preset--> Simulated
//! ```
//!
//! Turning demo mode off re-requests the platform handle; until it resolves
//! the source is `Uninitialized` and the last rendered values stay visible.

use battview_config::BattviewConfig;
use battview_hal::{BatteryState, LiveBattery, PlatformError};
use tracing::{debug, info, warn};

use crate::format;
use crate::state::{DevicePreset, SimulatedState};
use crate::surface::{BatteryView, Bolt, Surface};

pub const SUPPORT_AVAILABLE: &str = "Available";
pub const SUPPORT_ATTACHED: &str = "Supported";
pub const SUPPORT_MISSING: &str = "Not supported (using demo)";
pub const UNSUPPORTED_REFRESH_NOTICE: &str =
    "Battery API not supported on this system. Use demo mode.";

/// Which battery the view is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Nothing attached yet, or a request is outstanding
    Uninitialized,
    /// Platform handle
    Live,
    /// Locally authored state
    Simulated,
}

/// Everything the controller reacts to
#[derive(Debug)]
pub enum Message {
    /// The platform answered acquisition request `ticket`
    Acquired {
        ticket: u64,
        result: Result<LiveBattery, PlatformError>,
    },
    /// The live handle reported a change
    LiveChanged,
    /// Periodic fallback re-render
    RenderTick,
    /// Periodic live region refresh
    LiveRegionTick,
    /// Demo checkbox set to a value
    SetDemo(bool),
    /// Demo checkbox flipped
    ToggleDemo,
    /// Slider set (0-100)
    SetLevel(u8),
    /// Slider moved by a delta
    NudgeLevel(i16),
    SelectPreset(DevicePreset),
    Refresh,
    ResetDemo,
    /// Show or hide the demo panel without switching source
    ToggleControls,
    DismissNotice,
    Quit,
}

/// Side effects for the runtime to carry out
#[derive(Debug)]
pub enum Command {
    /// Ask the platform for a live handle and answer with `Message::Acquired`
    Acquire { ticket: u64 },
    /// Forward change notifications of this handle as `Message::LiveChanged`
    Watch(LiveBattery),
    /// Stop forwarding change notifications
    Unwatch,
    Quit,
}

/// Fixed controller parameters
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// Height of the liquid graphic
    pub liquid_height: f64,
    /// Slider position on start and after reset
    pub default_slider: u8,
    /// Device label shown next to the battery
    pub device_label: String,
}

impl ControllerOptions {
    pub fn from_config(config: &BattviewConfig, device_label: impl Into<String>) -> Self {
        Self {
            liquid_height: config.display.liquid_height,
            default_slider: config.demo.default_level,
            device_label: device_label.into(),
        }
    }
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            liquid_height: 168.0,
            default_slider: 50,
            device_label: "Terminal".to_string(),
        }
    }
}

/// Derive every battery element from one reading
pub fn render_battery(state: &BatteryState, liquid_height: f64) -> BatteryView {
    let level = format::clamp_level(state.level);
    let p = format::percent(level);

    BatteryView {
        level_text: format!("{}%", p),
        svg_percent: format!("{}%", p),
        fill_percent: p,
        liquid_offset: format::liquid_offset(level, liquid_height),
        liquid_fallback: p,
        charging_text: if state.charging { "Yes" } else { "No" }.to_string(),
        status_text: format::status_for(p, state.charging).to_string(),
        health_text: format::health_for(p).to_string(),
        time_text: format::format_time(state.remaining_time()),
        bolt: Bolt {
            charging: state.charging,
            opacity: if state.charging { 1.0 } else { 0.35 },
        },
        low_pulse: format::is_low_pulse(p, state.charging),
    }
}

/// The battery view controller
pub struct ViewController {
    options: ControllerOptions,
    supported: bool,
    source: Source,
    demo: bool,
    simulated: SimulatedState,
    live: Option<LiveBattery>,
    pending: Option<u64>,
    next_ticket: u64,
    surface: Surface,
}

impl ViewController {
    /// Create a controller; `supported` is the platform capability query
    pub fn new(supported: bool, options: ControllerOptions) -> Self {
        let simulated = SimulatedState::with_slider(options.default_slider);
        let surface = Surface {
            device_text: options.device_label.clone(),
            ..Surface::default()
        };

        let mut controller = Self {
            options,
            supported,
            source: Source::Uninitialized,
            demo: false,
            simulated,
            live: None,
            pending: None,
            next_ticket: 0,
            surface,
        };
        controller.sync_panel();
        controller
    }

    /// Startup: render the simulated state, then attach the platform if it exists
    pub fn initialize(&mut self) -> Vec<Command> {
        let initial = self.simulated.battery;
        self.render(&initial);

        if !self.supported {
            info!("Battery query unavailable, starting in demo mode");
            self.surface.support_text = SUPPORT_MISSING.to_string();
            self.enter_demo();
            return Vec::new();
        }

        self.surface.support_text = SUPPORT_AVAILABLE.to_string();
        vec![self.request_acquire()]
    }

    /// Handle one message
    pub fn update(&mut self, message: Message) -> Vec<Command> {
        match message {
            Message::Acquired { ticket, result } => self.on_acquired(ticket, result),
            Message::LiveChanged => {
                if self.source == Source::Live {
                    self.render_active();
                }
                Vec::new()
            }
            Message::RenderTick => {
                self.render_active();
                Vec::new()
            }
            Message::LiveRegionTick => {
                self.refresh_live_region();
                Vec::new()
            }
            Message::SetDemo(on) => self.set_demo(on),
            Message::ToggleDemo => self.set_demo(!self.demo),
            Message::SetLevel(value) => {
                self.simulated.set_slider(value);
                self.after_slider();
                Vec::new()
            }
            Message::NudgeLevel(delta) => {
                self.simulated.nudge(delta);
                self.after_slider();
                Vec::new()
            }
            Message::SelectPreset(preset) => {
                debug!("Applying {} preset", preset);
                self.simulated.apply_preset(preset);
                self.enter_demo();
                Vec::new()
            }
            Message::Refresh => self.refresh(),
            Message::ResetDemo => self.reset_demo(),
            Message::ToggleControls => {
                self.surface.demo.visible = !self.surface.demo.visible;
                Vec::new()
            }
            Message::DismissNotice => {
                self.surface.notice = None;
                Vec::new()
            }
            Message::Quit => vec![Command::Quit],
        }
    }

    /// Write one reading into the surface
    pub fn render(&mut self, state: &BatteryState) {
        self.surface.battery = render_battery(state, self.options.liquid_height);
    }

    fn render_active(&mut self) {
        match self.source {
            Source::Live => {
                if let Some(live) = &self.live {
                    let state = live.snapshot();
                    self.render(&state);
                }
            }
            Source::Simulated => {
                let state = self.simulated.battery;
                self.render(&state);
            }
            Source::Uninitialized => {}
        }
    }

    fn request_acquire(&mut self) -> Command {
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.pending = Some(ticket);
        debug!("Requesting battery handle (ticket {})", ticket);
        Command::Acquire { ticket }
    }

    fn on_acquired(
        &mut self,
        ticket: u64,
        result: Result<LiveBattery, PlatformError>,
    ) -> Vec<Command> {
        if self.pending != Some(ticket) {
            debug!("Ignoring stale battery acquisition (ticket {})", ticket);
            return Vec::new();
        }
        self.pending = None;

        match result {
            Ok(live) => {
                info!("Battery handle attached");
                self.surface.support_text = SUPPORT_ATTACHED.to_string();
                self.live = Some(live.clone());

                // Demo mode keeps the live handle out of the view
                if !self.demo {
                    self.source = Source::Live;
                    self.render_active();
                }
                vec![Command::Watch(live)]
            }
            Err(e) => {
                warn!("Battery API error: {}", e);
                self.surface.support_text = SUPPORT_MISSING.to_string();
                let had_live = self.live.take().is_some();
                self.enter_demo();
                if had_live {
                    vec![Command::Unwatch]
                } else {
                    Vec::new()
                }
            }
        }
    }

    fn set_demo(&mut self, on: bool) -> Vec<Command> {
        if on {
            self.simulated.start_demo();
            self.enter_demo();
            return Vec::new();
        }

        self.demo = false;
        self.surface.demo.checked = false;
        self.surface.demo.visible = false;
        self.reattach()
    }

    /// Demo checkbox on, panel shown, simulated state rendered
    fn enter_demo(&mut self) {
        self.demo = true;
        self.source = Source::Simulated;
        self.surface.demo.checked = true;
        self.surface.demo.visible = true;
        self.sync_panel();
        self.render_active();
    }

    /// Try the platform again, or stay on the simulation without one
    fn reattach(&mut self) -> Vec<Command> {
        if self.supported {
            self.source = Source::Uninitialized;
            vec![self.request_acquire()]
        } else {
            self.source = Source::Simulated;
            self.surface.support_text = SUPPORT_MISSING.to_string();
            self.render_active();
            Vec::new()
        }
    }

    fn after_slider(&mut self) {
        self.sync_panel();
        if self.source == Source::Simulated {
            self.render_active();
        }
    }

    fn refresh(&mut self) -> Vec<Command> {
        if self.supported {
            vec![self.request_acquire()]
        } else {
            info!("Refresh requested without a battery query");
            self.surface.notice = Some(UNSUPPORTED_REFRESH_NOTICE.to_string());
            Vec::new()
        }
    }

    fn reset_demo(&mut self) -> Vec<Command> {
        self.simulated = SimulatedState::with_slider(self.options.default_slider);
        self.demo = false;
        self.surface.demo.checked = false;
        self.surface.demo.visible = false;
        self.sync_panel();
        self.reattach()
    }

    fn sync_panel(&mut self) {
        self.surface.demo.range = self.simulated.slider;
        self.surface.demo.sim_device = self
            .simulated
            .preset
            .map(|p| p.name())
            .unwrap_or("none")
            .to_string();
    }

    fn refresh_live_region(&mut self) {
        let summary = self.surface.live_summary();
        if summary != self.surface.live_region {
            info!(target: "battview::live", "{}", summary);
            self.surface.live_region = summary;
        }
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn is_demo(&self) -> bool {
        self.demo
    }

    pub fn simulated(&self) -> &SimulatedState {
        &self.simulated
    }

    pub fn live(&self) -> Option<&LiveBattery> {
        self.live.as_ref()
    }

    /// Ticket of the outstanding acquisition, if any
    pub fn pending_ticket(&self) -> Option<u64> {
        self.pending
    }
}
