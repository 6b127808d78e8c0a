//! battview
//!
//! Terminal battery widget. Shows the platform battery when one can be
//! acquired and falls back to a locally simulated battery (demo mode)
//! otherwise.

pub mod controller;
pub mod format;
pub mod runtime;
pub mod state;
pub mod surface;
pub mod tui;

pub use controller::{
    Command, ControllerOptions, Message, Source, ViewController, render_battery,
};
pub use runtime::{Dispatcher, platform_from_config};
pub use state::{DevicePreset, SimulatedState};
pub use surface::{ElementId, Surface};
