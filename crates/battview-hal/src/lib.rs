//! Platform battery layer
//!
//! This crate provides the battery sources battview can observe, allowing the
//! view controller to treat a real power supply and a mock one the same way.
//!
//! # Platforms
//!
//! - Linux sysfs (`/sys/class/power_supply`)
//! - Mock platform for tests and machines without a battery
//!
//! # Example
//!
//! ```no_run
//! use battview_hal::{BatteryPlatform, SysfsPlatform};
//!
//! # async fn demo() -> Result<(), battview_hal::PlatformError> {
//! let platform = SysfsPlatform::detect_default();
//! if platform.is_supported() {
//!     let battery = platform.acquire().await?;
//!     println!("Level: {:.0}%", battery.snapshot().level * 100.0);
//! }
//! # Ok(())
//! # }
//! ```

pub mod device;
pub mod mock;
pub mod power;

pub use device::{HostInfo, PlatformError, host_label};
pub use mock::{MockMode, MockPlatform};
pub use power::{
    BatteryPlatform, BatteryState, LiveBattery, PowerSupplyReader, SysfsPlatform, UNBOUNDED,
};
