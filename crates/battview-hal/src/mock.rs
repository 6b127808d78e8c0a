//! Mock battery platform for testing without real hardware
//!
//! This module provides a platform whose capability, acquisition outcome and
//! battery readings are all controlled by the caller, allowing development
//! and testing on desktops and CI machines that have no battery.
//!
//! # Usage
//!
//! ```no_run
//! use battview_hal::{BatteryState, MockPlatform};
//!
//! let platform = MockPlatform::available(BatteryState::unbounded(0.8, false));
//! platform.set_level(0.42);
//!
//! // Or a host with no battery query at all
//! let absent = MockPlatform::absent();
//! ```

use crate::{BatteryPlatform, BatteryState, LiveBattery, PlatformError};
use futures_util::future::BoxFuture;
use std::time::Duration;
use tokio::sync::watch;

/// How the mock answers capability and acquisition requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockMode {
    /// Query exists and resolves with a live handle
    Available,
    /// Query does not exist
    Absent,
    /// Query exists but rejects with the given message
    Failing(String),
}

/// Mock platform for tests and battery-less hosts
pub struct MockPlatform {
    mode: MockMode,
    delay: Option<Duration>,
    tx: watch::Sender<BatteryState>,
}

impl MockPlatform {
    pub fn new(mode: MockMode, initial: BatteryState) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self {
            mode,
            delay: None,
            tx,
        }
    }

    /// Supported platform reporting `initial`
    pub fn available(initial: BatteryState) -> Self {
        Self::new(MockMode::Available, initial)
    }

    /// Platform without a battery query
    pub fn absent() -> Self {
        Self::new(MockMode::Absent, BatteryState::default())
    }

    /// Platform whose query rejects
    pub fn failing(message: impl Into<String>) -> Self {
        Self::new(MockMode::Failing(message.into()), BatteryState::default())
    }

    /// Make every acquisition wait before resolving
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Replace the reading and notify every handle
    pub fn set_state(&self, state: BatteryState) {
        self.tx.send_replace(state);
    }

    /// Simulate battery level change (for testing)
    pub fn set_level(&self, level: f64) {
        self.tx.send_modify(|s| s.level = level);
    }

    /// Simulate charging state
    pub fn set_charging(&self, charging: bool) {
        self.tx.send_modify(|s| s.charging = charging);
    }

    /// Number of live handles still attached
    pub fn handle_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl BatteryPlatform for MockPlatform {
    fn name(&self) -> &str {
        "mock"
    }

    fn is_supported(&self) -> bool {
        self.mode != MockMode::Absent
    }

    fn acquire(&self) -> BoxFuture<'static, Result<LiveBattery, PlatformError>> {
        let mode = self.mode.clone();
        let delay = self.delay;
        let rx = self.tx.subscribe();

        Box::pin(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            match mode {
                MockMode::Available => {
                    tracing::debug!("[MOCK] battery handle acquired");
                    Ok(LiveBattery::new(rx))
                }
                MockMode::Absent => Err(PlatformError::CapabilityAbsent),
                MockMode::Failing(message) => Err(PlatformError::AcquisitionFailed(message)),
            }
        })
    }
}
