//! Battery sources
//!
//! Handles battery level, charging detection and remaining-time estimates via sysfs.
//! A platform hands out a [`LiveBattery`], an observable handle that is updated
//! in the background and announces every change.

use crate::PlatformError;
use futures_util::future::BoxFuture;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::watch;

/// Sentinel for a time estimate that is unknown or does not apply
pub const UNBOUNDED: f64 = f64::INFINITY;

/// Default power supply class directory
pub const POWER_SUPPLY_DIR: &str = "/sys/class/power_supply";

/// A battery-like record, regardless of where it came from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatteryState {
    /// Fraction of charge remaining (0.0 - 1.0)
    pub level: f64,
    pub charging: bool,
    /// Seconds until full, [`UNBOUNDED`] when not charging or unknown
    pub charging_time: f64,
    /// Seconds until empty, [`UNBOUNDED`] when charging or unknown
    pub discharging_time: f64,
}

impl BatteryState {
    pub fn new(level: f64, charging: bool, charging_time: f64, discharging_time: f64) -> Self {
        Self {
            level,
            charging,
            charging_time,
            discharging_time,
        }
    }

    /// A state with both time estimates unbounded
    pub fn unbounded(level: f64, charging: bool) -> Self {
        Self::new(level, charging, UNBOUNDED, UNBOUNDED)
    }

    /// The estimate that matters for the current charging direction
    pub fn remaining_time(&self) -> f64 {
        if self.charging {
            self.charging_time
        } else {
            self.discharging_time
        }
    }
}

impl Default for BatteryState {
    fn default() -> Self {
        Self::unbounded(1.0, true)
    }
}

/// Observable handle to a battery owned by a platform
///
/// The platform keeps mutating the value; holders read the latest snapshot or
/// wait for the next change.
#[derive(Debug, Clone)]
pub struct LiveBattery {
    rx: watch::Receiver<BatteryState>,
}

impl LiveBattery {
    pub fn new(rx: watch::Receiver<BatteryState>) -> Self {
        Self { rx }
    }

    /// Current value without waiting
    pub fn snapshot(&self) -> BatteryState {
        *self.rx.borrow()
    }

    /// Wait for the next change notification
    pub async fn changed(&mut self) -> Result<BatteryState, PlatformError> {
        self.rx
            .changed()
            .await
            .map_err(|_| PlatformError::SourceClosed)?;
        Ok(*self.rx.borrow_and_update())
    }
}

/// A provider of live battery handles
pub trait BatteryPlatform: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Whether the battery query exists at all
    fn is_supported(&self) -> bool;

    /// Request a live handle. Resolves once the platform answers.
    fn acquire(&self) -> BoxFuture<'static, Result<LiveBattery, PlatformError>>;
}

/// Reads one battery (and optionally its charger) from sysfs
#[derive(Debug, Clone)]
pub struct PowerSupplyReader {
    battery_path: PathBuf,
    charger_path: Option<PathBuf>,
}

impl PowerSupplyReader {
    pub fn new(battery_path: PathBuf, charger_path: Option<PathBuf>) -> Self {
        Self {
            battery_path,
            charger_path,
        }
    }

    /// Scan a power supply directory for a system battery and a charger
    pub fn detect(power_supply_dir: &Path) -> Result<Option<Self>, PlatformError> {
        if !power_supply_dir.exists() {
            return Ok(None);
        }

        let mut entries: Vec<_> = fs::read_dir(power_supply_dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .collect();
        entries.sort();

        let mut battery_path = None;
        let mut charger_path = None;

        for path in entries {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_lowercase())
                .unwrap_or_default();

            // Read type to determine if it's battery or charger
            let Ok(psu_type) = fs::read_to_string(path.join("type")) else {
                continue;
            };
            let psu_type = psu_type.trim().to_lowercase();

            if psu_type == "battery" {
                // Peripheral batteries (mice, headsets) report scope=Device
                let scope = read_trimmed(&path.join("scope")).unwrap_or_default();
                if scope.eq_ignore_ascii_case("device") || battery_path.is_some() {
                    continue;
                }
                tracing::info!("Found battery at {}", path.display());
                battery_path = Some(path);
            } else if charger_path.is_none()
                && (psu_type == "usb" || psu_type == "mains" || name.contains("charger"))
            {
                tracing::info!("Found charger at {}", path.display());
                charger_path = Some(path);
            }
        }

        Ok(battery_path.map(|battery| Self::new(battery, charger_path)))
    }

    pub fn battery_path(&self) -> &Path {
        &self.battery_path
    }

    /// Read the battery into a [`BatteryState`]
    pub fn read_state(&self) -> Result<BatteryState, PlatformError> {
        let level = self.read_level()?;
        let status = read_trimmed(&self.battery_path.join("status")).unwrap_or_default();

        let charging = match status.as_str() {
            "Charging" => true,
            "Discharging" | "Not charging" => false,
            // A full battery on a connected charger counts as charging
            _ => self.is_charger_connected(),
        };

        let (charging_time, discharging_time) = if charging {
            let to_full = if status == "Full" {
                0.0
            } else {
                self.time_to_full().unwrap_or(UNBOUNDED)
            };
            (to_full, UNBOUNDED)
        } else {
            (UNBOUNDED, self.time_to_empty().unwrap_or(UNBOUNDED))
        };

        Ok(BatteryState {
            level,
            charging,
            charging_time,
            discharging_time,
        })
    }

    fn read_level(&self) -> Result<f64, PlatformError> {
        let capacity_path = self.battery_path.join("capacity");
        if let Some(capacity) = read_sysfs_int(&capacity_path) {
            return Ok(capacity as f64 / 100.0);
        }

        let ratio = |now: &str, full: &str| {
            let now = read_sysfs_int(&self.battery_path.join(now))?;
            let full = read_sysfs_int(&self.battery_path.join(full))?;
            (full > 0).then(|| now as f64 / full as f64)
        };

        let level =
            ratio("energy_now", "energy_full").or_else(|| ratio("charge_now", "charge_full"));
        if let Some(level) = level {
            return Ok(level.clamp(0.0, 1.0));
        }

        // Nothing usable, report why the primary attribute failed
        fs::read_to_string(&capacity_path)
            .map_err(|source| PlatformError::Read {
                path: capacity_path.clone(),
                source,
            })
            .and_then(|raw| {
                Err(PlatformError::AcquisitionFailed(format!(
                    "unparseable capacity {:?} in {}",
                    raw.trim(),
                    capacity_path.display()
                )))
            })
    }

    fn time_to_full(&self) -> Option<f64> {
        if let Some(secs) = read_sysfs_int(&self.battery_path.join("time_to_full_now")) {
            return Some(secs as f64);
        }
        self.estimate(|now, full| full - now)
    }

    fn time_to_empty(&self) -> Option<f64> {
        if let Some(secs) = read_sysfs_int(&self.battery_path.join("time_to_empty_now")) {
            return Some(secs as f64);
        }
        self.estimate(|now, _| now)
    }

    /// Seconds left at the present rate, using energy or charge counters
    fn estimate(&self, remaining: impl Fn(f64, f64) -> f64) -> Option<f64> {
        let pairs = [
            ("energy_now", "energy_full", "power_now"),
            ("charge_now", "charge_full", "current_now"),
        ];

        pairs.iter().find_map(|(now, full, rate)| {
            let now = read_sysfs_int(&self.battery_path.join(now))? as f64;
            let full = read_sysfs_int(&self.battery_path.join(full))? as f64;
            // Some drivers report a signed rate
            let rate = (read_sysfs_int(&self.battery_path.join(rate))? as f64).abs();
            if rate == 0.0 {
                return None;
            }
            let hours = remaining(now, full).max(0.0) / rate;
            Some(hours * 3600.0)
        })
    }

    /// Check if charger is connected
    pub fn is_charger_connected(&self) -> bool {
        // Check charger online status
        if let Some(charger) = &self.charger_path {
            if let Some(online) = read_sysfs_int(&charger.join("online")) {
                return online == 1;
            }
        }

        // Fallback: check battery status
        matches!(
            read_trimmed(&self.battery_path.join("status")).as_deref(),
            Some("Charging") | Some("Full")
        )
    }
}

/// Read integer from sysfs file
fn read_sysfs_int(path: &Path) -> Option<i64> {
    fs::read_to_string(path)
        .ok()
        .and_then(|s| s.trim().parse().ok())
}

fn read_trimmed(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok().map(|s| s.trim().to_string())
}

/// Battery platform backed by Linux sysfs
///
/// sysfs does not push notifications, so the live handle is fed by a poller
/// that only publishes readings that differ from the previous one.
#[derive(Debug, Clone)]
pub struct SysfsPlatform {
    reader: Option<PowerSupplyReader>,
    poll_interval: Duration,
}

impl SysfsPlatform {
    /// Detect the battery under `power_supply_dir`
    pub fn detect(power_supply_dir: &Path, poll_interval: Duration) -> Self {
        let reader = match PowerSupplyReader::detect(power_supply_dir) {
            Ok(reader) => reader,
            Err(e) => {
                tracing::warn!("Failed to scan {}: {}", power_supply_dir.display(), e);
                None
            }
        };

        if reader.is_none() {
            tracing::info!("No battery found under {}", power_supply_dir.display());
        }

        Self {
            reader,
            poll_interval,
        }
    }

    /// Detect under the standard sysfs location with a one second poll
    pub fn detect_default() -> Self {
        Self::detect(Path::new(POWER_SUPPLY_DIR), Duration::from_secs(1))
    }
}

impl BatteryPlatform for SysfsPlatform {
    fn name(&self) -> &str {
        "sysfs"
    }

    fn is_supported(&self) -> bool {
        self.reader.is_some()
    }

    fn acquire(&self) -> BoxFuture<'static, Result<LiveBattery, PlatformError>> {
        let reader = self.reader.clone();
        let poll_interval = self.poll_interval;

        Box::pin(async move {
            let reader = reader.ok_or(PlatformError::CapabilityAbsent)?;
            let initial = reader.read_state()?;

            let (tx, rx) = watch::channel(initial);
            tokio::spawn(poll_power_supply(reader, tx, poll_interval));

            Ok(LiveBattery::new(rx))
        })
    }
}

/// Publish fresh readings until every handle is dropped
async fn poll_power_supply(
    reader: PowerSupplyReader,
    tx: watch::Sender<BatteryState>,
    poll_interval: Duration,
) {
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // First tick completes immediately and the initial value is already published
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = tx.closed() => break,
            _ = ticker.tick() => {
                match reader.read_state() {
                    Ok(state) => {
                        tx.send_if_modified(|current| {
                            if *current == state {
                                false
                            } else {
                                *current = state;
                                true
                            }
                        });
                    }
                    Err(e) => tracing::debug!("Battery poll failed: {}", e),
                }
            }
        }
    }

    tracing::debug!("Battery poller for {} stopped", reader.battery_path.display());
}
