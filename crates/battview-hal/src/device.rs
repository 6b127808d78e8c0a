//! Host identification and platform errors
//!
//! Builds the short device label shown next to the battery, using the device
//! tree or DMI tables and falling back to the kernel's uname.

use std::fs;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("Battery status query is not available on this system")]
    CapabilityAbsent,

    #[error("Battery acquisition failed: {0}")]
    AcquisitionFailed(String),

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Battery source closed")]
    SourceClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// What the host tells us about itself
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostInfo {
    /// Hardware model (device tree model or DMI product name)
    pub model: Option<String>,
    /// Operating system name and kernel release
    pub os: Option<String>,
}

impl HostInfo {
    /// Gather host information from sysfs and uname
    pub fn gather() -> Self {
        let model = read_device_tree_string("/sys/firmware/devicetree/base/model")
            .or_else(|| read_device_tree_string("/proc/device-tree/model"))
            .or_else(|| read_file_trimmed("/sys/devices/virtual/dmi/id/product_name"))
            .filter(|m| !m.is_empty() && m != "System Product Name");

        let os = nix::sys::utsname::uname().ok().map(|uts| {
            format!(
                "{} {}",
                uts.sysname().to_string_lossy(),
                uts.release().to_string_lossy()
            )
        });

        Self { model, os }
    }

    /// Label for display: model first, then OS, then a generic name
    pub fn label(&self) -> String {
        match (&self.model, &self.os) {
            (Some(model), Some(os)) => format!("{} ({})", model, os),
            (Some(model), None) => model.clone(),
            (None, Some(os)) => os.clone(),
            (None, None) => "Terminal".to_string(),
        }
    }
}

/// Short device label for the current host
pub fn host_label() -> String {
    HostInfo::gather().label()
}

/// Read a null-terminated string from device tree
fn read_device_tree_string(path: &str) -> Option<String> {
    let bytes = fs::read(path).ok()?;
    // Device tree strings are null-terminated
    let s = String::from_utf8_lossy(&bytes);
    Some(s.trim_matches('\0').trim().to_string())
}

/// Read and trim a text file
fn read_file_trimmed(path: &str) -> Option<String> {
    fs::read_to_string(path).ok().map(|s| s.trim().to_string())
}
