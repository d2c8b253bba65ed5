//! Device model.

use serde::{Deserialize, Serialize};

use crate::timestamp::LastSeen;

/// A Mac enrolled in a Workbrew workspace.
///
/// Returned by `devices.json`. Both timestamp fields report `"Never"` for
/// devices that have not checked in or run a command yet.
///
/// # Example
///
/// ```
/// use brewapi::Device;
///
/// let device: Device = serde_json::from_str(r#"{
///     "serial_number": "C02XK1ABCD",
///     "last_seen_at": "Never",
///     "command_last_run_at": "Never"
/// }"#).unwrap();
/// assert!(!device.has_been_seen());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    /// Hardware serial number.
    pub serial_number: String,

    /// Device groups the device belongs to.
    #[serde(default)]
    pub groups: Vec<String>,

    /// User or device name reported by MDM.
    #[serde(default)]
    pub mdm_user_or_device_name: Option<String>,

    /// Device type (e.g., "MacBook Pro").
    #[serde(default)]
    pub device_type: Option<String>,

    /// macOS version.
    #[serde(default)]
    pub os_version: Option<String>,

    /// Homebrew installation prefix.
    #[serde(default)]
    pub homebrew_prefix: Option<String>,

    /// Installed Homebrew version.
    #[serde(default)]
    pub homebrew_version: Option<String>,

    /// Installed formula count.
    #[serde(default)]
    pub formulae_count: u32,

    /// Installed cask count.
    #[serde(default)]
    pub casks_count: u32,

    /// Last check-in.
    pub last_seen_at: LastSeen,

    /// Last brew command run.
    pub command_last_run_at: LastSeen,
}

impl Device {
    /// Whether the device has ever checked in.
    pub fn has_been_seen(&self) -> bool {
        self.last_seen_at.has_timestamp()
    }

    /// Whether the device has ever run a brew command.
    pub fn has_run_command(&self) -> bool {
        self.command_last_run_at.has_timestamp()
    }

    /// Whether the device is in the named group.
    pub fn is_in_group(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }
}
