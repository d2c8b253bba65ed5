//! Brew command model.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::timestamp::ProgressTimestamp;

/// A brew command scheduled against one or more devices.
///
/// Returned by `brew_commands.json`. `started_at` is `"Not Started"` until
/// the first device picks the command up and `finished_at` is
/// `"Not Finished"` while it is still running.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrewCommand {
    /// The brew invocation, e.g. `brew upgrade --greedy`.
    pub command: String,

    /// Unique label.
    pub label: String,

    /// Who last edited the command.
    #[serde(default)]
    pub last_updated_by_user: Option<String>,

    /// Serial numbers of the targeted devices.
    #[serde(default)]
    pub devices: Vec<String>,

    /// How many times the command has run.
    #[serde(default)]
    pub run_count: u32,

    /// When the command first started.
    pub started_at: ProgressTimestamp,

    /// When the command finished.
    pub finished_at: ProgressTimestamp,
}

impl BrewCommand {
    /// Not yet picked up by any device.
    pub fn is_pending(&self) -> bool {
        !self.started_at.has_timestamp()
    }

    /// Started but not finished.
    pub fn is_running(&self) -> bool {
        self.started_at.has_timestamp() && !self.finished_at.has_timestamp()
    }

    /// Has a finish time.
    pub fn is_complete(&self) -> bool {
        self.finished_at.has_timestamp()
    }

    /// Wall time between start and finish, when both are known.
    pub fn duration(&self) -> Option<Duration> {
        Some(self.finished_at.timestamp()? - self.started_at.timestamp()?)
    }
}
