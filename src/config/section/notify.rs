//! `notify` section configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Desktop notification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// Show a notification after each successful build.
    pub enable: bool,

    /// Notification title.
    pub title: String,

    /// Advisory display time, passed to the notification backend.
    pub timeout_ms: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            enable: true,
            title: "Fern".into(),
            timeout_ms: 1500,
        }
    }
}

impl NotifyConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
