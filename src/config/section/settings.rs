//! `settings` section configuration.
//!
//! The product configs carry many more keys here (channel, name, homepage,
//! ...); only the addon id is read by fern.

use serde::{Deserialize, Serialize};

/// Fallback addon id when `settings.id` is not configured.
pub const DEFAULT_ADDON_ID: &str = "cliqz@cliqz.com";

/// Extension metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsConfig {
    /// Browser addon id.
    pub id: Option<String>,
}

impl SettingsConfig {
    /// Addon id, falling back to [`DEFAULT_ADDON_ID`].
    pub fn addon_id(&self) -> &str {
        self.id.as_deref().unwrap_or(DEFAULT_ADDON_ID)
    }
}
