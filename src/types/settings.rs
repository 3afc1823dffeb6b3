use serde::{Deserialize, Serialize};

use super::dom::FeedSelector;
use super::errors::SettingsError;

/// Top-level tracker settings container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TrackerSettings {
    pub dwell: DwellSettings,
    pub store: StoreSettings,
    pub feed: FeedSettings,
    pub affordance: AffordanceSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl TrackerSettings {
    /// Rejects values the engine cannot run with.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.dwell.dwell_ms == 0 {
            return Err(SettingsError::InvalidValue(
                "dwell.dwell_ms must be greater than zero".to_string(),
            ));
        }
        let threshold = self.dwell.visibility_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(SettingsError::InvalidValue(format!(
                "dwell.visibility_threshold must be in (0, 1], got {}",
                threshold
            )));
        }
        if self.store.max_ids == 0 {
            return Err(SettingsError::InvalidValue(
                "store.max_ids must be at least 1".to_string(),
            ));
        }
        if self.store.read_ids_key == self.store.enabled_key {
            return Err(SettingsError::InvalidValue(
                "store.read_ids_key and store.enabled_key must differ".to_string(),
            ));
        }
        if self.feed.selector.item_tag.is_empty() || self.feed.selector.id_attribute.is_empty() {
            return Err(SettingsError::InvalidValue(
                "feed.selector fields cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Dwell detection settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DwellSettings {
    /// How long an item must stay visible to count as read.
    pub dwell_ms: u64,
    /// Minimum visible fraction for an item to count as in the viewport.
    pub visibility_threshold: f64,
}

impl Default for DwellSettings {
    fn default() -> Self {
        Self {
            dwell_ms: 1000,
            visibility_threshold: 0.01,
        }
    }
}

/// Read store capacity and storage keys.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreSettings {
    pub max_ids: usize,
    pub read_ids_key: String,
    pub enabled_key: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            max_ids: 1000,
            read_ids_key: "gm-read-posts".to_string(),
            enabled_key: "gm-hide-enabled".to_string(),
        }
    }
}

/// How feed items are found in the document and hidden.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedSettings {
    pub selector: FeedSelector,
    pub hidden_class: String,
    /// Delay before the first whole-document sweep.
    pub settle_delay_ms: u64,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            selector: FeedSelector::default(),
            hidden_class: "gm-post-hidden".to_string(),
            settle_delay_ms: 1000,
        }
    }
}

/// Where the toggle affordance goes and how often insertion is retried.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AffordanceSettings {
    /// Class carried by every tab of the host navigation panel.
    pub panel_tab_class: String,
    /// `href` of the panel tab the affordance is inserted after.
    pub anchor_href: String,
    pub affordance_id: String,
    pub retry_schedule_ms: Vec<u64>,
}

impl Default for AffordanceSettings {
    fn default() -> Self {
        Self {
            panel_tab_class: "drawer__tab".to_string(),
            anchor_href: "/auth/sign_out".to_string(),
            affordance_id: "gm-hide-btn".to_string(),
            retry_schedule_ms: vec![500, 2000, 5000],
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
