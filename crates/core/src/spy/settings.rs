use serde::{Deserialize, Deserializer};

use crate::settings::{self, SettingsError, lenient_number};

/// Options for [`super::ScrollSpy`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpySettings {
    /// Navigation links to track.
    pub selector: String,
    /// Fixed header whose height is subtracted from every distance.
    pub selector_header: String,
    /// Extra pixels subtracted from every distance. Numeric strings are
    /// accepted.
    #[serde(deserialize_with = "lenient_offset")]
    pub offset: f64,
    pub active_class: String,
    /// Recompute and activate only once scrolling stops, instead of
    /// throttling while it happens.
    pub scroll_delay: bool,
}

impl Default for SpySettings {
    fn default() -> Self {
        Self {
            selector: "[data-gumshoe] a".to_string(),
            selector_header: "[data-gumshoe-header]".to_string(),
            offset: 0.0,
            active_class: "active".to_string(),
            scroll_delay: false,
        }
    }
}

impl SpySettings {
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        settings::from_json(json)
    }
}

fn lenient_offset<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_number(deserializer)?.unwrap_or(0.0))
}
