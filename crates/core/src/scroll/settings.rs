use std::fmt;
use std::rc::Rc;

use serde::Deserialize;

use crate::settings::{self, SettingsError, lenient_number};

/// Pixels kept between the fixed header and the scroll target.
#[derive(Clone)]
pub enum Offset {
    Pixels(f64),
    /// Evaluated each time an animation starts.
    Computed(Rc<dyn Fn() -> f64>),
}

impl Offset {
    /// Whole pixels, truncated toward zero.
    pub fn resolve(&self) -> f64 {
        match self {
            Offset::Pixels(px) => px.trunc(),
            Offset::Computed(f) => f().trunc(),
        }
    }
}

impl Default for Offset {
    fn default() -> Self {
        Offset::Pixels(0.0)
    }
}

impl fmt::Debug for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Offset::Pixels(px) => f.debug_tuple("Pixels").field(px).finish(),
            Offset::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// Effective options of a [`super::SmoothScroller`].
#[derive(Debug, Clone)]
pub struct ScrollSettings {
    /// Links that trigger an animated scroll.
    pub selector: String,
    /// Clicks inside elements matching this are left alone.
    pub ignore: String,
    /// Fixed header whose height (plus its own offset) is kept clear.
    pub selector_header: Option<String>,
    /// Animation duration in milliseconds.
    pub speed: f64,
    pub offset: Offset,
    /// Name looked up in the easing table.
    pub easing: String,
}

impl Default for ScrollSettings {
    fn default() -> Self {
        Self {
            selector: "[data-scroll]".to_string(),
            ignore: "[data-scroll-ignore]".to_string(),
            selector_header: None,
            speed: 500.0,
            offset: Offset::default(),
            easing: "easeInOutCubic".to_string(),
        }
    }
}

impl ScrollSettings {
    /// Defaults overlaid with a JSON options object.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(Self::default().merged(&ScrollOverrides::from_json(json)?))
    }

    /// A copy with every field present in `overrides` replaced.
    pub fn merged(&self, overrides: &ScrollOverrides) -> Self {
        let mut merged = self.clone();
        if let Some(selector) = &overrides.selector {
            merged.selector.clone_from(selector);
        }
        if let Some(ignore) = &overrides.ignore {
            merged.ignore.clone_from(ignore);
        }
        if let Some(header) = &overrides.selector_header {
            merged.selector_header = Some(header.clone());
        }
        if let Some(speed) = overrides.speed {
            merged.speed = speed;
        }
        if let Some(offset) = overrides.offset {
            merged.offset = Offset::Pixels(offset);
        }
        if let Some(easing) = &overrides.easing {
            merged.easing.clone_from(easing);
        }
        merged
    }
}

/// Partial options as written in JSON: init options or a link's
/// `data-options` attribute.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScrollOverrides {
    pub selector: Option<String>,
    pub ignore: Option<String>,
    pub selector_header: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    pub speed: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub offset: Option<f64>,
    pub easing: Option<String>,
}

impl ScrollOverrides {
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        settings::from_json(json)
    }
}
