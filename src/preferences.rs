// SPDX-License-Identifier: GPL-3.0-only

//! Camera preference model consumed by the overlay
//!
//! A [`ListPreference`] is an enumerated setting: labels, the values they map
//! to, the current value and (for icon preferences) one icon per entry.

use crate::constants::keys;
use crate::errors::{HudError, HudResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// One enumerated setting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListPreference {
    pub key: String,
    pub title: String,
    /// Human-readable labels
    pub entries: Vec<String>,
    /// Stored values, parallel to `entries`
    pub entry_values: Vec<String>,
    pub value: String,
    /// Icon resource per entry; empty for plain list preferences
    #[serde(default)]
    pub icons: Vec<String>,
}

impl ListPreference {
    pub fn new(key: &str, title: &str) -> Self {
        Self {
            key: key.to_string(),
            title: title.to_string(),
            entries: Vec::new(),
            entry_values: Vec::new(),
            value: String::new(),
            icons: Vec::new(),
        }
    }

    /// Add `(label, value)` entries; the first becomes the current value if none is set
    pub fn with_entries(mut self, entries: &[(&str, &str)]) -> Self {
        for (label, value) in entries {
            self.entries.push(label.to_string());
            self.entry_values.push(value.to_string());
        }
        if self.value.is_empty()
            && let Some(first) = self.entry_values.first()
        {
            self.value = first.clone();
        }
        self
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self
    }

    pub fn with_icons(mut self, icons: &[&str]) -> Self {
        self.icons = icons.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Whether this preference carries one icon per entry
    pub fn is_icon_preference(&self) -> bool {
        !self.icons.is_empty() && self.icons.len() == self.entry_values.len()
    }

    pub fn has_entries(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn find_index_of_value(&self, value: &str) -> Option<usize> {
        self.entry_values.iter().position(|v| v == value)
    }

    pub fn current_index(&self) -> Option<usize> {
        self.find_index_of_value(&self.value)
    }

    /// Label shown for `value`, if it is one of the entry values
    pub fn entry_for(&self, value: &str) -> Option<&str> {
        self.find_index_of_value(value)
            .and_then(|i| self.entries.get(i))
            .map(String::as_str)
    }

    pub fn icon_for(&self, value: &str) -> Option<&str> {
        self.find_index_of_value(value)
            .and_then(|i| self.icons.get(i))
            .map(String::as_str)
    }

    /// Change the current value; unknown values are rejected
    pub fn set_value(&mut self, value: &str) -> HudResult<()> {
        if self.find_index_of_value(value).is_none() {
            return Err(HudError::Preferences(format!(
                "{} has no entry value {:?}",
                self.key, value
            )));
        }
        self.value = value.to_string();
        Ok(())
    }

    /// Check that the parallel lists line up and `value` is one of the entry values
    pub fn validate(&self) -> HudResult<()> {
        if self.entries.len() != self.entry_values.len() {
            return Err(HudError::Preferences(format!(
                "{} has {} entries but {} entry values",
                self.key,
                self.entries.len(),
                self.entry_values.len()
            )));
        }
        if self.has_entries() && self.current_index().is_none() {
            return Err(HudError::Preferences(format!(
                "{} value {:?} is not an entry value",
                self.key, self.value
            )));
        }
        if !self.icons.is_empty() && self.icons.len() != self.entry_values.len() {
            return Err(HudError::Preferences(format!(
                "{} has {} icons for {} entries",
                self.key,
                self.icons.len(),
                self.entry_values.len()
            )));
        }
        Ok(())
    }
}

/// Ordered set of preferences for one camera session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceGroup {
    #[serde(default)]
    pub title: String,
    pub preferences: Vec<ListPreference>,
}

impl PreferenceGroup {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            preferences: Vec::new(),
        }
    }

    /// Add a preference, replacing any with the same key
    pub fn insert(&mut self, preference: ListPreference) {
        match self.find_mut(&preference.key) {
            Some(existing) => *existing = preference,
            None => self.preferences.push(preference),
        }
    }

    pub fn with(mut self, preference: ListPreference) -> Self {
        self.insert(preference);
        self
    }

    pub fn find(&self, key: &str) -> Option<&ListPreference> {
        self.preferences.iter().find(|p| p.key == key)
    }

    pub fn find_mut(&mut self, key: &str) -> Option<&mut ListPreference> {
        self.preferences.iter_mut().find(|p| p.key == key)
    }

    /// Preference under `key` if it exists and has at least one entry
    pub fn find_list(&self, key: &str) -> Option<&ListPreference> {
        self.find(key).filter(|p| p.has_entries())
    }

    /// Like [`find_list`](Self::find_list), additionally requiring icons
    pub fn find_icon(&self, key: &str) -> Option<&ListPreference> {
        self.find_list(key).filter(|p| p.is_icon_preference())
    }

    /// Non-empty preferences for `keys`, in the order of `keys`
    pub fn list_preferences(&self, keys: &[&str]) -> Vec<ListPreference> {
        keys.iter()
            .filter_map(|key| self.find_list(key))
            .cloned()
            .collect()
    }

    pub fn load(path: &Path) -> HudResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let group = Self::from_json(&contents)?;
        info!(
            path = %path.display(),
            count = group.preferences.len(),
            "Loaded preference group"
        );
        Ok(group)
    }

    pub fn from_json(json: &str) -> HudResult<Self> {
        let group: Self =
            serde_json::from_str(json).map_err(|e| HudError::Preferences(e.to_string()))?;
        for preference in &group.preferences {
            preference.validate()?;
        }
        Ok(group)
    }

    /// Typical still-camera preference set
    pub fn camera_defaults() -> Self {
        Self::new("Camera settings")
            .with(
                ListPreference::new(keys::KEY_FLASH_MODE, "Flash mode")
                    .with_entries(&[("Auto", "auto"), ("On", "on"), ("Off", "off")])
                    .with_icons(&[
                        "ic_viewfinder_flash_auto",
                        "ic_viewfinder_flash_on",
                        "ic_viewfinder_flash_off",
                    ]),
            )
            .with(
                ListPreference::new(keys::KEY_WHITE_BALANCE, "White balance")
                    .with_entries(&[
                        ("Auto", "auto"),
                        ("Incandescent", "incandescent"),
                        ("Daylight", "daylight"),
                        ("Fluorescent", "fluorescent"),
                        ("Cloudy", "cloudy-daylight"),
                    ])
                    .with_icons(&[
                        "ic_viewfinder_wb_auto",
                        "ic_viewfinder_wb_incandescent",
                        "ic_viewfinder_wb_daylight",
                        "ic_viewfinder_wb_fluorescent",
                        "ic_viewfinder_wb_cloudy",
                    ]),
            )
            .with(
                ListPreference::new(keys::KEY_RECORD_LOCATION, "Store location")
                    .with_entries(&[("Off", "off"), ("On", "on")])
                    .with_icons(&["ic_viewfinder_gps_off", "ic_viewfinder_gps_on"]),
            )
            .with(
                ListPreference::new(keys::KEY_FOCUS_MODE, "Focus mode")
                    .with_entries(&[("Auto", "auto"), ("Infinity", "infinity"), ("Macro", "macro")]),
            )
            .with(
                ListPreference::new(keys::KEY_SCENE_MODE, "Scene mode")
                    .with_entries(&[
                        ("Auto", "auto"),
                        ("Action", "action"),
                        ("Portrait", "portrait"),
                        ("Landscape", "landscape"),
                        ("Night", "night"),
                    ]),
            )
            .with(
                ListPreference::new(keys::KEY_PICTURE_SIZE, "Picture size")
                    .with_entries(&[
                        ("5M pixels", "2592x1936"),
                        ("3M pixels", "2048x1536"),
                        ("2M pixels", "1600x1200"),
                        ("1M pixels", "1024x768"),
                    ]),
            )
            .with(
                ListPreference::new(keys::KEY_JPEG_QUALITY, "Picture quality")
                    .with_entries(&[("Super fine", "superfine"), ("Fine", "fine"), ("Normal", "normal")]),
            )
            .with(
                ListPreference::new(keys::KEY_COLOR_EFFECT, "Color effect")
                    .with_entries(&[
                        ("None", "none"),
                        ("Mono", "mono"),
                        ("Sepia", "sepia"),
                        ("Negative", "negative"),
                    ]),
            )
    }
}
