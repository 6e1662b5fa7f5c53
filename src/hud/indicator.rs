// SPDX-License-Identifier: GPL-3.0-only

//! Indicator entries shown in the indicator bar

use super::popup::{PopupContent, PopupOption, PopupSection};
use crate::constants::resources;
use crate::errors::{HudError, HudResult};
use crate::preferences::ListPreference;
use crate::scene::{MeasureSpec, Node, Rect, Size, TouchEvent};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// What an indicator represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IndicatorKind {
    /// A single icon preference (flash, white balance, ...)
    Basic,
    /// The record-location preference plus live GPS signal state
    Gps,
    /// Several list preferences bundled behind one icon
    OtherSettings,
}

/// One selectable icon in the bar
#[derive(Debug, Clone)]
pub struct Indicator {
    kind: IndicatorKind,
    preferences: Vec<ListPreference>,
    /// Values forced by the camera for the current mode, keyed by preference key
    overrides: HashMap<String, String>,
    has_signal: bool,
    icon_size: i32,
    measured: Size,
    bounds: Rect,
}

impl Indicator {
    fn new(kind: IndicatorKind, preferences: Vec<ListPreference>) -> Self {
        Self {
            kind,
            preferences,
            overrides: HashMap::new(),
            has_signal: false,
            icon_size: 0,
            measured: Size::ZERO,
            bounds: Rect::default(),
        }
    }

    pub fn basic(preference: ListPreference) -> Self {
        Self::new(IndicatorKind::Basic, vec![preference])
    }

    pub fn gps(preference: ListPreference) -> Self {
        Self::new(IndicatorKind::Gps, vec![preference])
    }

    pub fn other_settings(preferences: Vec<ListPreference>) -> Self {
        Self::new(IndicatorKind::OtherSettings, preferences)
    }

    pub fn kind(&self) -> IndicatorKind {
        self.kind
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.preferences.iter().map(|p| p.key.as_str())
    }

    pub fn is_bound_to(&self, key: &str) -> bool {
        self.preferences.iter().any(|p| p.key == key)
    }

    pub fn preference(&self, key: &str) -> Option<&ListPreference> {
        self.preferences.iter().find(|p| p.key == key)
    }

    pub fn preferences(&self) -> &[ListPreference] {
        &self.preferences
    }

    /// Force `key` to display `value`; returns false if the key is not bound here
    pub fn override_setting(&mut self, key: &str, value: &str) -> bool {
        if !self.is_bound_to(key) {
            return false;
        }
        debug!(key, value, "Overriding setting");
        self.overrides.insert(key.to_string(), value.to_string());
        true
    }

    /// Drop the override for `key`; returns false if there was none
    pub fn restore_setting(&mut self, key: &str) -> bool {
        self.overrides.remove(key).is_some()
    }

    pub fn overridden_value(&self, key: &str) -> Option<&str> {
        self.overrides.get(key).map(String::as_str)
    }

    /// Value shown for `key`: the override if present, else the stored value
    pub fn effective_value(&self, key: &str) -> Option<&str> {
        self.overridden_value(key)
            .or_else(|| self.preference(key).map(|p| p.value.as_str()))
    }

    /// Change the stored value of a bound, non-overridden preference
    pub fn set_value(&mut self, key: &str, value: &str) -> HudResult<()> {
        if self.overrides.contains_key(key) {
            return Err(HudError::InvalidArgument(format!(
                "{} is overridden and cannot be changed",
                key
            )));
        }
        let preference = self
            .preferences
            .iter_mut()
            .find(|p| p.key == key)
            .ok_or_else(|| HudError::InvalidArgument(format!("{} is not shown here", key)))?;
        preference.set_value(value)
    }

    pub fn has_signal(&self) -> bool {
        self.has_signal
    }

    pub fn set_has_signal(&mut self, has_signal: bool) {
        self.has_signal = has_signal;
    }

    /// Icon resource currently displayed
    pub fn icon(&self) -> &str {
        match self.kind {
            IndicatorKind::OtherSettings => resources::OTHER_SETTINGS_ICON,
            IndicatorKind::Gps => {
                let recording = self
                    .preferences
                    .first()
                    .and_then(|p| self.effective_value(&p.key))
                    .is_some_and(|v| v == "on");
                if !recording {
                    resources::GPS_OFF_ICON
                } else if self.has_signal {
                    resources::GPS_ON_ICON
                } else {
                    resources::GPS_NO_SIGNAL_ICON
                }
            }
            IndicatorKind::Basic => self
                .preferences
                .first()
                .and_then(|p| {
                    self.effective_value(&p.key)
                        .and_then(|value| p.icon_for(value))
                })
                .unwrap_or_default(),
        }
    }

    /// Content the popup shows while this indicator is selected
    pub fn popup_content(&self) -> PopupContent {
        let sections = self
            .preferences
            .iter()
            .map(|preference| {
                let overridden = self.overrides.contains_key(&preference.key);
                let current = self.effective_value(&preference.key).unwrap_or_default();
                let options = preference
                    .entries
                    .iter()
                    .zip(&preference.entry_values)
                    .map(|(label, value)| PopupOption {
                        label: label.clone(),
                        value: value.clone(),
                        selected: value == current,
                        enabled: !overridden,
                    })
                    .collect();
                PopupSection {
                    key: preference.key.clone(),
                    title: preference.title.clone(),
                    options,
                }
            })
            .collect();
        PopupContent::new(sections)
    }

    pub(crate) fn set_icon_size(&mut self, icon_size: i32) {
        self.icon_size = icon_size;
    }
}

impl Node for Indicator {
    fn measure(&mut self, width: MeasureSpec, height: MeasureSpec) -> Size {
        self.measured = Size::new(width.resolve(self.icon_size), height.resolve(self.icon_size));
        self.measured
    }

    fn measured_size(&self) -> Size {
        self.measured
    }

    fn layout(&mut self, bounds: Rect) {
        self.bounds = bounds;
    }

    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn dispatch_touch(&mut self, _event: &TouchEvent) -> bool {
        // Selection is handled by the bar
        false
    }
}
