// SPDX-License-Identifier: GPL-3.0-only

use crate::constants::{self, ui};
use crate::errors::{HudError, HudResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Tunables for the head-up display
///
/// Every field has a default, so a config file only needs the values it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HudConfig {
    /// Display density (physical pixels per density-independent pixel)
    pub density: f32,
    /// Gap between the indicator bar and the right edge (dp)
    pub indicator_bar_right_margin: u32,
    /// Preferred indicator bar width (dp)
    pub indicator_icon_size: u32,
    /// How far the popup overlaps the selected indicator (px)
    pub popup_window_overlap: i32,
    /// Popup width cap as a share of the overlay width
    pub max_width_ratio: f32,
    /// Popup height cap as a share of the overlay height
    pub max_height_ratio: f32,
    /// Popup option row height (dp)
    pub popup_row_height: u32,
    /// Approximate glyph advance for sizing popup rows (dp)
    pub popup_char_width: u32,
    /// Popup content padding (dp)
    pub popup_padding: u32,
    /// Idle time before the popup hides (ms)
    pub hide_popup_delay_ms: u64,
    /// Idle time before the bar highlight clears (ms)
    pub deactivate_bar_delay_ms: u64,
    /// Fade-in played on rotation while the popup is open (ms)
    pub orientation_fade_ms: u64,
    /// Upper bound on how long a timer waits for the render thread (ms).
    /// `None` waits indefinitely.
    pub handoff_timeout_ms: Option<u64>,
}

impl Default for HudConfig {
    fn default() -> Self {
        Self {
            density: 1.0,
            indicator_bar_right_margin: ui::INDICATOR_BAR_RIGHT_MARGIN,
            indicator_icon_size: ui::INDICATOR_ICON_SIZE,
            popup_window_overlap: ui::POPUP_WINDOW_OVERLAP,
            max_width_ratio: ui::MAX_WIDTH_RATIO,
            max_height_ratio: ui::MAX_HEIGHT_RATIO,
            popup_row_height: ui::POPUP_ROW_HEIGHT,
            popup_char_width: ui::POPUP_CHAR_WIDTH,
            popup_padding: ui::POPUP_PADDING,
            hide_popup_delay_ms: constants::HIDE_POPUP_WINDOW_DELAY.as_millis() as u64,
            deactivate_bar_delay_ms: constants::DEACTIVATE_INDICATOR_BAR_DELAY.as_millis() as u64,
            orientation_fade_ms: constants::ORIENTATION_FADE_DURATION.as_millis() as u64,
            handoff_timeout_ms: None,
        }
    }
}

impl HudConfig {
    /// Default config file location (`$XDG_CONFIG_HOME/viewfinder-hud/config.json`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("viewfinder-hud").join("config.json"))
    }

    /// Load a config from a JSON file
    pub fn load(path: &Path) -> HudResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_json(&contents)?;
        info!(path = %path.display(), "Loaded HUD config");
        Ok(config)
    }

    /// Load from `path` if given, else from the default location if it
    /// exists, else fall back to defaults
    pub fn load_or_default(path: Option<&Path>) -> HudResult<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => {
                debug!("No HUD config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn from_json(json: &str) -> HudResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| HudError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the layout code cannot work with
    pub fn validate(&self) -> HudResult<()> {
        if !(self.density > 0.0) {
            return Err(HudError::Config(format!(
                "density must be positive, got {}",
                self.density
            )));
        }
        for (name, ratio) in [
            ("max_width_ratio", self.max_width_ratio),
            ("max_height_ratio", self.max_height_ratio),
        ] {
            if !(ratio > 0.0 && ratio <= 1.0) {
                return Err(HudError::Config(format!(
                    "{} must be in (0, 1], got {}",
                    name, ratio
                )));
            }
        }
        Ok(())
    }

    /// Scale a density-independent length to pixels (truncating)
    pub fn px(&self, dp: u32) -> i32 {
        (self.density * dp as f32) as i32
    }

    pub fn right_margin_px(&self) -> i32 {
        self.px(self.indicator_bar_right_margin)
    }

    pub fn hide_popup_delay(&self) -> Duration {
        Duration::from_millis(self.hide_popup_delay_ms)
    }

    pub fn deactivate_bar_delay(&self) -> Duration {
        Duration::from_millis(self.deactivate_bar_delay_ms)
    }

    pub fn orientation_fade(&self) -> Duration {
        Duration::from_millis(self.orientation_fade_ms)
    }

    pub fn handoff_timeout(&self) -> Option<Duration> {
        self.handoff_timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constants() {
        let config = HudConfig::default();
        assert_eq!(config.hide_popup_delay(), Duration::from_secs(2));
        assert_eq!(config.deactivate_bar_delay(), Duration::from_secs(3));
        assert_eq!(config.orientation_fade(), Duration::from_millis(250));
        assert_eq!(config.handoff_timeout(), None);
        assert_eq!(config.popup_window_overlap, 30);
    }

    #[test]
    fn test_right_margin_scales_with_density() {
        let config = HudConfig {
            density: 1.5,
            ..Default::default()
        };
        assert_eq!(config.right_margin_px(), 22);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = HudConfig::from_json(r#"{ "density": 2.0, "handoff_timeout_ms": 500 }"#)
            .unwrap();
        assert_eq!(config.density, 2.0);
        assert_eq!(config.handoff_timeout(), Some(Duration::from_millis(500)));
        assert_eq!(config.hide_popup_delay_ms, 2000);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            HudConfig::from_json(r#"{ "density": 0.0 }"#),
            Err(HudError::Config(_))
        ));
        assert!(matches!(
            HudConfig::from_json(r#"{ "max_width_ratio": 1.5 }"#),
            Err(HudError::Config(_))
        ));
        assert!(matches!(
            HudConfig::from_json("not json"),
            Err(HudError::Config(_))
        ));
    }
}
