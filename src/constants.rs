// SPDX-License-Identifier: GPL-3.0-only

//! Overlay-wide constants

use std::time::Duration;

/// Delay before an idle popup window is hidden
pub const HIDE_POPUP_WINDOW_DELAY: Duration = Duration::from_millis(2000);

/// Delay before an idle indicator bar loses its highlight
pub const DEACTIVATE_INDICATOR_BAR_DELAY: Duration = Duration::from_millis(3000);

/// Fade-in played on the popup when the device rotates while it is open
pub const ORIENTATION_FADE_DURATION: Duration = Duration::from_millis(250);

/// Fade used by the popup's own popup/popoff transitions
pub const POPUP_TRANSITION_DURATION: Duration = Duration::from_millis(150);

/// Name of the dedicated timer thread
pub const TIMER_THREAD_NAME: &str = "UI Timer";

/// Layout constants (density-independent pixels unless noted)
pub mod ui {
    /// Gap between the indicator bar and the right edge of the overlay
    pub const INDICATOR_BAR_RIGHT_MARGIN: u32 = 15;

    /// How far the popup window overlaps the left edge of the selected indicator (px)
    pub const POPUP_WINDOW_OVERLAP: i32 = 30;

    /// Popup window may use at most this share of the overlay height
    pub const MAX_HEIGHT_RATIO: f32 = 0.8;

    /// Popup window may use at most this share of the overlay width
    pub const MAX_WIDTH_RATIO: f32 = 0.8;

    /// Preferred width of the indicator bar (one icon column)
    pub const INDICATOR_ICON_SIZE: u32 = 64;

    /// Height of one option row in the popup content
    pub const POPUP_ROW_HEIGHT: u32 = 48;

    /// Approximate glyph advance used to size popup rows
    pub const POPUP_CHAR_WIDTH: u32 = 10;

    /// Inner padding of the popup content
    pub const POPUP_PADDING: u32 = 12;

    /// Vertical offset of the anchor triangle inside its texture (px)
    pub const POPUP_ANCHOR_OFFSET: i32 = 23;
}

/// Preference keys the overlay knows how to display
pub mod keys {
    pub const KEY_FLASH_MODE: &str = "pref_camera_flashmode_key";
    pub const KEY_WHITE_BALANCE: &str = "pref_camera_whitebalance_key";
    pub const KEY_RECORD_LOCATION: &str = "pref_camera_recordlocation_key";
    pub const KEY_FOCUS_MODE: &str = "pref_camera_focusmode_key";
    pub const KEY_SCENE_MODE: &str = "pref_camera_scenemode_key";
    pub const KEY_PICTURE_SIZE: &str = "pref_camera_picturesize_key";
    pub const KEY_JPEG_QUALITY: &str = "pref_camera_jpegquality_key";
    pub const KEY_COLOR_EFFECT: &str = "pref_camera_coloreffect_key";

    /// Preferences bundled behind the "other settings" indicator, in display order
    pub const OTHER_SETTINGS_KEYS: [&str; 5] = [
        KEY_FOCUS_MODE,
        KEY_SCENE_MODE,
        KEY_PICTURE_SIZE,
        KEY_JPEG_QUALITY,
        KEY_COLOR_EFFECT,
    ];
}

/// Texture resource names used for decoration
pub mod resources {
    pub const MENU_POPUP: &str = "menu_popup";
    pub const MENU_POPUP_TRIANGLE: &str = "menu_popup_triangle";
    pub const ICON_BAR: &str = "ic_viewfinder_iconbar";
    pub const ICON_BAR_HIGHLIGHT: &str = "ic_viewfinder_iconbar_highlight";
    pub const OTHER_SETTINGS_ICON: &str = "ic_viewfinder_settings";
    pub const GPS_ON_ICON: &str = "ic_viewfinder_gps_on";
    pub const GPS_NO_SIGNAL_ICON: &str = "ic_viewfinder_gps_no_signal";
    pub const GPS_OFF_ICON: &str = "ic_viewfinder_gps_off";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deactivate_outlasts_hide() {
        assert!(DEACTIVATE_INDICATOR_BAR_DELAY > HIDE_POPUP_WINDOW_DELAY);
    }

    #[test]
    fn test_popup_ratios_are_fractions() {
        assert!(ui::MAX_WIDTH_RATIO > 0.0 && ui::MAX_WIDTH_RATIO <= 1.0);
        assert!(ui::MAX_HEIGHT_RATIO > 0.0 && ui::MAX_HEIGHT_RATIO <= 1.0);
    }
}
