// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for inspecting the overlay
//!
//! This module provides command-line functionality for:
//! - Loading the config and preference files named on the command line
//! - Printing a laid-out overlay as JSON

use std::path::Path;
use tracing::info;
use viewfinder_hud::hud::HeadUpDisplay;
use viewfinder_hud::preferences::PreferenceGroup;
use viewfinder_hud::scene::{Node, Rect, TouchEvent};
use viewfinder_hud::{HudConfig, HudError};

/// Preference group from `path`, or the built-in camera defaults
pub fn load_preferences(
    path: Option<&Path>,
) -> Result<PreferenceGroup, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(PreferenceGroup::load(path)?),
        None => Ok(PreferenceGroup::camera_defaults()),
    }
}

/// Config from `path`, the default location, or `fallback`
pub fn load_config(
    path: Option<&Path>,
    fallback: impl FnOnce() -> HudConfig,
) -> Result<HudConfig, Box<dyn std::error::Error>> {
    if path.is_none() && !HudConfig::default_path().is_some_and(|p| p.exists()) {
        return Ok(fallback());
    }
    Ok(HudConfig::load_or_default(path)?)
}

/// Lay out the overlay at `width` x `height`, optionally tap indicator
/// `select`, and print the resulting state
pub fn print_layout(
    config: HudConfig,
    preferences: &PreferenceGroup,
    width: i32,
    height: i32,
    select: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    if width <= 0 || height <= 0 {
        return Err(HudError::InvalidArgument(format!(
            "overlay size must be positive, got {}x{}",
            width, height
        ))
        .into());
    }

    let mut hud = HeadUpDisplay::new(config)?;
    hud.initialize(preferences);
    hud.on_layout(Rect::new(0, 0, width, height));

    if let Some(index) = select {
        let bounds = hud
            .indicator_bar()
            .and_then(|bar| bar.indicator(index))
            .map(|indicator| indicator.bounds())
            .ok_or_else(|| HudError::InvalidArgument(format!("no indicator at {}", index)))?;
        let x = (bounds.left + bounds.right) as f32 / 2.0;
        let y = bounds.center_y() as f32;
        hud.dispatch_touch(&TouchEvent::down(x, y));
        hud.dispatch_touch(&TouchEvent::up(x, y));
        info!(index, "Selected indicator");
    }

    println!("{}", serde_json::to_string_pretty(&hud.snapshot())?);
    Ok(())
}
