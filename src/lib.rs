// SPDX-License-Identifier: GPL-3.0-only

//! Viewfinder HUD - the settings overlay drawn over a camera preview
//!
//! This library provides the indicator bar and popup window that let a user
//! change camera settings while framing a shot, together with the timers that
//! hide them again and the plumbing that keeps all mutation on one thread.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`hud`]: The overlay coordinator, indicators, bar and popup window
//! - [`scene`]: Geometry, measure/layout, touch events and the render queue
//! - [`timer`]: Debounced dismiss timers on their own thread
//! - [`preferences`]: List preferences the indicators display
//! - [`config`]: User configuration handling
//! - [`terminal`]: Interactive terminal demo
//!
//! # Example
//!
//! ```ignore
//! let mut hud = HeadUpDisplay::new(HudConfig::default())?;
//! hud.initialize(&PreferenceGroup::camera_defaults());
//! hud.on_layout(Rect::new(0, 0, 800, 480));
//! // once per frame on the render thread
//! hud.process_pending();
//! ```

pub mod config;
pub mod constants;
pub mod errors;
pub mod hud;
pub mod preferences;
pub mod scene;
pub mod terminal;
pub mod timer;

// Re-export commonly used types
pub use config::HudConfig;
pub use errors::{HudError, HudResult};
pub use hud::{HeadUpDisplay, HudHandle, HudListener, HudSnapshot};
pub use preferences::{ListPreference, PreferenceGroup};
pub use scene::{Orientation, Rect, TouchAction, TouchEvent, Visibility};
