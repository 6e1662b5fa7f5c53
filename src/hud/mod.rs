// SPDX-License-Identifier: GPL-3.0-only

//! Head-up settings overlay
//!
//! - [`HeadUpDisplay`]: coordinator owning the bar, the popup and the timers
//! - [`IndicatorBar`] / [`Indicator`]: the selectable icons
//! - [`PopupWindow`]: the anchored option panel
//! - [`HudHandle`]: thread-safe entry point for cross-thread updates
//!
//! Setting overrides and GPS updates have two entry points. On the render
//! thread, call the inherent [`HeadUpDisplay`] methods; they apply inline. From
//! any thread, [`HudHandle`] queues the update for the next
//! [`HeadUpDisplay::process_pending`], even when called on the render thread.

pub mod handle;
pub mod head_up_display;
pub mod indicator;
pub mod indicator_bar;
pub mod popup;
pub mod snapshot;

pub use handle::HudHandle;
pub use head_up_display::HeadUpDisplay;
pub use indicator::{Indicator, IndicatorKind};
pub use indicator_bar::{BarEvent, IndicatorBar};
pub use popup::{ContentMetrics, OptionChoice, PopupContent, PopupOption, PopupSection, PopupWindow};
pub use snapshot::HudSnapshot;

use crate::scene::Visibility;

/// Observer notified synchronously on the render thread
pub trait HudListener {
    /// Popup became visible or invisible because of a selection change or a
    /// dismissing touch. Re-anchoring a visible popup does not notify.
    fn on_popup_window_visibility_changed(&mut self, visibility: Visibility);

    /// The user picked a new value from the popup
    fn on_setting_changed(&mut self, _key: &str, _value: &str) {}
}
