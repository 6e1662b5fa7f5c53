// SPDX-License-Identifier: GPL-3.0-only

//! Overlay coordinator
//!
//! Owns the indicator bar and the popup window, anchors the popup next to
//! the selected indicator and hides everything again once the user stops
//! interacting. Must be created, driven and dropped on the render thread.
//!
//! Popup visibility follows the bar's selection: selecting an indicator shows
//! (or re-anchors) the popup, clearing the selection hides it. Timers and
//! other threads only ever reach this state through the render queue.

use super::handle::HudHandle;
use super::indicator::Indicator;
use super::indicator_bar::{BarEvent, IndicatorBar};
use super::popup::{ContentMetrics, PopupWindow};
use super::snapshot::{BarSnapshot, HudSnapshot, IndicatorSnapshot, PopupSnapshot};
use super::HudListener;
use crate::config::HudConfig;
use crate::constants::{keys, resources, ui};
use crate::errors::{HudError, HudResult};
use crate::preferences::PreferenceGroup;
use crate::scene::{
    AlphaAnimation, MeasureSpec, Node, Orientation, Rect, RenderQueue, RenderQueueHandle,
    TouchAction, TouchEvent, Visibility,
};
use crate::timer::{DismissTimers, TimerKind};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Node that received the `Down` of the current gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MotionTarget {
    PopupWindow,
    IndicatorBar,
    Overlay,
}

/// The head-up display coordinator
pub struct HeadUpDisplay {
    config: HudConfig,
    bounds: Rect,
    indicator_bar: Option<IndicatorBar>,
    gps_indicator: Option<usize>,
    popup_window: Option<PopupWindow>,
    anchor_x: i32,
    anchor_y: i32,
    orientation: Orientation,
    listener: Option<Box<dyn HudListener + Send>>,
    motion_target: Option<MotionTarget>,
    last_interaction: Option<Instant>,
    render_queue: RenderQueue<HeadUpDisplay>,
    timers: DismissTimers,
}

/// Reject odd-length key/value lists
pub(crate) fn validate_key_values<S: AsRef<str>>(key_values: &[S]) -> HudResult<()> {
    if key_values.len() % 2 != 0 {
        return Err(HudError::InvalidArgument(format!(
            "override list must hold key/value pairs, got {} items",
            key_values.len()
        )));
    }
    Ok(())
}

impl HeadUpDisplay {
    /// Create the overlay; the calling thread becomes its render thread
    pub fn new(config: HudConfig) -> HudResult<Self> {
        config.validate()?;
        let render_queue = RenderQueue::new();
        let timers = Self::start_timers(render_queue.handle(), config.handoff_timeout())?;

        info!(density = config.density, "Head-up display created");

        Ok(Self {
            config,
            bounds: Rect::default(),
            indicator_bar: None,
            gps_indicator: None,
            popup_window: None,
            anchor_x: 0,
            anchor_y: 0,
            orientation: Orientation::default(),
            listener: None,
            motion_target: None,
            last_interaction: None,
            render_queue,
            timers,
        })
    }

    /// Timer thread whose fires are handed to the render thread and awaited
    fn start_timers(
        queue: RenderQueueHandle<HeadUpDisplay>,
        timeout: Option<Duration>,
    ) -> HudResult<DismissTimers> {
        DismissTimers::start(move |kind| {
            let queue = queue.clone();
            async move {
                let action: fn(&mut HeadUpDisplay) = match kind {
                    TimerKind::HidePopupWindow => HeadUpDisplay::hide_popup_window,
                    TimerKind::DeactivateIndicatorBar => HeadUpDisplay::deactivate_indicator_bar,
                };
                let task = queue.run(action);
                let result = match timeout {
                    Some(limit) => match tokio::time::timeout(limit, task).await {
                        Ok(result) => result,
                        Err(_) => Err(HudError::HandoffTimeout(limit.as_millis() as u64)),
                    },
                    None => task.await,
                };
                if let Err(e) = result {
                    error!(?kind, error = %e, "Error handing timer off to render thread");
                }
            }
        })
    }

    pub fn config(&self) -> &HudConfig {
        &self.config
    }

    /// Handle for updates from other threads
    pub fn handle(&self) -> HudHandle {
        HudHandle::new(self.render_queue.handle())
    }

    pub fn set_listener<L>(&mut self, listener: L)
    where
        L: HudListener + Send + 'static,
    {
        self.listener = Some(Box::new(listener));
    }

    pub fn clear_listener(&mut self) {
        self.listener = None;
    }

    /// Build the indicator bar from the session's preferences.
    ///
    /// Order is fixed: other settings, GPS, white balance, flash. Preferences
    /// that are missing or have no entries are skipped.
    pub fn initialize(&mut self, group: &PreferenceGroup) {
        if self.indicator_bar.is_some() {
            warn!("Head-up display already initialized, keeping existing indicators");
            return;
        }

        let icon_size = self.config.px(self.config.indicator_icon_size);
        let mut bar = IndicatorBar::new(icon_size);
        bar.set_background(resources::ICON_BAR);
        bar.set_highlight(resources::ICON_BAR_HIGHLIGHT);

        let other_settings = group.list_preferences(&keys::OTHER_SETTINGS_KEYS);
        if other_settings.is_empty() {
            debug!("No other settings to show");
        } else {
            bar.add_indicator(Indicator::other_settings(other_settings));
        }

        match group.find_list(keys::KEY_RECORD_LOCATION) {
            Some(preference) => {
                self.gps_indicator = Some(bar.add_indicator(Indicator::gps(preference.clone())));
            }
            None => debug!(key = keys::KEY_RECORD_LOCATION, "Skipping GPS indicator"),
        }

        for key in [keys::KEY_WHITE_BALANCE, keys::KEY_FLASH_MODE] {
            match group.find_icon(key) {
                Some(preference) => {
                    bar.add_indicator(Indicator::basic(preference.clone()));
                }
                None => debug!(key, "Skipping indicator"),
            }
        }

        info!(indicators = bar.len(), "Indicator bar initialized");
        self.indicator_bar = Some(bar);
    }

    pub fn is_initialized(&self) -> bool {
        self.indicator_bar.is_some()
    }

    /// Lay out the bar inside `bounds` and re-anchor a visible popup.
    ///
    /// Child coordinates are relative to the overlay's top-left corner.
    pub fn on_layout(&mut self, bounds: Rect) {
        self.bounds = bounds;
        let width = bounds.width();
        let height = bounds.height();
        let right_margin = self.config.right_margin_px();

        let Some(bar) = self.indicator_bar.as_mut() else {
            debug!("Layout before initialize, nothing to place");
            return;
        };
        let size = bar.measure(MeasureSpec::AtMost(width / 3), MeasureSpec::Exactly(height));
        bar.layout(Rect::new(
            width - size.width - right_margin,
            0,
            width - right_margin,
            height,
        ));

        if self.is_popup_visible() {
            self.layout_popup_window(self.anchor_x, self.anchor_y);
        }
    }

    pub fn width(&self) -> i32 {
        self.bounds.width()
    }

    pub fn height(&self) -> i32 {
        self.bounds.height()
    }

    /// Position the popup so its right edge sits at `anchor_x` and it is
    /// vertically centred on `anchor_y`, kept inside the overlay
    pub fn layout_popup_window(&mut self, anchor_x: i32, anchor_y: i32) {
        self.anchor_x = anchor_x;
        self.anchor_y = anchor_y;

        let overlay_width = self.width();
        let overlay_height = self.height();
        let max_width = (overlay_width as f32 * self.config.max_width_ratio + 0.5) as i32;
        let max_height = (overlay_height as f32 * self.config.max_height_ratio + 0.5) as i32;

        let Some(popup) = self.popup_window.as_mut() else {
            return;
        };
        let size = popup.measure(MeasureSpec::AtMost(max_width), MeasureSpec::AtMost(max_height));

        let x = (anchor_x - size.width).max(0);
        let mut y = (anchor_y - size.height / 2).max(0);
        if y + size.height > overlay_height {
            y = overlay_height - size.height;
        }

        popup.set_anchor_position(anchor_y - y);
        popup.layout(Rect::from_origin_size(x, y, size));
    }

    /// Anchor and reveal the popup
    pub fn show_popup_window(&mut self, anchor_x: i32, anchor_y: i32) {
        if self.popup_window.is_none() {
            self.initialize_popup_window();
        }
        self.layout_popup_window(anchor_x, anchor_y);

        let Some(popup) = self.popup_window.as_mut() else {
            return;
        };
        let was_visible = popup.is_visible();
        popup.popup();
        if !was_visible {
            self.notify_visibility(Visibility::Visible);
        }
    }

    /// Clear the bar selection, which hides the popup
    pub fn hide_popup_window(&mut self) {
        let Some(bar) = self.indicator_bar.as_mut() else {
            return;
        };
        bar.set_selected_index(None);
        self.handle_bar_events();
    }

    /// Drop the bar's activated highlight
    pub fn deactivate_indicator_bar(&mut self) {
        let Some(bar) = self.indicator_bar.as_mut() else {
            return;
        };
        bar.set_activated(false);
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Record the device orientation.
    ///
    /// A visible popup fades back in and restarts the dismiss timers.
    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
        let fade = self.config.orientation_fade();
        let Some(popup) = self.popup_window.as_mut() else {
            return;
        };
        popup.set_orientation(orientation);
        if popup.is_visible() {
            popup.start_animation(AlphaAnimation::fade_in(fade));
            self.layout_popup_window(self.anchor_x, self.anchor_y);
            self.schedule_deactivate_indicator_bar();
        }
    }

    /// Apply `key, value, key, value, ...` overrides to the bar, in order
    pub fn override_settings<S: AsRef<str>>(&mut self, key_values: &[S]) -> HudResult<()> {
        validate_key_values(key_values)?;
        let bar = self
            .indicator_bar
            .as_mut()
            .ok_or(HudError::NotInitialized)?;
        for pair in key_values.chunks_exact(2) {
            bar.override_settings(pair[0].as_ref(), pair[1].as_ref());
        }
        self.refresh_popup_content();
        Ok(())
    }

    /// Remove overrides for `keys`
    pub fn restore_settings<S: AsRef<str>>(&mut self, keys: &[S]) -> HudResult<()> {
        let bar = self
            .indicator_bar
            .as_mut()
            .ok_or(HudError::NotInitialized)?;
        for key in keys {
            bar.restore_setting(key.as_ref());
        }
        self.refresh_popup_content();
        Ok(())
    }

    pub fn set_gps_has_signal(&mut self, has_signal: bool) {
        let indicator = self
            .gps_indicator
            .and_then(|i| self.indicator_bar.as_mut()?.indicator_mut(i));
        match indicator {
            Some(indicator) => indicator.set_has_signal(has_signal),
            None => debug!(has_signal, "No GPS indicator to update"),
        }
    }

    pub fn gps_has_signal(&self) -> Option<bool> {
        let index = self.gps_indicator?;
        Some(self.indicator_bar.as_ref()?.indicator(index)?.has_signal())
    }

    /// Route a touch sample through the overlay; returns true when consumed.
    ///
    /// Consumed samples restart the dismiss timers.
    pub fn dispatch_touch(&mut self, event: &TouchEvent) -> bool {
        let consumed = self.route_touch(event);
        if consumed {
            self.schedule_deactivate_indicator_bar();
        }
        consumed
    }

    /// Run tasks marshalled from other threads; call once per frame
    pub fn process_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Some(task) = self.render_queue.next_task() {
            if let Err(e) = task.run(self) {
                warn!(error = %e, "Render task failed");
            }
            ran += 1;
        }
        ran
    }

    pub fn indicator_bar(&self) -> Option<&IndicatorBar> {
        self.indicator_bar.as_ref()
    }

    pub fn popup_window(&self) -> Option<&PopupWindow> {
        self.popup_window.as_ref()
    }

    pub fn is_popup_visible(&self) -> bool {
        self.popup_window.as_ref().is_some_and(|p| p.is_visible())
    }

    /// Anchor point used for the last popup layout
    pub fn anchor(&self) -> (i32, i32) {
        (self.anchor_x, self.anchor_y)
    }

    /// When the dismiss timers were last restarted
    pub fn last_interaction(&self) -> Option<Instant> {
        self.last_interaction
    }

    pub fn snapshot(&self) -> HudSnapshot {
        HudSnapshot {
            width: self.width(),
            height: self.height(),
            orientation: self.orientation.degrees(),
            anchor: self.anchor(),
            indicator_bar: self.indicator_bar.as_ref().map(|bar| BarSnapshot {
                bounds: bar.bounds(),
                activated: bar.is_activated(),
                selected: bar.selected_index(),
                indicators: bar
                    .indicators()
                    .iter()
                    .map(|indicator| IndicatorSnapshot {
                        kind: indicator.kind(),
                        icon: indicator.icon().to_string(),
                        keys: indicator.keys().map(str::to_string).collect(),
                        bounds: indicator.bounds(),
                    })
                    .collect(),
            }),
            popup_window: self.popup_window.as_ref().map(|popup| PopupSnapshot {
                visibility: popup.visibility(),
                bounds: popup.bounds(),
                anchor_position: popup.anchor_position(),
                content: popup.content().cloned(),
            }),
        }
    }

    fn initialize_popup_window(&mut self) {
        let metrics = ContentMetrics {
            row_height: self.config.px(self.config.popup_row_height),
            char_width: self.config.px(self.config.popup_char_width),
            padding: self.config.px(self.config.popup_padding),
        };
        let mut popup = PopupWindow::new(metrics);
        popup.set_background(resources::MENU_POPUP);
        popup.set_anchor(resources::MENU_POPUP_TRIANGLE, ui::POPUP_ANCHOR_OFFSET);
        popup.set_visibility(Visibility::Invisible);
        popup.set_orientation(self.orientation);
        self.popup_window = Some(popup);
        debug!("Popup window created");
    }

    fn schedule_deactivate_indicator_bar(&mut self) {
        self.last_interaction = Some(Instant::now());
        for (kind, delay) in [
            (TimerKind::HidePopupWindow, self.config.hide_popup_delay()),
            (TimerKind::DeactivateIndicatorBar, self.config.deactivate_bar_delay()),
        ] {
            if let Err(e) = self.timers.arm(kind, delay) {
                warn!(?kind, error = %e, "Failed to arm dismiss timer");
            }
        }
    }

    fn route_touch(&mut self, event: &TouchEvent) -> bool {
        if event.action == TouchAction::Down {
            self.motion_target = self.find_motion_target(event);
        }
        let target = self.motion_target;
        if event.ends_gesture() {
            self.motion_target = None;
        }

        match target {
            Some(MotionTarget::PopupWindow) => {
                let consumed = self
                    .popup_window
                    .as_mut()
                    .is_some_and(|popup| popup.dispatch_touch(event));
                self.apply_popup_choices();
                consumed
            }
            Some(MotionTarget::IndicatorBar) => {
                let consumed = self
                    .indicator_bar
                    .as_mut()
                    .is_some_and(|bar| bar.dispatch_touch(event));
                self.handle_bar_events();
                consumed
            }
            Some(MotionTarget::Overlay) => self.on_touch(event),
            None => false,
        }
    }

    fn find_motion_target(&self, event: &TouchEvent) -> Option<MotionTarget> {
        if let Some(popup) = self.popup_window.as_ref()
            && popup.is_visible()
            && popup.hit(event)
        {
            return Some(MotionTarget::PopupWindow);
        }
        if let Some(bar) = self.indicator_bar.as_ref()
            && bar.hit(event)
        {
            return Some(MotionTarget::IndicatorBar);
        }
        if self.is_popup_visible() {
            return Some(MotionTarget::Overlay);
        }
        None
    }

    /// Touches that reach the overlay itself; only claimed while the popup is up
    fn on_touch(&mut self, event: &TouchEvent) -> bool {
        if !self.is_popup_visible() {
            return false;
        }
        if event.action == TouchAction::Up {
            self.dismiss_popup();
            if let Some(bar) = self.indicator_bar.as_mut() {
                bar.set_selected_index(None);
                bar.set_activated(false);
            }
            self.handle_bar_events();
        }
        true
    }

    fn dismiss_popup(&mut self) {
        let Some(popup) = self.popup_window.as_mut() else {
            return;
        };
        if !popup.is_visible() {
            return;
        }
        popup.popoff();
        self.notify_visibility(Visibility::Invisible);
    }

    fn handle_bar_events(&mut self) {
        let events = match self.indicator_bar.as_mut() {
            Some(bar) => bar.take_events(),
            None => return,
        };
        for event in events {
            match event {
                BarEvent::ItemSelected(position) => self.on_item_selected(position),
                BarEvent::NothingSelected => self.dismiss_popup(),
            }
        }
    }

    fn on_item_selected(&mut self, position: usize) {
        let Some(indicator) = self
            .indicator_bar
            .as_ref()
            .and_then(|bar| bar.indicator(position))
        else {
            return;
        };
        let rect = indicator.bounds();
        let anchor_x = rect.left + self.config.popup_window_overlap;
        let anchor_y = rect.center_y();
        let content = indicator.popup_content();

        if self.popup_window.is_none() {
            self.initialize_popup_window();
        }
        let Some(popup) = self.popup_window.as_mut() else {
            return;
        };
        popup.set_content(content);

        if popup.is_visible() {
            self.layout_popup_window(anchor_x, anchor_y);
        } else {
            self.show_popup_window(anchor_x, anchor_y);
        }
    }

    fn apply_popup_choices(&mut self) {
        let choices = match self.popup_window.as_mut() {
            Some(popup) => popup.take_choices(),
            None => return,
        };
        for choice in choices {
            let Some(bar) = self.indicator_bar.as_mut() else {
                return;
            };
            let Some(indicator) = bar
                .position_of_key(&choice.key)
                .and_then(|i| bar.indicator_mut(i))
            else {
                continue;
            };
            match indicator.set_value(&choice.key, &choice.value) {
                Ok(()) => {
                    info!(key = %choice.key, value = %choice.value, "Setting changed");
                    if let Some(listener) = self.listener.as_mut() {
                        listener.on_setting_changed(&choice.key, &choice.value);
                    }
                }
                Err(e) => warn!(key = %choice.key, error = %e, "Setting not changed"),
            }
        }
        self.refresh_popup_content();
    }

    /// Rebuild the popup content from the selected indicator
    fn refresh_popup_content(&mut self) {
        let content = self
            .indicator_bar
            .as_ref()
            .and_then(|bar| bar.indicator(bar.selected_index()?))
            .map(Indicator::popup_content);
        let Some(content) = content else {
            return;
        };
        let Some(popup) = self.popup_window.as_mut() else {
            return;
        };
        popup.set_content(content);
        if popup.is_visible() {
            self.layout_popup_window(self.anchor_x, self.anchor_y);
        }
    }

    fn notify_visibility(&mut self, visibility: Visibility) {
        if let Some(listener) = self.listener.as_mut() {
            listener.on_popup_window_visibility_changed(visibility);
        }
    }
}

impl Drop for HeadUpDisplay {
    fn drop(&mut self) {
        // Closing first releases a timer blocked on a hand-off
        self.render_queue.close();
        self.timers.stop();
        debug!("Head-up display dropped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hud::IndicatorKind;
    use crate::preferences::ListPreference;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Recorder {
        visibility: Vec<Visibility>,
        settings: Vec<(String, String)>,
    }

    struct RecordingListener(Arc<Mutex<Recorder>>);

    impl HudListener for RecordingListener {
        fn on_popup_window_visibility_changed(&mut self, visibility: Visibility) {
            self.0.lock().unwrap().visibility.push(visibility);
        }

        fn on_setting_changed(&mut self, key: &str, value: &str) {
            self.0
                .lock()
                .unwrap()
                .settings
                .push((key.to_string(), value.to_string()));
        }
    }

    fn hud_with_listener() -> (HeadUpDisplay, Arc<Mutex<Recorder>>) {
        let mut hud = HeadUpDisplay::new(HudConfig::default()).unwrap();
        hud.initialize(&PreferenceGroup::camera_defaults());
        hud.on_layout(Rect::new(0, 0, 800, 480));
        let recorder = Arc::new(Mutex::new(Recorder::default()));
        hud.set_listener(RecordingListener(Arc::clone(&recorder)));
        (hud, recorder)
    }

    fn indicator_center(hud: &HeadUpDisplay, index: usize) -> (f32, f32) {
        let rect = hud.indicator_bar().unwrap().indicator(index).unwrap().bounds();
        (
            (rect.left + rect.right) as f32 / 2.0,
            rect.center_y() as f32,
        )
    }

    fn tap(hud: &mut HeadUpDisplay, x: f32, y: f32) {
        hud.dispatch_touch(&TouchEvent::down(x, y));
        hud.dispatch_touch(&TouchEvent::up(x, y));
    }

    #[test]
    fn test_initialize_order() {
        let (hud, _) = hud_with_listener();
        let kinds: Vec<_> = hud
            .indicator_bar()
            .unwrap()
            .indicators()
            .iter()
            .map(|i| i.kind())
            .collect();
        assert_eq!(
            kinds,
            vec![
                IndicatorKind::OtherSettings,
                IndicatorKind::Gps,
                IndicatorKind::Basic,
                IndicatorKind::Basic
            ]
        );
        let third: Vec<&str> = hud.indicator_bar().unwrap().indicators()[2].keys().collect();
        assert_eq!(third, vec![keys::KEY_WHITE_BALANCE]);
    }

    #[test]
    fn test_initialize_skips_missing_and_plain_preferences() {
        let group = PreferenceGroup::new("g")
            .with(ListPreference::new(keys::KEY_FLASH_MODE, "Flash").with_entries(&[("On", "on")]))
            .with(ListPreference::new(keys::KEY_SCENE_MODE, "Scene"));
        let mut hud = HeadUpDisplay::new(HudConfig::default()).unwrap();
        hud.initialize(&group);
        // Flash has no icons, scene has no entries
        assert!(hud.indicator_bar().unwrap().is_empty());
        assert_eq!(hud.gps_has_signal(), None);
    }

    #[test]
    fn test_layout_right_aligns_bar() {
        let (hud, _) = hud_with_listener();
        let bar = hud.indicator_bar().unwrap().bounds();
        assert_eq!(bar, Rect::new(800 - 64 - 15, 0, 800 - 15, 480));
    }

    #[test]
    fn test_selecting_indicator_shows_anchored_popup() {
        let (mut hud, recorder) = hud_with_listener();
        let (x, y) = indicator_center(&hud, 3);
        assert!(hud.dispatch_touch(&TouchEvent::down(x, y)));

        let rect = hud.indicator_bar().unwrap().indicator(3).unwrap().bounds();
        assert_eq!(hud.anchor(), (rect.left + 30, rect.center_y()));

        let popup = hud.popup_window().unwrap();
        assert!(popup.is_visible());
        assert_eq!(popup.bounds().right, rect.left + 30);
        assert_eq!(
            recorder.lock().unwrap().visibility,
            vec![Visibility::Visible]
        );
        assert!(hud.indicator_bar().unwrap().is_activated());
        assert!(hud.last_interaction().is_some());
    }

    #[test]
    fn test_sliding_to_another_indicator_reanchors_without_notifying() {
        let (mut hud, recorder) = hud_with_listener();
        let (x, y0) = indicator_center(&hud, 2);
        let (_, y1) = indicator_center(&hud, 3);
        hud.dispatch_touch(&TouchEvent::down(x, y0));
        hud.dispatch_touch(&TouchEvent::moved(x, y1));

        assert_eq!(hud.anchor().1, y1 as i32);
        assert_eq!(recorder.lock().unwrap().visibility.len(), 1);
    }

    #[test]
    fn test_touch_up_outside_dismisses() {
        let (mut hud, recorder) = hud_with_listener();
        let (x, y) = indicator_center(&hud, 0);
        tap(&mut hud, x, y);
        assert!(hud.is_popup_visible());

        assert!(hud.dispatch_touch(&TouchEvent::down(5.0, 5.0)));
        assert!(hud.is_popup_visible());
        assert!(hud.dispatch_touch(&TouchEvent::up(5.0, 5.0)));

        assert!(!hud.is_popup_visible());
        let bar = hud.indicator_bar().unwrap();
        assert_eq!(bar.selected_index(), None);
        assert!(!bar.is_activated());
        assert_eq!(
            recorder.lock().unwrap().visibility,
            vec![Visibility::Visible, Visibility::Invisible]
        );
    }

    #[test]
    fn test_touch_falls_through_when_popup_hidden() {
        let (mut hud, _) = hud_with_listener();
        assert!(!hud.dispatch_touch(&TouchEvent::down(5.0, 5.0)));
        assert!(!hud.dispatch_touch(&TouchEvent::up(5.0, 5.0)));
        assert!(hud.last_interaction().is_none());
    }

    #[test]
    fn test_hide_popup_window_clears_selection() {
        let (mut hud, recorder) = hud_with_listener();
        let (x, y) = indicator_center(&hud, 1);
        tap(&mut hud, x, y);
        hud.hide_popup_window();
        assert!(!hud.is_popup_visible());
        assert_eq!(hud.indicator_bar().unwrap().selected_index(), None);
        // Highlight stays until its own timer
        assert!(hud.indicator_bar().unwrap().is_activated());
        assert_eq!(
            recorder.lock().unwrap().visibility,
            vec![Visibility::Visible, Visibility::Invisible]
        );
    }

    #[test]
    fn test_popup_choice_updates_preference() {
        let (mut hud, recorder) = hud_with_listener();
        let (x, y) = indicator_center(&hud, 3);
        tap(&mut hud, x, y);

        // Flash popup rows: title, Auto, On, Off
        let popup = hud.popup_window().unwrap().bounds();
        let row_height = hud.config().popup_row_height as f32;
        let padding = hud.config().popup_padding as f32;
        let off_y = popup.top as f32 + padding + row_height * 3.5;
        let px = popup.left as f32 + 20.0;
        tap(&mut hud, px, off_y);

        assert!(hud.is_popup_visible());
        let flash = hud.indicator_bar().unwrap().indicator(3).unwrap();
        assert_eq!(flash.effective_value(keys::KEY_FLASH_MODE), Some("off"));
        assert_eq!(
            recorder.lock().unwrap().settings,
            vec![(keys::KEY_FLASH_MODE.to_string(), "off".to_string())]
        );
        let content = hud.popup_window().unwrap().content().unwrap();
        assert!(content.sections[0].options[2].selected);
    }

    #[test]
    fn test_orientation_while_hidden_only_stores() {
        let (mut hud, _) = hud_with_listener();
        hud.set_orientation(Orientation::Deg90);
        assert_eq!(hud.orientation(), Orientation::Deg90);
        assert!(hud.popup_window().is_none());
        assert!(hud.last_interaction().is_none());

        let (x, y) = indicator_center(&hud, 0);
        tap(&mut hud, x, y);
        hud.hide_popup_window();
        let before = hud.last_interaction();
        let animation_before = hud.popup_window().unwrap().animation().copied();

        hud.set_orientation(Orientation::Deg180);
        assert_eq!(hud.last_interaction(), before);
        assert_eq!(hud.popup_window().unwrap().animation().copied(), animation_before);
        assert_eq!(hud.popup_window().unwrap().orientation(), Orientation::Deg180);
    }

    #[test]
    fn test_orientation_while_visible_fades_and_rearms() {
        let (mut hud, _) = hud_with_listener();
        let (x, y) = indicator_center(&hud, 0);
        tap(&mut hud, x, y);
        let before = hud.last_interaction().unwrap();

        std::thread::sleep(Duration::from_millis(5));
        hud.set_orientation(Orientation::Deg270);
        let popup = hud.popup_window().unwrap();
        assert_eq!(popup.animation().unwrap().duration(), Duration::from_millis(250));
        assert!(hud.last_interaction().unwrap() > before);
    }

    #[test]
    fn test_override_settings_odd_length_rejected() {
        let (mut hud, _) = hud_with_listener();
        let result = hud.override_settings(&[keys::KEY_FLASH_MODE]);
        assert!(matches!(result, Err(HudError::InvalidArgument(_))));
        let flash = hud.indicator_bar().unwrap().indicator(3).unwrap();
        assert_eq!(flash.overridden_value(keys::KEY_FLASH_MODE), None);
    }

    #[test]
    fn test_override_before_initialize() {
        let mut hud = HeadUpDisplay::new(HudConfig::default()).unwrap();
        assert_eq!(
            hud.override_settings(&["a", "b"]),
            Err(HudError::NotInitialized)
        );
    }

    #[test]
    fn test_gps_signal_inline() {
        let (mut hud, _) = hud_with_listener();
        assert_eq!(hud.gps_has_signal(), Some(false));
        hud.set_gps_has_signal(true);
        assert_eq!(hud.gps_has_signal(), Some(true));
    }

    #[test]
    fn test_deactivate_before_initialize_is_noop() {
        let mut hud = HeadUpDisplay::new(HudConfig::default()).unwrap();
        hud.deactivate_indicator_bar();
        hud.hide_popup_window();
        hud.on_layout(Rect::new(0, 0, 100, 100));
        assert!(!hud.is_initialized());
    }
}
