// SPDX-License-Identifier: GPL-3.0-only

//! Strip of indicators along the overlay's right edge

use super::indicator::Indicator;
use crate::scene::{MeasureSpec, Node, Rect, Size, TouchAction, TouchEvent};
use tracing::{debug, warn};

/// Selection change reported by the bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarEvent {
    /// The indicator at this position became selected
    ItemSelected(usize),
    /// Selection was cleared
    NothingSelected,
}

/// Ordered indicators with single selection and an activated highlight
#[derive(Debug, Default)]
pub struct IndicatorBar {
    indicators: Vec<Indicator>,
    selected: Option<usize>,
    activated: bool,
    background: Option<String>,
    highlight: Option<String>,
    icon_size: i32,
    measured: Size,
    bounds: Rect,
    pending_events: Vec<BarEvent>,
}

impl IndicatorBar {
    pub fn new(icon_size: i32) -> Self {
        Self {
            icon_size,
            ..Default::default()
        }
    }

    pub fn set_background(&mut self, texture: &str) {
        self.background = Some(texture.to_string());
    }

    pub fn set_highlight(&mut self, texture: &str) {
        self.highlight = Some(texture.to_string());
    }

    pub fn background(&self) -> Option<&str> {
        self.background.as_deref()
    }

    /// Highlight texture, drawn only while the bar is activated
    pub fn highlight(&self) -> Option<&str> {
        self.highlight.as_deref().filter(|_| self.activated)
    }

    /// Append an indicator, returning its position
    pub fn add_indicator(&mut self, mut indicator: Indicator) -> usize {
        indicator.set_icon_size(self.icon_size);
        self.indicators.push(indicator);
        self.indicators.len() - 1
    }

    pub fn indicators(&self) -> &[Indicator] {
        &self.indicators
    }

    pub fn indicator(&self, index: usize) -> Option<&Indicator> {
        self.indicators.get(index)
    }

    pub fn indicator_mut(&mut self, index: usize) -> Option<&mut Indicator> {
        self.indicators.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.indicators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    /// Change the selection, queueing a [`BarEvent`] if it actually changed.
    ///
    /// Out-of-range indices are ignored.
    pub fn set_selected_index(&mut self, index: Option<usize>) {
        if let Some(i) = index
            && i >= self.indicators.len()
        {
            warn!(index = i, count = self.indicators.len(), "Ignoring out-of-range selection");
            return;
        }
        if self.selected == index {
            return;
        }
        self.selected = index;
        let event = match index {
            Some(i) => BarEvent::ItemSelected(i),
            None => BarEvent::NothingSelected,
        };
        debug!(?event, "Indicator selection changed");
        self.pending_events.push(event);
    }

    pub fn is_activated(&self) -> bool {
        self.activated
    }

    pub fn set_activated(&mut self, activated: bool) {
        self.activated = activated;
    }

    /// Take the selection events queued since the last call
    pub fn take_events(&mut self) -> Vec<BarEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Apply an override to every indicator bound to `key`; returns how many took it
    pub fn override_settings(&mut self, key: &str, value: &str) -> usize {
        let applied = self
            .indicators
            .iter_mut()
            .map(|indicator| indicator.override_setting(key, value))
            .filter(|applied| *applied)
            .count();
        if applied == 0 {
            debug!(key, "No indicator shows overridden setting");
        }
        applied
    }

    pub fn restore_setting(&mut self, key: &str) -> usize {
        self.indicators
            .iter_mut()
            .map(|indicator| indicator.restore_setting(key))
            .filter(|restored| *restored)
            .count()
    }

    /// First indicator bound to `key`
    pub fn position_of_key(&self, key: &str) -> Option<usize> {
        self.indicators.iter().position(|i| i.is_bound_to(key))
    }

    /// Indicator whose slot spans `y`
    pub fn index_at(&self, y: f32) -> Option<usize> {
        self.indicators
            .iter()
            .position(|i| y >= i.bounds().top as f32 && y < i.bounds().bottom as f32)
    }
}

impl Node for IndicatorBar {
    fn measure(&mut self, width: MeasureSpec, height: MeasureSpec) -> Size {
        let count = self.indicators.len().max(1) as i32;
        self.measured = Size::new(
            width.resolve(self.icon_size),
            height.resolve(self.icon_size * count),
        );
        self.measured
    }

    fn measured_size(&self) -> Size {
        self.measured
    }

    /// Stack indicators along the bar, splitting its height evenly
    fn layout(&mut self, bounds: Rect) {
        self.bounds = bounds;
        let count = self.indicators.len() as i32;
        if count == 0 {
            return;
        }
        let slot = bounds.height() / count;
        for (i, indicator) in self.indicators.iter_mut().enumerate() {
            let top = bounds.top + slot * i as i32;
            // Last slot absorbs the rounding remainder
            let bottom = if i as i32 == count - 1 {
                bounds.bottom
            } else {
                top + slot
            };
            indicator.measure(
                MeasureSpec::Exactly(bounds.width()),
                MeasureSpec::Exactly(bottom - top),
            );
            indicator.layout(Rect::new(bounds.left, top, bounds.right, bottom));
        }
    }

    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn dispatch_touch(&mut self, event: &TouchEvent) -> bool {
        match event.action {
            TouchAction::Down | TouchAction::Move => {
                if !self.bounds.contains(event.x, event.y) {
                    // Sliding off the bar keeps the current selection
                    return event.action == TouchAction::Move;
                }
                self.set_activated(true);
                if let Some(index) = self.index_at(event.y) {
                    self.set_selected_index(Some(index));
                }
                true
            }
            TouchAction::Up | TouchAction::Cancel => true,
        }
    }
}
