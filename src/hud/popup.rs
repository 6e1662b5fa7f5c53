// SPDX-License-Identifier: GPL-3.0-only

//! Floating popup window and its option-list content

use crate::constants::POPUP_TRANSITION_DURATION;
use crate::scene::{
    AlphaAnimation, MeasureSpec, Node, Orientation, Rect, Size, TouchAction, TouchEvent,
    Visibility,
};
use serde::Serialize;
use std::time::Instant;
use tracing::debug;

/// One choosable value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PopupOption {
    pub label: String,
    pub value: String,
    pub selected: bool,
    /// False while the preference is overridden
    pub enabled: bool,
}

/// Title row followed by the options of one preference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PopupSection {
    pub key: String,
    pub title: String,
    pub options: Vec<PopupOption>,
}

/// Everything the popup shows for one indicator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PopupContent {
    pub sections: Vec<PopupSection>,
}

/// A row of the content laid out top to bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentRow {
    Title { section: usize },
    Option { section: usize, option: usize },
}

impl PopupContent {
    pub fn new(sections: Vec<PopupSection>) -> Self {
        Self { sections }
    }

    /// Rows in display order
    pub fn rows(&self) -> Vec<ContentRow> {
        let mut rows = Vec::new();
        for (section, s) in self.sections.iter().enumerate() {
            rows.push(ContentRow::Title { section });
            rows.extend((0..s.options.len()).map(|option| ContentRow::Option { section, option }));
        }
        rows
    }

    /// Longest label, in characters
    fn widest_label(&self) -> usize {
        self.sections
            .iter()
            .flat_map(|s| {
                std::iter::once(s.title.chars().count())
                    .chain(s.options.iter().map(|o| o.label.chars().count()))
            })
            .max()
            .unwrap_or(0)
    }
}

/// Pixel metrics used to size popup content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentMetrics {
    pub row_height: i32,
    pub char_width: i32,
    pub padding: i32,
}

impl ContentMetrics {
    /// Unrotated size the content would like
    pub fn preferred_size(&self, content: &PopupContent) -> Size {
        let rows = content.rows().len() as i32;
        Size::new(
            content.widest_label() as i32 * self.char_width + 2 * self.padding,
            rows * self.row_height + 2 * self.padding,
        )
    }
}

/// A value the user tapped in the popup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionChoice {
    pub key: String,
    pub value: String,
}

/// Panel anchored next to the selected indicator
#[derive(Debug)]
pub struct PopupWindow {
    content: Option<PopupContent>,
    metrics: ContentMetrics,
    visibility: Visibility,
    orientation: Orientation,
    background: Option<String>,
    anchor_texture: Option<String>,
    anchor_offset: i32,
    anchor_position: i32,
    animation: Option<AlphaAnimation>,
    measured: Size,
    bounds: Rect,
    pressed_row: Option<ContentRow>,
    pending_choices: Vec<OptionChoice>,
}

impl PopupWindow {
    pub fn new(metrics: ContentMetrics) -> Self {
        Self {
            content: None,
            metrics,
            visibility: Visibility::Invisible,
            orientation: Orientation::default(),
            background: None,
            anchor_texture: None,
            anchor_offset: 0,
            anchor_position: 0,
            animation: None,
            measured: Size::ZERO,
            bounds: Rect::default(),
            pressed_row: None,
            pending_choices: Vec::new(),
        }
    }

    pub fn set_content(&mut self, content: PopupContent) {
        self.pressed_row = None;
        self.content = Some(content);
    }

    pub fn content(&self) -> Option<&PopupContent> {
        self.content.as_ref()
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn set_visibility(&mut self, visibility: Visibility) {
        self.visibility = visibility;
    }

    pub fn is_visible(&self) -> bool {
        self.visibility == Visibility::Visible
    }

    pub fn set_background(&mut self, texture: &str) {
        self.background = Some(texture.to_string());
    }

    pub fn background(&self) -> Option<&str> {
        self.background.as_deref()
    }

    /// Anchor marker texture and the offset of its tip inside the texture
    pub fn set_anchor(&mut self, texture: &str, offset: i32) {
        self.anchor_texture = Some(texture.to_string());
        self.anchor_offset = offset;
    }

    pub fn anchor_texture(&self) -> Option<&str> {
        self.anchor_texture.as_deref()
    }

    /// Vertical position of the anchor tip relative to the popup's top edge
    pub fn set_anchor_position(&mut self, position: i32) {
        self.anchor_position = position;
    }

    pub fn anchor_position(&self) -> i32 {
        self.anchor_position
    }

    /// Where the anchor texture is drawn so its tip lands on the anchor position
    pub fn anchor_marker_top(&self) -> i32 {
        self.anchor_position - self.anchor_offset
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
    }

    pub fn start_animation(&mut self, animation: AlphaAnimation) {
        self.animation = Some(animation);
    }

    pub fn animation(&self) -> Option<&AlphaAnimation> {
        self.animation.as_ref()
    }

    /// Current opacity, taking a running animation into account
    pub fn alpha(&self, now: Instant) -> f32 {
        match (&self.animation, self.visibility) {
            (Some(animation), _) => animation.alpha_at(now),
            (None, Visibility::Visible) => 1.0,
            (None, Visibility::Invisible) => 0.0,
        }
    }

    /// Become visible with the opening transition
    pub fn popup(&mut self) {
        debug!("Popup window shown");
        self.visibility = Visibility::Visible;
        self.start_animation(AlphaAnimation::fade_in(POPUP_TRANSITION_DURATION));
    }

    /// Become invisible with the closing transition
    pub fn popoff(&mut self) {
        debug!("Popup window dismissed");
        self.visibility = Visibility::Invisible;
        self.pressed_row = None;
        self.start_animation(AlphaAnimation::fade_out(POPUP_TRANSITION_DURATION));
    }

    /// Take the options tapped since the last call
    pub fn take_choices(&mut self) -> Vec<OptionChoice> {
        std::mem::take(&mut self.pending_choices)
    }

    /// Content row under an overlay point, accounting for orientation
    pub fn row_at(&self, x: f32, y: f32) -> Option<ContentRow> {
        let content = self.content.as_ref()?;
        if !self.bounds.contains(x, y) {
            return None;
        }
        let local_x = x - self.bounds.left as f32;
        let local_y = y - self.bounds.top as f32;
        let width = self.bounds.width() as f32;
        let height = self.bounds.height() as f32;

        // Undo the content rotation (content is rotated clockwise)
        let (_, content_y) = match self.orientation {
            Orientation::Deg0 => (local_x, local_y),
            Orientation::Deg90 => (local_y, width - local_x),
            Orientation::Deg180 => (width - local_x, height - local_y),
            Orientation::Deg270 => (height - local_y, local_x),
        };

        let row = ((content_y - self.metrics.padding as f32) / self.metrics.row_height as f32)
            .floor();
        if row < 0.0 {
            return None;
        }
        content.rows().get(row as usize).copied()
    }

    fn option_for(&self, row: ContentRow) -> Option<(&PopupSection, &PopupOption)> {
        let ContentRow::Option { section, option } = row else {
            return None;
        };
        let section = self.content.as_ref()?.sections.get(section)?;
        Some((section, section.options.get(option)?))
    }
}

impl Node for PopupWindow {
    fn measure(&mut self, width: MeasureSpec, height: MeasureSpec) -> Size {
        let preferred = self
            .content
            .as_ref()
            .map(|c| self.metrics.preferred_size(c))
            .unwrap_or(Size::ZERO);
        let preferred = if self.orientation.is_sideways() {
            preferred.transposed()
        } else {
            preferred
        };
        self.measured = Size::new(width.resolve(preferred.width), height.resolve(preferred.height));
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

    fn dispatch_touch(&mut self, event: &TouchEvent) -> bool {
        if !self.is_visible() {
            return false;
        }
        match event.action {
            TouchAction::Down => {
                self.pressed_row = self.row_at(event.x, event.y);
            }
            TouchAction::Move => {}
            TouchAction::Up => {
                let released = self.row_at(event.x, event.y);
                if let Some(row) = self.pressed_row.take()
                    && released == Some(row)
                    && let Some((section, option)) = self.option_for(row)
                    && option.enabled
                {
                    let choice = OptionChoice {
                        key: section.key.clone(),
                        value: option.value.clone(),
                    };
                    debug!(key = %choice.key, value = %choice.value, "Popup option chosen");
                    self.pending_choices.push(choice);
                }
            }
            TouchAction::Cancel => {
                self.pressed_row = None;
            }
        }
        true
    }
}
