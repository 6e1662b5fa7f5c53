// SPDX-License-Identifier: GPL-3.0-only

//! Node capability trait and the input types it dispatches

use super::geometry::{Rect, Size};
use crate::errors::{HudError, HudResult};
use serde::Serialize;

/// Size constraint handed to a node's measure pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasureSpec {
    /// Node must be exactly this size
    Exactly(i32),
    /// Node may be any size up to this one
    AtMost(i32),
    /// No constraint
    Unspecified,
}

impl MeasureSpec {
    /// Resolve a node's preferred dimension against this constraint
    pub fn resolve(self, desired: i32) -> i32 {
        match self {
            MeasureSpec::Exactly(size) => size,
            MeasureSpec::AtMost(max) => desired.min(max),
            MeasureSpec::Unspecified => desired,
        }
    }
}

/// Visibility of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Visibility {
    Visible,
    #[default]
    Invisible,
}

/// Device orientation in quarter turns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Orientation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Orientation {
    /// Convert from degrees; any multiple of 90 is accepted and normalized
    pub fn from_degrees(degrees: i32) -> HudResult<Self> {
        if degrees % 90 != 0 {
            return Err(HudError::InvalidOrientation(degrees));
        }
        Ok(match degrees.rem_euclid(360) {
            0 => Orientation::Deg0,
            90 => Orientation::Deg90,
            180 => Orientation::Deg180,
            _ => Orientation::Deg270,
        })
    }

    pub fn degrees(self) -> i32 {
        match self {
            Orientation::Deg0 => 0,
            Orientation::Deg90 => 90,
            Orientation::Deg180 => 180,
            Orientation::Deg270 => 270,
        }
    }

    /// Whether content is drawn sideways in this orientation
    pub fn is_sideways(self) -> bool {
        matches!(self, Orientation::Deg90 | Orientation::Deg270)
    }

    /// Next orientation clockwise
    pub fn rotated(self) -> Self {
        match self {
            Orientation::Deg0 => Orientation::Deg90,
            Orientation::Deg90 => Orientation::Deg180,
            Orientation::Deg180 => Orientation::Deg270,
            Orientation::Deg270 => Orientation::Deg0,
        }
    }
}

/// Phase of a touch gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchAction {
    Down,
    Move,
    Up,
    Cancel,
}

/// A single touch sample in overlay pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchEvent {
    pub action: TouchAction,
    pub x: f32,
    pub y: f32,
}

impl TouchEvent {
    pub fn new(action: TouchAction, x: f32, y: f32) -> Self {
        Self { action, x, y }
    }

    pub fn down(x: f32, y: f32) -> Self {
        Self::new(TouchAction::Down, x, y)
    }

    pub fn moved(x: f32, y: f32) -> Self {
        Self::new(TouchAction::Move, x, y)
    }

    pub fn up(x: f32, y: f32) -> Self {
        Self::new(TouchAction::Up, x, y)
    }

    /// Whether this sample ends the gesture
    pub fn ends_gesture(&self) -> bool {
        matches!(self.action, TouchAction::Up | TouchAction::Cancel)
    }
}

/// Capabilities every displayable node provides
pub trait Node {
    /// Compute the node's size under the given constraints and remember it
    fn measure(&mut self, width: MeasureSpec, height: MeasureSpec) -> Size;

    /// Size computed by the last `measure`
    fn measured_size(&self) -> Size;

    /// Place the node (and its children) at `bounds`
    fn layout(&mut self, bounds: Rect);

    /// Bounds assigned by the last `layout`
    fn bounds(&self) -> Rect;

    /// Handle a touch sample; returns true when consumed
    fn dispatch_touch(&mut self, event: &TouchEvent) -> bool;

    fn hit(&self, event: &TouchEvent) -> bool {
        self.bounds().contains(event.x, event.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_spec_resolve() {
        assert_eq!(MeasureSpec::Exactly(100).resolve(40), 100);
        assert_eq!(MeasureSpec::AtMost(100).resolve(40), 40);
        assert_eq!(MeasureSpec::AtMost(100).resolve(400), 100);
        assert_eq!(MeasureSpec::Unspecified.resolve(400), 400);
    }

    #[test]
    fn test_orientation_from_degrees() {
        assert_eq!(Orientation::from_degrees(0).unwrap(), Orientation::Deg0);
        assert_eq!(Orientation::from_degrees(270).unwrap(), Orientation::Deg270);
        assert_eq!(Orientation::from_degrees(360).unwrap(), Orientation::Deg0);
        assert_eq!(Orientation::from_degrees(-90).unwrap(), Orientation::Deg270);
        assert_eq!(
            Orientation::from_degrees(45),
            Err(HudError::InvalidOrientation(45))
        );
    }

    #[test]
    fn test_orientation_rotation_cycle() {
        let mut orientation = Orientation::Deg0;
        for _ in 0..4 {
            orientation = orientation.rotated();
        }
        assert_eq!(orientation, Orientation::Deg0);
        assert!(Orientation::Deg90.is_sideways());
        assert!(!Orientation::Deg180.is_sideways());
    }
}
