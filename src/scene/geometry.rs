// SPDX-License-Identifier: GPL-3.0-only

//! Integer pixel geometry

use serde::Serialize;

/// Measured size of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0,
        height: 0,
    };

    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Same size rotated by a quarter turn
    pub fn transposed(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }
}

/// Axis-aligned rectangle, right/bottom exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Rectangle at `(left, top)` with the given size
    pub fn from_origin_size(left: i32, top: i32, size: Size) -> Self {
        Self::new(left, top, left + size.width, top + size.height)
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// Vertical midpoint, rounded toward the top
    pub fn center_y(&self) -> i32 {
        (self.top + self.bottom) / 2
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left as f32
            && x < self.right as f32
            && y >= self.top as f32
            && y < self.bottom as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_dimensions() {
        let rect = Rect::new(10, 20, 110, 70);
        assert_eq!(rect.width(), 100);
        assert_eq!(rect.height(), 50);
        assert_eq!(rect.center_y(), 45);
        assert_eq!(rect.size(), Size::new(100, 50));
    }

    #[test]
    fn test_rect_contains_is_half_open() {
        let rect = Rect::new(0, 0, 10, 10);
        assert!(rect.contains(0.0, 0.0));
        assert!(rect.contains(9.5, 9.5));
        assert!(!rect.contains(10.0, 5.0));
        assert!(!rect.contains(5.0, -0.1));
    }

    #[test]
    fn test_empty_rect() {
        assert!(Rect::default().is_empty());
        assert!(!Rect::new(0, 0, 1, 1).is_empty());
    }
}
