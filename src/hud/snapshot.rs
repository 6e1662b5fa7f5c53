// SPDX-License-Identifier: GPL-3.0-only

//! Serializable view of the overlay state

use super::indicator::IndicatorKind;
use super::popup::PopupContent;
use crate::scene::{Rect, Visibility};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSnapshot {
    pub kind: IndicatorKind,
    pub icon: String,
    pub keys: Vec<String>,
    pub bounds: Rect,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSnapshot {
    pub bounds: Rect,
    pub activated: bool,
    pub selected: Option<usize>,
    pub indicators: Vec<IndicatorSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopupSnapshot {
    pub visibility: Visibility,
    pub bounds: Rect,
    pub anchor_position: i32,
    pub content: Option<PopupContent>,
}

/// State of the whole overlay at one point in time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HudSnapshot {
    pub width: i32,
    pub height: i32,
    pub orientation: i32,
    pub anchor: (i32, i32),
    pub indicator_bar: Option<BarSnapshot>,
    pub popup_window: Option<PopupSnapshot>,
}
