// SPDX-License-Identifier: GPL-3.0-only

//! Minimal retained-scene layer the overlay is built on
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐   submit / submit_and_wait   ┌──────────────┐
//! │ other threads        │ ───────────────────────────► │ RenderQueue  │
//! │ (timers, host, GPS)  │                              └──────┬───────┘
//! └──────────────────────┘                                     │ drained once per frame
//!                                                              ▼
//!                                              ┌───────────────────────────────┐
//!                                              │ render thread: Node tree      │
//!                                              │ measure → layout → touch      │
//!                                              └───────────────────────────────┘
//! ```
//!
//! Nodes own their children outright. All coordinates are overlay pixels with
//! the origin at the overlay's top-left corner.

pub mod animation;
pub mod geometry;
pub mod node;
pub mod render_queue;

pub use animation::AlphaAnimation;
pub use geometry::{Rect, Size};
pub use node::{MeasureSpec, Node, Orientation, TouchAction, TouchEvent, Visibility};
pub use render_queue::{RenderQueue, RenderQueueHandle, RenderTask};
