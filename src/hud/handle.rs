// SPDX-License-Identifier: GPL-3.0-only

//! Cross-thread entry point to the overlay

use super::head_up_display::{HeadUpDisplay, validate_key_values};
use crate::errors::HudResult;
use crate::scene::RenderQueueHandle;
use tracing::warn;

/// Thread-safe handle that marshals updates onto the render thread.
///
/// Validation happens synchronously in the caller; the mutation itself runs
/// the next time the render thread calls [`HeadUpDisplay::process_pending`].
///
/// Every call is queued, including calls made on the render thread itself.
/// The handle holds no `&mut HeadUpDisplay` to apply them with. Code already on
/// the render thread should call the inherent
/// [`HeadUpDisplay::override_settings`], [`HeadUpDisplay::restore_settings`] and
/// [`HeadUpDisplay::set_gps_has_signal`], which apply immediately.
#[derive(Clone)]
pub struct HudHandle {
    queue: RenderQueueHandle<HeadUpDisplay>,
}

impl HudHandle {
    pub(crate) fn new(queue: RenderQueueHandle<HeadUpDisplay>) -> Self {
        Self { queue }
    }

    /// Queue key/value overrides; an odd-length list fails before anything is queued
    pub fn override_settings<S: AsRef<str>>(&self, key_values: &[S]) -> HudResult<()> {
        validate_key_values(key_values)?;
        let key_values: Vec<String> = key_values.iter().map(|s| s.as_ref().to_string()).collect();
        self.queue.submit(move |hud| {
            if let Err(e) = hud.override_settings(&key_values) {
                warn!(error = %e, "Failed to apply overrides");
            }
        })
    }

    /// Queue removal of overrides for `keys`
    pub fn restore_settings<S: AsRef<str>>(&self, keys: &[S]) -> HudResult<()> {
        let keys: Vec<String> = keys.iter().map(|s| s.as_ref().to_string()).collect();
        self.queue.submit(move |hud| {
            if let Err(e) = hud.restore_settings(&keys) {
                warn!(error = %e, "Failed to restore overrides");
            }
        })
    }

    /// Queue a GPS signal update
    pub fn set_gps_has_signal(&self, has_signal: bool) -> HudResult<()> {
        self.queue.submit(move |hud| hud.set_gps_has_signal(has_signal))
    }

    /// Whether the caller is the overlay's render thread
    pub fn is_render_thread(&self) -> bool {
        self.queue.is_render_thread()
    }
}
