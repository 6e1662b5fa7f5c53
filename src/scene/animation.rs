// SPDX-License-Identifier: GPL-3.0-only

//! Linear alpha animation

use std::time::{Duration, Instant};

/// Opacity ramp from `from` to `to` over `duration`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlphaAnimation {
    from: f32,
    to: f32,
    duration: Duration,
    started: Instant,
}

impl AlphaAnimation {
    pub fn new(from: f32, to: f32, duration: Duration) -> Self {
        Self::starting_at(from, to, duration, Instant::now())
    }

    pub fn starting_at(from: f32, to: f32, duration: Duration, started: Instant) -> Self {
        Self {
            from: from.clamp(0.0, 1.0),
            to: to.clamp(0.0, 1.0),
            duration,
            started,
        }
    }

    pub fn fade_in(duration: Duration) -> Self {
        Self::new(0.0, 1.0, duration)
    }

    pub fn fade_out(duration: Duration) -> Self {
        Self::new(1.0, 0.0, duration)
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Opacity at `now`; holds the end value once finished
    pub fn alpha_at(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return self.to;
        }
        let elapsed = now.saturating_duration_since(self.started);
        let progress = (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0);
        self.from + (self.to - self.from) * progress
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started) >= self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alpha_progression() {
        let start = Instant::now();
        let anim = AlphaAnimation::starting_at(0.0, 1.0, Duration::from_millis(200), start);
        assert_eq!(anim.alpha_at(start), 0.0);
        let mid = anim.alpha_at(start + Duration::from_millis(100));
        assert!((mid - 0.5).abs() < 0.01);
        assert_eq!(anim.alpha_at(start + Duration::from_secs(5)), 1.0);
        assert!(anim.is_finished(start + Duration::from_millis(200)));
        assert!(!anim.is_finished(start + Duration::from_millis(199)));
    }

    #[test]
    fn test_zero_duration_jumps_to_end() {
        let anim = AlphaAnimation::new(1.0, 0.0, Duration::ZERO);
        assert_eq!(anim.alpha_at(Instant::now()), 0.0);
    }
}
