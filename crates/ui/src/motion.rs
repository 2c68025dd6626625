use quill_core::{Easing, OFFSCREEN, Point, PointerPose};
use std::time::{Duration, Instant};

/// Blur above which the pen is drawn faded
pub const HEAVY_BLUR: f32 = 4.0;

/// Animated pen position between two engine poses
///
/// Each new pose starts a transition from wherever the pen is drawn right now,
/// so retargeting mid-flight never jumps.
#[derive(Debug, Clone, PartialEq)]
pub struct PenMotion {
    from: Point,
    target: Point,
    started: Instant,
    duration: Duration,
    easing: Easing,
    blur: f32,
}

impl PenMotion {
    pub fn new(now: Instant) -> Self {
        Self {
            from: OFFSCREEN,
            target: OFFSCREEN,
            started: now,
            duration: Duration::ZERO,
            easing: Easing::Linear,
            blur: 0.0,
        }
    }

    pub fn retarget(&mut self, pose: &PointerPose, now: Instant) {
        self.from = self.position(now);
        self.target = pose.position();
        self.started = now;
        self.duration = Duration::from_millis(pose.transition_ms);
        self.easing = pose.easing;
        self.blur = pose.blur;
    }

    /// Where the pen is drawn at `now`
    pub fn position(&self, now: Instant) -> Point {
        let t = self.progress(now);
        let eased = self.easing.apply(t);
        Point::new(
            self.from.x + (self.target.x - self.from.x) * eased,
            self.from.y + (self.target.y - self.from.y) * eased,
        )
    }

    /// Linear progress of the current transition in `[0, 1]`
    pub fn progress(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    pub fn is_settled(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }

    pub fn target(&self) -> Point {
        self.target
    }

    pub fn blur(&self) -> f32 {
        self.blur
    }
}
