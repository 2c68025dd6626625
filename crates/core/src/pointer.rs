//! Pen choreography.
//!
//! [`pose_for`] is a pure function from what the engine is doing plus fresh
//! geometry to where the pen should be. Nothing here keeps state between ticks;
//! randomness is drawn by the caller and passed in.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::PointerConfig;
use crate::layout::{LayoutProbe, Measured, Point};

/// Fallback position used before the container is mounted
pub const OFFSCREEN: Point = Point::new(-200.0, -200.0);

/// Vertical wobble applied while writing, indexed by text length modulo 4
const JITTER_CYCLE: [f32; 4] = [0.0, -1.0, 0.0, 1.0];

/// Transition curve the renderer should use to reach a pose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    Linear,
    /// Accelerating
    EaseIn,
    /// Decelerating
    EaseOut,
}

impl Easing {
    pub fn as_str(&self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::EaseIn => "ease-in",
            Easing::EaseOut => "ease-out",
        }
    }

    /// Map linear progress `t` in `[0, 1]` onto this curve
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t * t,
            Easing::EaseOut => 1.0 - (1.0 - t).powi(3),
        }
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the pen should be and how it should get there
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerPose {
    pub x: f32,
    pub y: f32,
    pub transition_ms: u64,
    pub easing: Easing,
    pub blur: f32,
}

impl PointerPose {
    /// Parked pose used when there is no usable geometry
    pub fn offscreen(config: &PointerConfig) -> Self {
        Self {
            x: OFFSCREEN.x,
            y: OFFSCREEN.y,
            transition_ms: config.park_transition_ms,
            easing: Easing::EaseIn,
            blur: config.park_blur,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// What the pen is doing this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stance<'a> {
    /// Idle or clearing
    Parked,
    /// Heading to the start of `row`
    Traveling { row: usize },
    /// Writing `text` on `row`
    Typing { row: usize, text: &'a str },
    /// The next character would overflow; the pen must not move
    OverflowPending,
}

/// Compute the pen pose for `stance`
///
/// Returns `None` when the previous pose must be held. `noise` is a sample from
/// `[-config.noise, config.noise]` on each axis; it only affects typing poses.
pub fn pose_for(
    stance: Stance<'_>, probe: &dyn LayoutProbe, config: &PointerConfig, char_interval_ms: u64, noise: Point,
) -> Option<PointerPose> {
    let Some(measured) = Measured::take(probe) else {
        return match stance {
            Stance::OverflowPending => None,
            _ => Some(PointerPose::offscreen(config)),
        };
    };

    let parked = || {
        let container = measured.container;
        PointerPose {
            x: container.right() + config.park_gap,
            y: container.center().y + container.height * 0.25,
            transition_ms: config.park_transition_ms,
            easing: Easing::EaseIn,
            blur: config.park_blur,
        }
    };

    match stance {
        Stance::OverflowPending => None,
        Stance::Parked => Some(parked()),
        Stance::Traveling { row } => Some(match probe.caret(row, "") {
            Some(anchor) => PointerPose {
                x: anchor.x + config.tip_offset_x,
                y: anchor.y + config.tip_offset_y,
                transition_ms: config.travel_transition_ms,
                easing: Easing::EaseOut,
                blur: config.travel_blur,
            },
            None => parked(),
        }),
        Stance::Typing { row, text } => Some(match probe.caret(row, text) {
            Some(anchor) => {
                let jitter = JITTER_CYCLE[text.chars().count() % JITTER_CYCLE.len()] * config.jitter_amplitude;
                let bound = config.noise;
                PointerPose {
                    x: anchor.x + config.tip_offset_x + noise.x.clamp(-bound, bound),
                    y: anchor.y + config.tip_offset_y + jitter + noise.y.clamp(-bound, bound),
                    transition_ms: char_interval_ms,
                    easing: Easing::Linear,
                    blur: 0.0,
                }
            }
            None => parked(),
        }),
    }
}
