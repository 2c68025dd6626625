use quill_core::{Config, StatsUpdate};
use std::time::{Duration, Instant};

use crate::motion::PenMotion;

/// Everything the renderer tracks beyond the engine's page view
#[derive(Debug, Clone)]
pub struct AppState {
    /// Latest counters from the feed
    pub stats: StatsUpdate,
    /// Whether the feed source is connected
    pub connected: bool,
    pub pen: PenMotion,
    /// Set while the page wipe runs
    pub clearing_since: Option<Instant>,
    pub clear_delay: Duration,
    /// Blank rows between written lines
    pub line_spacing: u16,
    /// Lines written since start
    pub lines_written: u64,
    pub should_exit: bool,
}

impl AppState {
    pub fn new(config: &Config, connected: bool) -> Self {
        Self {
            stats: StatsUpdate::default(),
            connected,
            pen: PenMotion::new(Instant::now()),
            clearing_since: None,
            clear_delay: config.engine.clear_delay(),
            line_spacing: config.display.line_spacing,
            lines_written: 0,
            should_exit: false,
        }
    }

    /// Terminal rows between the tops of two consecutive lines
    pub fn line_pitch(&self) -> u16 {
        self.line_spacing.saturating_add(1)
    }

    /// Fraction of the wipe that has played, if one is running
    pub fn wipe_progress(&self, now: Instant) -> Option<f32> {
        let since = self.clearing_since?;
        if self.clear_delay.is_zero() {
            return Some(1.0);
        }
        let elapsed = now.saturating_duration_since(since).as_secs_f32();
        Some((elapsed / self.clear_delay.as_secs_f32()).min(1.0))
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(&Config::default(), false)
    }
}
