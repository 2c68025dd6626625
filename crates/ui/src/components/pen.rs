use crate::{
    layout::px_to_cell,
    motion::{HEAVY_BLUR, PenMotion},
    theme::Theme,
};

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::Span,
};
use std::time::Instant;

/// Pen tip glyph
pub const PEN_GLYPH: &str = "✎";

/// Pen overlay drawn at the animated pose
pub struct Pen<'a> {
    motion: &'a PenMotion,
    now: Instant,
}

impl<'a> Pen<'a> {
    pub fn new(motion: &'a PenMotion, now: Instant) -> Self {
        Self { motion, now }
    }

    pub fn render(&self, frame: &mut Frame<'_>) {
        let area = frame.area();
        let Some((col, row)) = px_to_cell(self.motion.position(self.now), area) else {
            return;
        };

        let span = Span::styled(PEN_GLYPH, Self::style(self.motion.blur()));
        frame.render_widget(span, Rect { x: col, y: row, width: 1, height: 1 });
    }

    /// Sharper pens are brighter
    fn style(blur: f32) -> Style {
        if blur <= 0.0 {
            Style::default().fg(Theme::GREEN).add_modifier(Modifier::BOLD)
        } else if blur <= HEAVY_BLUR {
            Style::default().fg(Theme::GREEN)
        } else {
            Style::default().fg(Theme::MUTED).add_modifier(Modifier::DIM)
        }
    }
}
