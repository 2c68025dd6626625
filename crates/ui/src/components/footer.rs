use crate::theme::Theme;

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

/// Footer component displaying keyboard hints
pub struct Footer;

impl Footer {
    const HINTS: &[(&str, &str)] = &[("q", "quit"), ("t", "test message"), ("c", "clear page"), ("i", "interrupt")];

    /// Render footer to the given frame
    pub fn render(&self, frame: &mut Frame<'_>, area: Rect) {
        let paragraph = Paragraph::new(Line::from(Self::hints())).style(Theme::base()).alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
    }

    fn hints() -> Vec<Span<'static>> {
        let mut spans = Vec::new();
        for (i, (key, label)) in Self::HINTS.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw("   "));
            }
            spans.push(Span::styled(format!("[{}]", key), Style::default().fg(Theme::GREEN)));
            spans.push(Span::styled(format!(" {}", label), Theme::muted()));
        }
        spans
    }
}
