use crate::{state::AppState, theme::Theme};

use quill_core::group_thousands;
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

/// Stats panel under the tablet: feed counters and connection status
pub struct StatsPanel<'a> {
    state: &'a AppState,
}

impl<'a> StatsPanel<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    pub fn render(&self, frame: &mut Frame<'_>, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Theme::GREEN))
            .style(Theme::base());

        let paragraph = Paragraph::new(Line::from(self.spans())).block(block).alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
    }

    fn spans(&self) -> Vec<Span<'static>> {
        let value = Style::default().fg(Theme::GREEN).add_modifier(Modifier::BOLD);
        vec![
            Span::styled("VIEWERS ", Theme::muted()),
            Span::styled(group_thousands(self.state.stats.viewers), value),
            Span::raw("  "),
            Span::styled("SUBS ", Theme::muted()),
            Span::styled(group_thousands(self.state.stats.subscribers), value),
            Span::raw("  "),
            Theme::connection_span(self.state.connected),
        ]
    }
}
