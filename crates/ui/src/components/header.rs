use crate::theme::Theme;

use quill_core::PageView;
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

/// Header component: title, engine phase, backlog and page fill
pub struct Header<'a> {
    view: &'a PageView,
}

impl<'a> Header<'a> {
    pub fn new(view: &'a PageView) -> Self {
        Self { view }
    }

    /// Render the header to the given frame
    pub fn render(&self, frame: &mut Frame<'_>, area: Rect) {
        let left = Line::from(vec![
            Span::styled(" QUILL ", Style::default().fg(Theme::BG).bg(Theme::GREEN).add_modifier(Modifier::BOLD)),
            Span::raw(" "),
            Theme::phase_span(self.view.phase),
        ]);
        frame.render_widget(Paragraph::new(left).style(Theme::base()), area);

        let right = Paragraph::new(Span::styled(self.summary(), Theme::muted())).alignment(Alignment::Right);
        frame.render_widget(right, area);
    }

    /// `queued N  page L/C`
    fn summary(&self) -> String {
        format!("queued {}  page {}/{} ", self.view.queued, self.view.lines.len(), self.view.capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::Phase;

    #[test]
    fn test_summary() {
        let view = PageView { queued: 3, capacity: 12, phase: Phase::Typing, ..PageView::default() };
        let header = Header::new(&view);
        assert_eq!(header.summary(), "queued 3  page 0/12 ");
    }
}
