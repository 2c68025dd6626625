use crate::{layout::TuiLayout, theme::Theme};

use quill_core::{Line as PageLine, PageView, Phase};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

/// Rows scrolled off the top so the open line (or the last line) stays visible
pub fn scroll_offset(view: &PageView, pitch: u16, height: u16) -> u16 {
    let rows = view.lines.len() + usize::from(view.active.is_some());
    if rows == 0 || height == 0 {
        return 0;
    }

    let last_top = (rows - 1) as u32 * pitch as u32;
    (last_top + 1).saturating_sub(height as u32).min(u16::MAX as u32) as u16
}

/// The tablet: bezel, screen, written lines and the open line
pub struct Tablet<'a> {
    view: &'a PageView,
    pitch: u16,
    scroll: u16,
    wipe: Option<f32>,
}

impl<'a> Tablet<'a> {
    pub fn new(view: &'a PageView, pitch: u16, scroll: u16) -> Self {
        Self { view, pitch: pitch.max(1), scroll, wipe: None }
    }

    /// Show a wipe that has covered `progress` of the screen
    pub fn wiping(mut self, progress: Option<f32>) -> Self {
        self.wipe = progress;
        self
    }

    pub fn render(&self, frame: &mut Frame<'_>, layout: &TuiLayout) {
        let bezel = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Thick)
            .border_style(Style::default().fg(Theme::BEZEL_EDGE))
            .style(Theme::bezel());
        frame.render_widget(bezel, layout.tablet);
        frame.render_widget(Block::default().style(Theme::screen()), layout.screen);

        let screen = layout.screen;
        if screen.width == 0 || screen.height == 0 {
            return;
        }

        let wiped_rows = self.wipe.map(|p| (p.clamp(0.0, 1.0) * screen.height as f32).ceil() as u16).unwrap_or(0);
        let clearing = self.view.phase == Phase::Clearing;

        for (row, line) in self.view.lines.iter().enumerate() {
            let style = if clearing {
                Theme::dry_ink(&line.ink.dry).add_modifier(Modifier::DIM)
            } else {
                Theme::dry_ink(&line.ink.dry)
            };
            self.render_line(frame, screen, row, line, style, wiped_rows);
        }

        if let Some(active) = &self.view.active {
            let style = Theme::wet_ink(&active.ink.wet);
            self.render_line(frame, screen, self.view.lines.len(), active, style, wiped_rows);
        }
    }

    fn render_line(
        &self, frame: &mut Frame<'_>, screen: Rect, row: usize, line: &PageLine, style: Style, wiped_rows: u16,
    ) {
        let Some(offset) = self.row_offset(row) else {
            return;
        };
        if offset >= screen.height || offset < wiped_rows {
            return;
        }

        let area = Rect { x: screen.x, y: screen.y + offset, width: screen.width, height: 1 };
        frame.render_widget(Paragraph::new(Line::from(Span::styled(line.text.as_str(), style))), area);
    }

    /// Screen row of page line `row` after scrolling, if it is not scrolled away
    fn row_offset(&self, row: usize) -> Option<u16> {
        let top = row as u32 * self.pitch as u32;
        let offset = top.checked_sub(self.scroll as u32)?;
        u16::try_from(offset).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::{IncomingMessage, InkColors, Line as PageLine};

    fn line(id: &str) -> PageLine {
        let mut line = PageLine::open(&IncomingMessage::new(id, "x", id), &InkColors::default());
        line.text = id.to_string();
        line
    }

    fn view(lines: usize, active: bool) -> PageView {
        PageView {
            lines: (0..lines).map(|i| line(&format!("l{i}"))).collect(),
            active: active.then(|| line("open")),
            capacity: 12,
            ..PageView::default()
        }
    }

    #[test]
    fn test_no_scroll_when_everything_fits() {
        assert_eq!(scroll_offset(&view(0, false), 2, 10), 0);
        assert_eq!(scroll_offset(&view(4, true), 2, 10), 0);
    }

    #[test]
    fn test_scroll_keeps_open_line_visible() {
        // rows at 0, 2, .., 12 (open line); 10 rows visible
        let view = view(6, true);
        let scroll = scroll_offset(&view, 2, 10);
        assert_eq!(scroll, 3);

        let tablet = Tablet::new(&view, 2, scroll);
        assert_eq!(tablet.row_offset(6), Some(9));
        assert_eq!(tablet.row_offset(1), None);
    }

    #[test]
    fn test_row_offset_without_scroll() {
        let view = view(2, false);
        let tablet = Tablet::new(&view, 1, 0);
        assert_eq!(tablet.row_offset(0), Some(0));
        assert_eq!(tablet.row_offset(5), Some(5));
    }
}
