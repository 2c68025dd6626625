use quill_core::{Point, Rect as PxRect};
use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Nominal width of one terminal cell in engine units
pub const CELL_WIDTH_PX: f32 = 10.0;

/// Nominal height of one terminal cell in engine units
pub const CELL_HEIGHT_PX: f32 = 20.0;

/// Portrait tablet proportions (width : height)
const TABLET_ASPECT: (u16, u16) = (9, 16);

/// Writable screen inside the tablet frame, as fractions of the frame
const SCREEN_LEFT: f32 = 0.145;
const SCREEN_TOP: f32 = 0.245;
const SCREEN_WIDTH: f32 = 0.72;
const SCREEN_HEIGHT: f32 = 0.545;

/// Calculated layout for the TUI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TuiLayout {
    /// Header area (1 line)
    pub header: Rect,
    /// Tablet frame, centred in the main area
    pub tablet: Rect,
    /// Writable screen inside the tablet
    pub screen: Rect,
    /// Stats panel under the tablet
    pub stats: Rect,
    /// Key hints (1 line)
    pub footer: Rect,
}

impl TuiLayout {
    /// Calculate layout based on terminal size
    pub fn calculate(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0), Constraint::Length(3), Constraint::Length(1)])
            .split(area);

        let header = chunks[0];
        let main = chunks[1];
        let footer = chunks[3];

        let tablet = Self::tablet_rect(main);
        let screen = Self::screen_rect(tablet);
        let stats = Rect { x: tablet.x, y: chunks[2].y, width: tablet.width.max(40).min(area.width), height: 3 };
        let stats = Rect { x: center_x(area, stats.width), ..stats };

        Self { header, tablet, screen, stats, footer }
    }

    /// Largest 9:16 frame that fits `area`, assuming cells twice as tall as wide
    fn tablet_rect(area: Rect) -> Rect {
        let (aw, ah) = TABLET_ASPECT;
        let mut height = area.height;
        let mut width = (height as u32 * aw as u32 * 2 / ah as u32) as u16;
        if width > area.width {
            width = area.width;
            height = (width as u32 * ah as u32 / (aw as u32 * 2)) as u16;
        }

        Rect { x: center_x(area, width), y: area.y + (area.height - height) / 2, width, height }
    }

    fn screen_rect(tablet: Rect) -> Rect {
        let scale = |value: u16, fraction: f32| (value as f32 * fraction).round() as u16;
        Rect {
            x: tablet.x + scale(tablet.width, SCREEN_LEFT),
            y: tablet.y + scale(tablet.height, SCREEN_TOP),
            width: scale(tablet.width, SCREEN_WIDTH),
            height: scale(tablet.height, SCREEN_HEIGHT),
        }
    }
}

fn center_x(area: Rect, width: u16) -> u16 {
    area.x + area.width.saturating_sub(width) / 2
}

/// Convert a cell rectangle into engine units
pub fn cells_to_px(rect: Rect) -> PxRect {
    PxRect::new(
        rect.x as f32 * CELL_WIDTH_PX,
        rect.y as f32 * CELL_HEIGHT_PX,
        rect.width as f32 * CELL_WIDTH_PX,
        rect.height as f32 * CELL_HEIGHT_PX,
    )
}

/// Convert an engine point to the cell that contains it, if it lies inside `area`
pub fn px_to_cell(point: Point, area: Rect) -> Option<(u16, u16)> {
    if !point.x.is_finite() || !point.y.is_finite() || point.x < 0.0 || point.y < 0.0 {
        return None;
    }

    let col = (point.x / CELL_WIDTH_PX).floor() as u16;
    let row = (point.y / CELL_HEIGHT_PX).floor() as u16;
    let inside = col >= area.x && col < area.right() && row >= area.y && row < area.bottom();
    inside.then_some((col, row))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contains(outer: Rect, inner: Rect) -> bool {
        inner.x >= outer.x && inner.y >= outer.y && inner.right() <= outer.right() && inner.bottom() <= outer.bottom()
    }

    #[test]
    fn test_layout_rows() {
        let layout = TuiLayout::calculate(Rect::new(0, 0, 120, 40));
        assert_eq!(layout.header.height, 1);
        assert_eq!(layout.footer.height, 1);
        assert_eq!(layout.footer.y, 39);
        assert_eq!(layout.stats.height, 3);
        assert_eq!(layout.stats.y, 36);
    }

    #[test]
    fn test_tablet_is_portrait_and_centered() {
        let area = Rect::new(0, 0, 120, 40);
        let layout = TuiLayout::calculate(area);

        // 35 rows tall -> 39 columns wide
        assert_eq!(layout.tablet.height, 35);
        assert_eq!(layout.tablet.width, 39);
        assert_eq!(layout.tablet.x, (120 - 39) / 2);
    }

    #[test]
    fn test_tablet_limited_by_width() {
        let layout = TuiLayout::calculate(Rect::new(0, 0, 30, 60));
        assert_eq!(layout.tablet.width, 30);
        assert_eq!(layout.tablet.height, 26);
    }

    #[test]
    fn test_screen_inside_tablet() {
        for (w, h) in [(120, 40), (80, 24), (200, 60), (30, 60)] {
            let layout = TuiLayout::calculate(Rect::new(0, 0, w, h));
            assert!(contains(layout.tablet, layout.screen), "{w}x{h}");
        }
    }

    #[test]
    fn test_screen_fractions() {
        let tablet = Rect::new(0, 0, 200, 200);
        let screen = TuiLayout::screen_rect(tablet);
        assert_eq!(screen, Rect::new(29, 49, 144, 109));
    }

    #[test]
    fn test_tiny_terminal_does_not_panic() {
        let layout = TuiLayout::calculate(Rect::new(0, 0, 3, 3));
        assert_eq!(layout.screen.width, 0);
    }

    #[test]
    fn test_px_conversion() {
        let px = cells_to_px(Rect::new(2, 3, 10, 4));
        assert_eq!(px, PxRect::new(20.0, 60.0, 100.0, 80.0));

        let area = Rect::new(0, 0, 80, 24);
        assert_eq!(px_to_cell(Point::new(25.0, 61.0), area), Some((2, 3)));
        assert_eq!(px_to_cell(Point::new(-200.0, -200.0), area), None);
        assert_eq!(px_to_cell(Point::new(900.0, 10.0), area), None);
    }
}
