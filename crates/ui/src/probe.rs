use quill_core::{LayoutProbe, Point, Rect as PxRect};
use ratatui::layout::Rect;
use std::sync::{Arc, RwLock};
use unicode_width::UnicodeWidthStr;

use crate::layout::{CELL_HEIGHT_PX, CELL_WIDTH_PX, cells_to_px};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Geometry {
    screen: Option<Rect>,
    /// Terminal rows between the tops of two consecutive lines
    pitch: u16,
    /// Rows scrolled off the top of the screen
    scroll: u16,
}

/// Layout probe backed by the most recently drawn frame
///
/// The renderer writes the screen rectangle and scroll offset after laying out
/// each frame; the engine task reads them when it ticks. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct TerminalProbe {
    geometry: Arc<RwLock<Geometry>>,
}

impl TerminalProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the geometry of the frame just laid out
    ///
    /// Returns `true` when it differs from what the engine last saw.
    pub fn update(&self, screen: Rect, pitch: u16, scroll: u16) -> bool {
        let screen = (screen.width > 0 && screen.height > 0).then_some(screen);
        let next = Geometry { screen, pitch: pitch.max(1), scroll };

        match self.geometry.write() {
            Ok(mut geometry) => {
                let changed = *geometry != next;
                *geometry = next;
                changed
            }
            Err(_) => false,
        }
    }

    fn snapshot(&self) -> Geometry {
        self.geometry.read().map(|g| *g).unwrap_or_default()
    }
}

impl LayoutProbe for TerminalProbe {
    fn container(&self) -> Option<PxRect> {
        self.snapshot().screen.map(cells_to_px)
    }

    fn caret(&self, row: usize, text: &str) -> Option<Point> {
        let geometry = self.snapshot();
        let screen = geometry.screen?;

        let line_top = row as f32 * geometry.pitch as f32 - geometry.scroll as f32;
        let x = (screen.x as f32 + text.width() as f32) * CELL_WIDTH_PX;
        let y = (screen.y as f32 + line_top) * CELL_HEIGHT_PX;
        Some(Point::new(x, y))
    }
}
