//! Layout measurement seam between the engine and whatever renders the page.
//!
//! The engine never measures text itself. Every tick it asks a [`LayoutProbe`]
//! for the writable container and for caret positions, and treats a missing or
//! zero-sized container as "not mounted yet".

use serde::{Deserialize, Serialize};

/// A point in renderer units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in renderer units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// A rect that can be laid out against: positive, finite size
    pub fn is_usable(&self) -> bool {
        [self.x, self.y, self.width, self.height].iter().all(|v| v.is_finite()) && self.width > 0.0 && self.height > 0.0
    }
}

/// Read-only geometry queries answered by the renderer
pub trait LayoutProbe {
    /// Writable text container, or `None` while it is not mounted
    fn container(&self) -> Option<Rect>;

    /// Caret position just after `text` when written on `row`
    fn caret(&self, row: usize, text: &str) -> Option<Point>;
}

impl<P: LayoutProbe + ?Sized> LayoutProbe for &P {
    fn container(&self) -> Option<Rect> {
        (**self).container()
    }

    fn caret(&self, row: usize, text: &str) -> Option<Point> {
        (**self).caret(row, text)
    }
}

/// Geometry snapshot used for one tick
///
/// Wraps a probe and filters out unusable containers so callers only ever see
/// valid geometry.
#[derive(Debug, Clone, Copy)]
pub struct Measured {
    pub container: Rect,
}

impl Measured {
    pub fn take(probe: &dyn LayoutProbe) -> Option<Self> {
        probe.container().filter(Rect::is_usable).map(|container| Self { container })
    }
}

/// Fixed-pitch probe: every character advances the caret by `char_width`
///
/// Used by the headless host and by tests; the terminal renderer provides its own
/// probe backed by the last drawn frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceProbe {
    pub container: Option<Rect>,
    pub char_width: f32,
    pub line_height: f32,
}

impl MonospaceProbe {
    pub fn new(container: Rect, char_width: f32, line_height: f32) -> Self {
        Self { container: Some(container), char_width, line_height }
    }

    /// A probe whose container is not mounted
    pub fn unmounted() -> Self {
        Self { container: None, char_width: 10.0, line_height: 20.0 }
    }

    /// Number of characters that fit on one row before `margin` is reached
    pub fn columns(&self, margin: f32) -> usize {
        match self.container {
            Some(rect) if self.char_width > 0.0 => ((rect.width - margin) / self.char_width).max(0.0) as usize,
            _ => 0,
        }
    }
}

impl LayoutProbe for MonospaceProbe {
    fn container(&self) -> Option<Rect> {
        self.container
    }

    fn caret(&self, row: usize, text: &str) -> Option<Point> {
        let rect = self.container.filter(Rect::is_usable)?;
        let x = rect.x + text.chars().count() as f32 * self.char_width;
        let y = rect.y + row as f32 * self.line_height;
        Some(Point::new(x, y))
    }
}
