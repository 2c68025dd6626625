use crate::error::PageError;
use crate::message::Line;

/// Bounded list of closed lines
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    lines: Vec<Line>,
    capacity: usize,
}

impl Page {
    pub fn new(capacity: usize) -> Self {
        Self { lines: Vec::with_capacity(capacity), capacity }
    }

    /// Append a closed line; fails once the page holds `capacity` lines
    pub fn append(&mut self, line: Line) -> Result<(), PageError> {
        if self.is_full() {
            return Err(PageError::Full { capacity: self.capacity });
        }
        self.lines.push(line);
        Ok(())
    }

    pub fn reset(&mut self) {
        self.lines.clear();
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.lines.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }
}
