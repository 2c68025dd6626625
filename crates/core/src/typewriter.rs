use crate::layout::LayoutProbe;
use crate::message::{IncomingMessage, Line};
use crate::overflow::OverflowGuard;

/// Outcome of one typing tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeStep {
    /// One more character is visible
    Revealed(char),
    /// The next character would cross the right edge; nothing was appended
    Overflow,
    /// Every character is visible and the line can be closed
    Finished,
}

/// Progressive reveal of a single message on a single row
///
/// A message of `n` characters takes `n` revealing ticks followed by one
/// finishing tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Typewriter {
    line: Line,
    source: Vec<char>,
    revealed: usize,
    row: usize,
}

impl Typewriter {
    pub fn new(line: Line, message: &IncomingMessage, row: usize) -> Self {
        Self { line, source: message.text.chars().collect(), revealed: 0, row }
    }

    pub fn line(&self) -> &Line {
        &self.line
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn visible(&self) -> &str {
        &self.line.text
    }

    /// Characters revealed so far (the dispatcher's char index)
    pub fn revealed(&self) -> usize {
        self.revealed
    }

    pub fn total(&self) -> usize {
        self.source.len()
    }

    pub fn is_complete(&self) -> bool {
        self.revealed >= self.source.len()
    }

    pub fn tick(&mut self, guard: &OverflowGuard, probe: &dyn LayoutProbe) -> TypeStep {
        let Some(&candidate) = self.source.get(self.revealed) else {
            return TypeStep::Finished;
        };

        if guard.would_overflow(probe, self.row, &self.line.text, candidate) {
            return TypeStep::Overflow;
        }

        self.line.text.push(candidate);
        self.revealed += 1;
        TypeStep::Revealed(candidate)
    }

    /// Close the line with whatever is visible now
    pub fn finish(self) -> Line {
        self.line
    }

    /// Close the line after an overflow at the next character
    ///
    /// The character that overflowed and the one before it are dropped to make
    /// room for `ellipsis`; the rest of the message is discarded.
    pub fn truncate(mut self, ellipsis: &str) -> Line {
        let keep = self.revealed.saturating_sub(1);
        let mut text: String = self.source[..keep].iter().collect();
        text.push_str(ellipsis);

        self.line.text = text;
        self.line.truncated = true;
        self.line
    }
}
