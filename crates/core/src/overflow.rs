use crate::layout::{LayoutProbe, Measured};

/// Right-edge check for the line being written
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverflowGuard {
    margin: f32,
}

impl OverflowGuard {
    pub fn new(margin: f32) -> Self {
        Self { margin }
    }

    /// Would appending `candidate` to `visible` on `row` cross the writable edge?
    ///
    /// Without usable geometry nothing overflows; the character-count heuristic in
    /// the renderer keeps unmeasured lines short enough.
    pub fn would_overflow(&self, probe: &dyn LayoutProbe, row: usize, visible: &str, candidate: char) -> bool {
        let Some(measured) = Measured::take(probe) else {
            return false;
        };

        let mut projected = String::with_capacity(visible.len() + candidate.len_utf8());
        projected.push_str(visible);
        projected.push(candidate);

        match probe.caret(row, &projected) {
            Some(end) => end.x > measured.container.right() - self.margin,
            None => false,
        }
    }
}
