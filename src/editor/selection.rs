use std::ops::Range;

/// A `[start, end)` range of byte offsets into the buffer.
///
/// An empty selection (`start == end`) is a caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    /// Byte offset where the selection begins.
    pub start: usize,
    /// Byte offset one past the last selected byte.
    pub end: usize,
}

impl Selection {
    /// Create a selection, ordering the two ends.
    pub const fn new(a: usize, b: usize) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// A caret (empty selection) at `pos`.
    pub const fn caret(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Whether nothing is selected.
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Length of the selection in bytes.
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// The selection as a byte range.
    pub const fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Clamp both ends into `text` and snap them back to char boundaries.
    ///
    /// Any `(text, selection)` pair becomes a valid range after this, so the
    /// buffer operations never panic on stale or out-of-range selections.
    pub fn normalize(self, text: &str) -> Self {
        let start = floor_char_boundary(text, self.start.min(self.end));
        let end = floor_char_boundary(text, self.end.max(self.start));
        Self { start, end }
    }

    /// Whether the selection is a valid range into `text`.
    pub fn is_valid_for(&self, text: &str) -> bool {
        self.start <= self.end
            && self.end <= text.len()
            && text.is_char_boundary(self.start)
            && text.is_char_boundary(self.end)
    }
}

fn floor_char_boundary(text: &str, pos: usize) -> usize {
    let mut pos = pos.min(text.len());
    while !text.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}
