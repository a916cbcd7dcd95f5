use serde::{Deserialize, Serialize};

/// A position in source text. `line` and `column` are 1-based, `offset`
/// is a 0-based byte offset into the source.
///
/// The zero value (`line == 0`) is the sentinel for "no source mapping",
/// matching what the parse engines emit for synthetic instructions.
#[derive(Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Debug, Clone, Copy, Default, Hash)]
pub struct Position {
    pub line: u32,
    pub column: u32,
    pub offset: usize,
}

impl Position {
    /// Start of the document, where synthesized errors are pinned.
    pub const START: Position = Position {
        line: 1,
        column: 1,
        offset: 0,
    };

    pub fn new(line: u32, column: u32, offset: usize) -> Self {
        Position {
            line,
            column,
            offset,
        }
    }

    /// Whether this position maps back to source text.
    pub fn is_known(&self) -> bool {
        self.line > 0
    }
}

/// A half-open region of source text between two positions.
///
/// Span equality is the selection identity: two nodes from different
/// parse runs are "the same selection" when their spans compare equal,
/// which lets a freshly parsed tree preserve a logically equivalent
/// selection without object identity.
#[derive(Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Debug, Clone, Copy, Default, Hash)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Span { start, end }
    }

    /// Containment on `(line, column)` at both ends.
    pub fn contains(&self, other: &Span) -> bool {
        self.start_key() <= other.start_key() && other.end_key() <= self.end_key()
    }

    /// Whether `other` begins at or after this span's end.
    pub fn precedes(&self, other: &Span) -> bool {
        self.end_key() <= other.start_key()
    }

    fn start_key(&self) -> (u32, u32) {
        (self.start.line, self.start.column)
    }

    fn end_key(&self) -> (u32, u32) {
        (self.end.line, self.end.column)
    }
}
