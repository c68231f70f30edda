use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A zero-based line/column position inside a document.
///
/// Columns count bytes from the start of the line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// A half-open range between two positions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Check if a position is within this range (end inclusive)
    pub fn contains(&self, position: Position) -> bool {
        position >= self.start && position <= self.end
    }

    /// Check if another range lies entirely within this one
    pub fn contains_range(&self, other: &Range) -> bool {
        self.contains(other.start) && self.contains(other.end)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A range inside a specific file
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub uri: PathBuf,
    pub range: Range,
}

impl Location {
    pub fn new(uri: impl Into<PathBuf>, range: Range) -> Self {
        Self {
            uri: uri.into(),
            range,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_contains() {
        let range = Range::new(Position::new(1, 4), Position::new(3, 0));
        assert!(range.contains(Position::new(1, 4)));
        assert!(range.contains(Position::new(2, 100)));
        assert!(range.contains(Position::new(3, 0)));
        assert!(!range.contains(Position::new(1, 3)));
        assert!(!range.contains(Position::new(3, 1)));
    }

    #[test]
    fn test_range_contains_range() {
        let outer = Range::new(Position::new(0, 0), Position::new(10, 0));
        let inner = Range::new(Position::new(2, 0), Position::new(4, 2));
        assert!(outer.contains_range(&inner));
        assert!(!inner.contains_range(&outer));
    }
}
