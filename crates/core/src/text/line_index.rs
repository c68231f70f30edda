use super::Span;
use crate::types::{Position, Range};

/// Converts between byte offsets and line/column positions
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    text_len: usize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (idx, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(idx + 1);
            }
        }
        Self {
            line_starts,
            text_len: text.len(),
        }
    }

    pub fn position_at(&self, offset: usize) -> Position {
        let offset = offset.min(self.text_len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(index) => index,
            Err(index) => index.saturating_sub(1),
        };
        let line_start = self.line_starts.get(line).copied().unwrap_or(0);
        Position::new(line as u32, (offset - line_start) as u32)
    }

    pub fn offset_at(&self, position: Position) -> Option<usize> {
        let line = position.line as usize;
        let line_start = *self.line_starts.get(line)?;
        let line_end = self
            .line_starts
            .get(line + 1)
            .copied()
            .unwrap_or(self.text_len);
        let offset = line_start + position.character as usize;
        if offset > line_end { None } else { Some(offset) }
    }

    pub fn range(&self, span: Span) -> Range {
        Range::new(self.position_at(span.start), self.position_at(span.end))
    }

    /// Convert a range back into byte offsets, clamping unknown positions
    pub fn span(&self, range: &Range) -> Span {
        let start = self.offset_at(range.start).unwrap_or(self.text_len);
        let end = self.offset_at(range.end).unwrap_or(self.text_len);
        Span::new(start, end)
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_round_trip() {
        let text = "abc\ndef\n\nghi";
        let index = LineIndex::new(text);
        assert_eq!(index.position_at(0), Position::new(0, 0));
        assert_eq!(index.position_at(4), Position::new(1, 0));
        assert_eq!(index.position_at(6), Position::new(1, 2));
        assert_eq!(index.position_at(9), Position::new(3, 0));
        assert_eq!(index.offset_at(Position::new(3, 2)), Some(11));
        assert_eq!(index.offset_at(Position::new(0, 9)), None);
        assert_eq!(index.offset_at(Position::new(7, 0)), None);
    }

    #[test]
    fn test_offsets_past_end_clamp() {
        let index = LineIndex::new("ab");
        assert_eq!(index.position_at(99), Position::new(0, 2));
        assert_eq!(index.line_count(), 1);
    }
}
