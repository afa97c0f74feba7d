use serde::{Deserialize, Serialize};

/// Position in a text file (line and column numbers)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed, in bytes)
    pub column: usize,
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Half-open byte span `[start, end)` addressed by a mutation
///
/// On the wire a span is a two-element array: `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(usize, usize)", into = "(usize, usize)")]
pub struct Span {
    /// Starting byte offset (inclusive)
    pub start: usize,
    /// Ending byte offset (exclusive)
    pub end: usize,
}

impl Span {
    /// Span covering `[start, end)`; not validated against any content
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Zero-width span at `offset`
    pub fn at(offset: usize) -> Self {
        Self { start: offset, end: offset }
    }

    /// Byte length of the span (zero for inverted spans)
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<(usize, usize)> for Span {
    fn from((start, end): (usize, usize)) -> Self {
        Self { start, end }
    }
}

impl From<Span> for (usize, usize) {
    fn from(span: Span) -> Self {
        (span.start, span.end)
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Convert a byte offset to line and column position
///
/// # Arguments
/// * `content` - The file content as a string
/// * `byte_offset` - The byte offset to convert
///
/// # Returns
/// * `Position` with line and column (both 1-indexed)
/// * Offsets past the end resolve to the last line, with the column counting
///   on from the last line start
pub fn byte_to_position(content: &str, byte_offset: usize) -> Position {
    let mut line = 1;
    let mut line_start = 0;

    for (index, byte) in content.bytes().enumerate() {
        if index >= byte_offset {
            break;
        }
        if byte == b'\n' {
            line += 1;
            line_start = index + 1;
        }
    }

    Position {
        line,
        column: byte_offset - line_start + 1,
    }
}

/// Convert a byte span to start and end positions
///
/// # Arguments
/// * `content` - The file content as a string
/// * `span` - The byte span to convert
///
/// # Returns
/// * `(Position, Position)` - Start and end positions
pub fn span_to_positions(content: &str, span: Span) -> (Position, Position) {
    let start = byte_to_position(content, span.start);
    let end = byte_to_position(content, span.end);
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_to_position_start() {
        let pos = byte_to_position("Hello\nWorld", 0);

        assert_eq!(pos, Position { line: 1, column: 1 });
    }

    #[test]
    fn test_byte_to_position_after_newline() {
        // H=0, e=1, l=2, l=3, o=4, \n=5, W=6
        let pos = byte_to_position("Hello\nWorld", 6);

        assert_eq!(pos, Position { line: 2, column: 1 });
    }

    #[test]
    fn test_byte_to_position_on_newline() {
        let pos = byte_to_position("Hello\nWorld", 5);

        assert_eq!(pos, Position { line: 1, column: 6 });
    }

    #[test]
    fn test_byte_to_position_past_end() {
        let pos = byte_to_position("ab\ncd", 5);

        assert_eq!(pos, Position { line: 2, column: 3 });
    }

    #[test]
    fn test_span_to_positions() {
        let (start, end) = span_to_positions("Hello\nWorld", Span::new(0, 5));

        assert_eq!(start, Position { line: 1, column: 1 });
        // Exclusive end sits just after 'o'
        assert_eq!(end, Position { line: 1, column: 6 });
    }

    #[test]
    fn test_span_wire_format() {
        let span: Span = serde_json::from_str("[3, 8]").unwrap();
        assert_eq!(span, Span::new(3, 8));
        assert_eq!(serde_json::to_string(&span).unwrap(), "[3,8]");
    }

    #[test]
    fn test_span_len() {
        assert_eq!(Span::new(2, 6).len(), 4);
        assert!(Span::at(4).is_empty());
        assert_eq!(Span::new(6, 2).len(), 0);
        assert_eq!(Span::new(1, 9).to_string(), "1..9");
    }
}
