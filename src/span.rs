//! Source location tracking
//!
//! Byte-offset spans with line/column information for error reporting and
//! ESTree `loc`/`range` output.

use serde::{Deserialize, Serialize};

/// A region of the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    /// Byte offset start (0-indexed)
    pub start: usize,
    /// Byte offset end (exclusive)
    pub end: usize,
    /// Line number (1-indexed)
    pub start_line: usize,
    /// Line number (1-indexed)
    pub end_line: usize,
    /// Column (0-indexed, in bytes, as ESTree counts them)
    pub start_column: usize,
    /// Column (0-indexed, in bytes)
    pub end_column: usize,
}

impl Span {
    pub fn new(
        start: usize,
        end: usize,
        start_line: usize,
        end_line: usize,
        start_column: usize,
        end_column: usize,
    ) -> Self {
        Self {
            start,
            end,
            start_line,
            end_line,
            start_column,
            end_column,
        }
    }

    /// Create a span from byte offsets only (line/column zeroed)
    pub fn from_offsets(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            ..Self::default()
        }
    }

    /// The smallest span covering both `self` and `other`
    pub fn to(&self, other: &Span) -> Span {
        let (start, start_line, start_column) = if self.start <= other.start {
            (self.start, self.start_line, self.start_column)
        } else {
            (other.start, other.start_line, other.start_column)
        };
        let (end, end_line, end_column) = if self.end >= other.end {
            (self.end, self.end_line, self.end_column)
        } else {
            (other.end, other.end_line, other.end_column)
        };
        Span {
            start,
            end,
            start_line,
            end_line,
            start_column,
            end_column,
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }
}

/// Is `c` an ECMAScript LineTerminator?
///
/// Covers LF, CR, LS (U+2028) and PS (U+2029). CRLF is a single terminator;
/// callers that iterate characters handle the pairing themselves.
pub fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// Does the source slice between two offsets contain a line terminator?
pub fn contains_line_break(slice: &str) -> bool {
    slice.chars().any(is_line_terminator)
}

/// Maps byte offsets to line/column positions
#[derive(Debug, Clone)]
pub struct SourceMap {
    /// Byte offsets at which each line starts
    line_starts: Vec<usize>,
}

impl SourceMap {
    /// Build the line table for `source`, honoring all four ECMAScript
    /// line terminators
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        let mut chars = source.char_indices().peekable();
        while let Some((i, c)) = chars.next() {
            match c {
                '\r' => {
                    // CRLF counts as one terminator
                    if let Some(&(j, '\n')) = chars.peek() {
                        chars.next();
                        line_starts.push(j + 1);
                    } else {
                        line_starts.push(i + 1);
                    }
                }
                '\n' => line_starts.push(i + 1),
                '\u{2028}' | '\u{2029}' => line_starts.push(i + c.len_utf8()),
                _ => {}
            }
        }
        Self { line_starts }
    }

    /// Line (1-indexed) and column (0-indexed) for a byte offset
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line.saturating_sub(1),
        };
        let line_start = self.line_starts.get(line).copied().unwrap_or(0);
        (line + 1, offset - line_start)
    }

    /// Build a span with line/column information filled in
    pub fn span(&self, start: usize, end: usize) -> Span {
        let (start_line, start_column) = self.line_col(start);
        let (end_line, end_column) = self.line_col(end);
        Span {
            start,
            end,
            start_line,
            end_line,
            start_column,
            end_column,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col() {
        let map = SourceMap::new("let a;\nlet b;\n");
        assert_eq!(map.line_col(0), (1, 0));
        assert_eq!(map.line_col(4), (1, 4));
        assert_eq!(map.line_col(7), (2, 0));
        assert_eq!(map.line_col(11), (2, 4));
    }

    #[test]
    fn test_crlf_is_one_terminator() {
        let map = SourceMap::new("a\r\nb\rc");
        assert_eq!(map.line_col(3), (2, 0)); // 'b'
        assert_eq!(map.line_col(5), (3, 0)); // 'c'
    }

    #[test]
    fn test_unicode_separators() {
        let src = "a\u{2028}b";
        let map = SourceMap::new(src);
        assert_eq!(map.line_col(src.len() - 1), (2, 0));
    }

    #[test]
    fn test_span_to() {
        let map = SourceMap::new("aa bb\ncc");
        let a = map.span(0, 2);
        let c = map.span(6, 8);
        let joined = a.to(&c);
        assert_eq!(joined.start, 0);
        assert_eq!(joined.end, 8);
        assert_eq!(joined.start_line, 1);
        assert_eq!(joined.end_line, 2);
    }
}
