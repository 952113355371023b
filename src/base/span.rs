//! Source text positions and ranges.

use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

pub use text_size::TextRange;
pub use text_size::TextSize;

/// A line and column position in a template.
///
/// Both line and column are 0-indexed. Columns count UTF-16 code units,
/// the default position encoding of the language server protocol.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LineCol {
    /// 0-indexed line number
    pub line: u32,
    /// 0-indexed column in UTF-16 code units
    pub col: u32,
}

impl LineCol {
    #[inline]
    pub const fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }

    /// Get 1-indexed line number (for display).
    #[inline]
    pub const fn line_one_indexed(self) -> u32 {
        self.line + 1
    }

    /// Get 1-indexed column number (for display).
    #[inline]
    pub const fn col_one_indexed(self) -> u32 {
        self.col + 1
    }
}

impl fmt::Debug for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line_one_indexed(), self.col_one_indexed())
    }
}

impl fmt::Display for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line_one_indexed(), self.col_one_indexed())
    }
}

/// A start/end pair of [`LineCol`] positions, the shape editors exchange.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, Debug, Serialize, Deserialize)]
pub struct LineColRange {
    pub start: LineCol,
    pub end: LineCol,
}

impl LineColRange {
    #[inline]
    pub const fn new(start: LineCol, end: LineCol) -> Self {
        Self { start, end }
    }

    /// An empty range at `pos`.
    #[inline]
    pub const fn empty(pos: LineCol) -> Self {
        Self { start: pos, end: pos }
    }
}

/// Index for converting between byte offsets and line/column positions.
#[derive(Clone, Debug)]
pub struct LineIndex {
    /// Byte offset of the start of each line
    line_starts: Vec<TextSize>,
    /// Non-ASCII characters per line, in order
    wide_chars: FxHashMap<u32, Vec<WideChar>>,
    len: TextSize,
}

/// A character whose UTF-8 and UTF-16 lengths differ.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct WideChar {
    /// Byte column of the character in its line
    start: u32,
    utf8_len: u32,
    utf16_len: u32,
}

impl WideChar {
    fn end(self) -> u32 {
        self.start + self.utf8_len
    }

    /// Bytes saved when counting the character in UTF-16.
    fn shrink(self) -> u32 {
        self.utf8_len - self.utf16_len
    }
}

impl LineIndex {
    /// Build a line index from source text.
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::from(0)];
        let mut wide_chars: FxHashMap<u32, Vec<WideChar>> = FxHashMap::default();
        let mut line_start = 0;
        for (offset, c) in text.char_indices() {
            if c == '\n' {
                line_start = offset + 1;
                line_starts.push(TextSize::from(line_start as u32));
                continue;
            }
            if !c.is_ascii() {
                let line = (line_starts.len() - 1) as u32;
                wide_chars.entry(line).or_default().push(WideChar {
                    start: (offset - line_start) as u32,
                    utf8_len: c.len_utf8() as u32,
                    utf16_len: c.len_utf16() as u32,
                });
            }
        }
        Self {
            line_starts,
            wide_chars,
            len: TextSize::of(text),
        }
    }

    /// Convert a byte offset to a line/column position.
    pub fn line_col(&self, offset: TextSize) -> LineCol {
        let offset = offset.min(self.len);
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let col = u32::from(offset - self.line_starts[line]);
        let line = line as u32;
        LineCol {
            line,
            col: self.utf8_to_utf16_col(line, col),
        }
    }

    /// Convert a line/column position to a byte offset.
    ///
    /// Returns `None` when the position lies outside the text: past the last
    /// line, or past the end of its line.
    pub fn offset(&self, line_col: LineCol) -> Option<TextSize> {
        let line = line_col.line as usize;
        let line_start = *self.line_starts.get(line)?;
        let line_end = match self.line_starts.get(line + 1) {
            Some(next) => *next - TextSize::from(1),
            None => self.len,
        };
        let col = self.utf16_to_utf8_col(line_col.line, line_col.col);
        let offset = line_start + TextSize::from(col);
        (offset <= line_end).then_some(offset)
    }

    fn utf8_to_utf16_col(&self, line: u32, col: u32) -> u32 {
        let Some(chars) = self.wide_chars.get(&line) else {
            return col;
        };
        chars
            .iter()
            .take_while(|c| c.end() <= col)
            .fold(col, |col, c| col - c.shrink())
    }

    fn utf16_to_utf8_col(&self, line: u32, mut col: u32) -> u32 {
        if let Some(chars) = self.wide_chars.get(&line) {
            for c in chars {
                if col <= c.start {
                    break;
                }
                col += c.shrink();
            }
        }
        col
    }

    pub fn range(&self, range: TextRange) -> LineColRange {
        LineColRange::new(self.line_col(range.start()), self.line_col(range.end()))
    }

    /// Get the number of lines.
    pub fn len(&self) -> usize {
        self.line_starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len == TextSize::from(0)
    }

    /// Length of the indexed text in bytes.
    pub fn text_len(&self) -> TextSize {
        self.len
    }
}
