//! Conversion between byte offsets and line/column positions.
//!
//! Spans in the tree are byte offsets into UTF-8 text. Hosts that speak in
//! lines and UTF-16 columns convert through a [`LineIndex`].

use std::fmt;

/// A zero-based line and UTF-16 column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LineCol {
    pub line: u32,
    pub col: u32,
}

impl fmt::Display for LineCol {
    /// One-based, as editors show it.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.col + 1)
    }
}

/// Line start offsets of a text.
///
/// # Example
///
/// ```
/// use d2_parser::line_index::{LineCol, LineIndex};
///
/// let index = LineIndex::new("a -> b\n数据 -> c");
/// assert_eq!(index.line_col(7), LineCol { line: 1, col: 0 });
/// // `数据` is six bytes but two UTF-16 units.
/// assert_eq!(index.line_col(14), LineCol { line: 1, col: 3 });
/// assert_eq!(index.offset(LineCol { line: 1, col: 3 }), Some(14));
/// ```
#[derive(Debug, Clone)]
pub struct LineIndex {
    text: String,
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(index, _)| index + 1))
            .collect();
        Self {
            text: text.to_string(),
            line_starts,
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Line and UTF-16 column of byte `offset`.
    ///
    /// Offsets past the end clamp to the end. Offsets inside a multi-byte
    /// character count the units of the characters before it.
    pub fn line_col(&self, offset: usize) -> LineCol {
        let offset = offset.min(self.text.len());
        let line = self.line_starts.partition_point(|&start| start <= offset) - 1;
        let line_start = self.line_starts[line];
        let col = utf16_len_before(&self.text[line_start..], offset - line_start);
        LineCol {
            line: line as u32,
            col: col as u32,
        }
    }

    /// Offset of byte `offset` counted in UTF-16 code units from the start.
    pub fn utf16_offset(&self, offset: usize) -> usize {
        utf16_len_before(&self.text, offset.min(self.text.len()))
    }

    /// Byte offset of a line and UTF-16 column, if it lies inside the text.
    ///
    /// A column that falls in the middle of a surrogate pair resolves to the
    /// start of that character.
    pub fn offset(&self, position: LineCol) -> Option<usize> {
        let line_start = *self.line_starts.get(position.line as usize)?;
        let line_end = self
            .line_starts
            .get(position.line as usize + 1)
            .map_or(self.text.len(), |next| next - 1);
        let line = &self.text[line_start..line_end];

        let mut units = 0usize;
        for (index, c) in line.char_indices() {
            if units >= position.col as usize {
                return Some(line_start + index);
            }
            units += c.len_utf16();
            if units > position.col as usize {
                return Some(line_start + index);
            }
        }
        (units == position.col as usize).then_some(line_end)
    }
}

/// UTF-16 length of the characters of `text` that start before `byte`.
fn utf16_len_before(text: &str, byte: usize) -> usize {
    text.char_indices()
        .take_while(|(index, _)| *index < byte)
        .map(|(_, c)| c.len_utf16())
        .sum()
}
