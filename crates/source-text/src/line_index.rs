//! Offset to line/column lookup for error reporting.

use crate::ByteOffset;

/// A 0-indexed line and byte column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LineCol {
    pub line: u32,
    pub col: u32,
}

impl LineCol {
    pub fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }

    /// `(line, column)` counted from 1, as printed in messages.
    pub fn one_based(self) -> (u32, u32) {
        (self.line + 1, self.col + 1)
    }
}

/// Start offsets of every line in a source.
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(at, _)| at + 1))
            .collect();
        Self { starts }
    }

    /// Index of the line containing `offset`, with its start.
    fn line_of(&self, offset: usize) -> (usize, usize) {
        let line = self.starts.partition_point(|&start| start <= offset) - 1;
        (line, self.starts[line])
    }

    pub fn line_col(&self, offset: ByteOffset) -> LineCol {
        let offset = u32::from(offset) as usize;
        let (line, start) = self.line_of(offset);
        LineCol::new(line as u32, (offset - start) as u32)
    }

    /// Column of `offset` in characters.
    ///
    /// Generated markup is indented to this column, so multi-byte text before
    /// an element on the same line counts once per character.
    pub fn char_column(&self, text: &str, offset: ByteOffset) -> usize {
        let offset = u32::from(offset) as usize;
        let (_, start) = self.line_of(offset);
        text.get(start..offset)
            .map_or(offset - start, |prefix| prefix.chars().count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn at(index: &LineIndex, offset: u32) -> LineCol {
        index.line_col(offset.into())
    }

    #[test]
    fn test_template_positions() {
        let template = "<div>\n  {{ name | date }}\n</div>";
        let index = LineIndex::new(template);
        assert_eq!(at(&index, 0), LineCol::new(0, 0));
        assert_eq!(at(&index, 5), LineCol::new(0, 5));
        let pipe = template.find("date").unwrap() as u32;
        assert_eq!(at(&index, pipe), LineCol::new(1, 12));
        assert_eq!(at(&index, pipe).one_based(), (2, 13));
        let close = template.find("</div>").unwrap() as u32;
        assert_eq!(at(&index, close), LineCol::new(2, 0));
    }

    #[test]
    fn test_offset_on_newline_belongs_to_its_line() {
        let index = LineIndex::new("a\nb\n");
        assert_eq!(at(&index, 1), LineCol::new(0, 1));
        assert_eq!(at(&index, 4), LineCol::new(2, 0));
    }

    #[test]
    fn test_char_column() {
        let text = "<p>\n  é <b>x</b>";
        let index = LineIndex::new(text);
        let offset = (text.find("<b>").unwrap() as u32).into();
        assert_eq!(index.line_col(offset).col, 5);
        assert_eq!(index.char_column(text, offset), 4);
    }
}
