//! Byte ranges into template and script sources.

use std::ops::Range;

use text_size::TextSize;

/// A byte offset into a source string.
pub type ByteOffset = TextSize;

/// The half-open byte range `start..end` a node was parsed from.
///
/// Sub-parsers work on a slice of the template (an attribute value, an
/// interpolation) and [`Span::shift`] moves their spans back into template
/// coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: ByteOffset,
    pub end: ByteOffset,
}

impl Span {
    pub fn new(start: impl Into<ByteOffset>, end: impl Into<ByteOffset>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Builds a span from a lexer or `str::find` range.
    pub fn from_range(range: Range<usize>) -> Self {
        Self::new(range.start as u32, range.end as u32)
    }

    /// The smallest span enclosing both.
    pub fn cover(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Moves the span `delta` bytes to the right.
    pub fn shift(self, delta: u32) -> Span {
        let delta = TextSize::from(delta);
        Span {
            start: self.start + delta,
            end: self.end + delta,
        }
    }

    #[inline]
    pub fn lo(&self) -> usize {
        u32::from(self.start) as usize
    }

    #[inline]
    pub fn hi(&self) -> usize {
        u32::from(self.end) as usize
    }

    /// The covered text, or `""` when the span does not fit `source`.
    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.lo()..self.hi()).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_attribute_value_span_moves_into_template() {
        let template = r#"<li *ngFor="let hero of heroes">"#;
        let value_start = template.find("let").unwrap();
        // `heroes` as found by the binding parser, relative to the value
        let inner = Span::from_range(12..18);
        let span = inner.shift(value_start as u32);
        assert_eq!(span.slice(template), "heroes");
        assert_eq!((span.lo(), span.hi()), (24, 30));
    }

    #[test]
    fn test_cover_joins_start_and_end_tags() {
        let start_tag = Span::new(0u32, 5u32);
        let end_tag = Span::new(10u32, 16u32);
        let element = start_tag.cover(end_tag);
        assert_eq!(element, Span::new(0u32, 16u32));
        assert_eq!(element.slice("<div>hello</div>"), "<div>hello</div>");
        assert_eq!(end_tag.cover(start_tag), element);
    }

    #[test]
    fn test_slice_out_of_bounds() {
        assert_eq!(Span::from_range(30..40).slice("<p></p>"), "");
        // splits a multi-byte character
        assert_eq!(Span::from_range(0..1).slice("é"), "");
    }
}
