//! Tag lexer using logos.
//!
//! Only the inside of start and end tags is tokenized with logos: the tag
//! name, attribute names, `=`, quoted or bare values and the closing `>` or
//! `/>`. Text, interpolations, comments and raw text are scanned directly by
//! the tree builder because their boundaries depend on context.

use logos::Logos;
use source_text::Span;

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The span of the token in the template.
    pub span: Span,
}

/// Token kinds inside a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Logos, Default)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum TokenKind {
    /// `>`
    #[token(">")]
    RAngle,

    /// `/>`
    #[token("/>")]
    SlashRAngle,

    /// `/` not followed by `>`
    #[token("/")]
    Slash,

    /// `=`
    #[token("=")]
    Eq,

    /// `<` inside a tag, which means the tag was never terminated.
    #[token("<")]
    LAngle,

    /// A double-quoted attribute value, quotes included.
    #[regex(r#""[^"]*""#)]
    DoubleQuoted,

    /// A single-quoted attribute value, quotes included.
    #[regex(r"'[^']*'")]
    SingleQuoted,

    /// A tag name, attribute name or unquoted attribute value.
    ///
    /// Angular binding syntax (`[x]`, `(x)`, `*x`, `#x`, `@x`) is part of the name.
    #[regex(r#"[^ \t\r\n\f"'<>/=]+"#)]
    Name,

    /// End of the tag source.
    Eof,

    /// Invalid/unknown token, such as an unterminated quote.
    #[default]
    Error,
}

impl TokenKind {
    /// Returns a human-readable name for this token kind.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::RAngle => "'>'",
            TokenKind::SlashRAngle => "'/>'",
            TokenKind::Slash => "'/'",
            TokenKind::Eq => "'='",
            TokenKind::LAngle => "'<'",
            TokenKind::DoubleQuoted | TokenKind::SingleQuoted => "quoted value",
            TokenKind::Name => "name",
            TokenKind::Eof => "end of file",
            TokenKind::Error => "invalid token",
        }
    }

    /// True for the two quoted value tokens.
    pub fn is_quoted(&self) -> bool {
        matches!(self, TokenKind::DoubleQuoted | TokenKind::SingleQuoted)
    }
}

/// A lexer over the inside of one tag.
///
/// Spans are reported relative to the whole template, not to the slice being
/// lexed.
pub struct Lexer<'src> {
    inner: logos::Lexer<'src, TokenKind>,
    base: u32,
    finished: bool,
}

impl<'src> Lexer<'src> {
    /// Creates a lexer for `source[offset..]`.
    pub fn new(source: &'src str, offset: usize) -> Self {
        Self {
            inner: TokenKind::lexer(&source[offset..]),
            base: offset as u32,
            finished: false,
        }
    }

    /// Returns the text of the last token.
    pub fn slice(&self) -> &'src str {
        self.inner.slice()
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let (kind, range) = match self.inner.next() {
            Some(Ok(kind)) => (kind, self.inner.span()),
            Some(Err(())) => (TokenKind::Error, self.inner.span()),
            None => {
                self.finished = true;
                let end = self.inner.source().len();
                (TokenKind::Eof, end..end)
            }
        };
        Some(Token {
            kind,
            span: Span::from_range(range).shift(self.base),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(source: &str) -> Vec<TokenKind> {
        Lexer::new(source, 0)
            .map(|t| t.kind)
            .filter(|k| *k != TokenKind::Eof)
            .collect()
    }

    #[test]
    fn test_simple_tag() {
        assert_eq!(tokenize("div>"), vec![TokenKind::Name, TokenKind::RAngle]);
    }

    #[test]
    fn test_self_closing_tag() {
        assert_eq!(
            tokenize("br/>"),
            vec![TokenKind::Name, TokenKind::SlashRAngle]
        );
    }

    #[test]
    fn test_binding_names() {
        assert_eq!(
            tokenize(r#"div [class.foo]="bar" (click)='go($event)' *ngIf="x" #ref>"#),
            vec![
                TokenKind::Name,
                TokenKind::Name,
                TokenKind::Eq,
                TokenKind::DoubleQuoted,
                TokenKind::Name,
                TokenKind::Eq,
                TokenKind::SingleQuoted,
                TokenKind::Name,
                TokenKind::Eq,
                TokenKind::DoubleQuoted,
                TokenKind::Name,
                TokenKind::RAngle,
            ]
        );
    }

    #[test]
    fn test_quoted_value_may_contain_markup() {
        let mut lexer = Lexer::new(r#"a title="<b>{{x}}</b>">"#, 0);
        lexer.next();
        lexer.next();
        lexer.next();
        let value = lexer.next().unwrap();
        assert_eq!(value.kind, TokenKind::DoubleQuoted);
        assert_eq!(lexer.slice(), r#""<b>{{x}}</b>""#);
    }

    #[test]
    fn test_unterminated_quote() {
        let tokens = tokenize(r#"a b="c"#);
        assert_eq!(&tokens[..3], &[TokenKind::Name, TokenKind::Name, TokenKind::Eq]);
        assert!(tokens.contains(&TokenKind::Error));
    }

    #[test]
    fn test_spans_are_offset() {
        let source = "<span id=x>";
        let tokens: Vec<Token> = Lexer::new(source, 1).collect();
        assert_eq!(tokens[0].span, Span::new(1u32, 5u32));
        assert_eq!(tokens[0].span.slice(source), "span");
        assert_eq!(tokens[3].span.slice(source), "x");
    }
}
