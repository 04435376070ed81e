//! Binding expressions, interpolations and the `*directive` microsyntax.
//!
//! Expressions are not parsed into a full AST. They are tokenized with logos
//! so that pipes (`a | p:arg`) can be split at the top level, interpolations
//! can be cut out of text, and microsyntax bindings (`let x of xs; index as
//! i`) can find where each expression ends. Expression text is kept verbatim,
//! trimmed to its first and last token.

use crate::error::{ParseError, ParseErrorKind};
use logos::Logos;
use smol_str::SmolStr;
use source_text::Span;

/// A binding expression with its pipes resolved.
///
/// `a | p1 | p2:x` is `Pipe(p2, [x], Pipe(p1, [], Expression(a)))`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Expression text without pipes.
    Expression {
        /// The text, trimmed.
        source: String,
        /// Where the text is in the template.
        span: Span,
    },
    /// A pipe applied to an inner expression.
    Pipe {
        /// The pipe name.
        name: SmolStr,
        /// The piped value.
        inner: Box<Expr>,
        /// Pipe arguments as trimmed expression text.
        args: Vec<String>,
        /// From the start of the inner expression to the end of the last argument.
        span: Span,
    },
}

impl Expr {
    /// Returns the span of the whole expression.
    pub fn span(&self) -> Span {
        match self {
            Expr::Expression { span, .. } | Expr::Pipe { span, .. } => *span,
        }
    }
}

/// Text with `{{ }}` interpolations.
///
/// `strings` has one more entry than `expressions`; the text is
/// `strings[0] {{expressions[0]}} strings[1] ...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpolation {
    /// Literal fragments around the interpolations.
    pub strings: Vec<String>,
    /// The interpolated expressions.
    pub expressions: Vec<Expr>,
    /// The whole interpolated text.
    pub span: Span,
}

/// One binding of a `*directive="..."` microsyntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateBinding {
    /// `let x`, `let i = index` or `index as i`.
    Variable {
        /// The local name.
        name: SmolStr,
        /// The context property it reads; `$implicit` for a bare `let x`.
        value: SmolStr,
        /// Where the binding is.
        span: Span,
    },
    /// The directive itself or one of its prefixed inputs (`ngForOf`).
    Expression {
        /// The full input name.
        key: SmolStr,
        /// The bound expression; `None` for a bare directive like `*ngSwitchDefault`.
        value: Option<Expr>,
        /// Where the binding is.
        span: Span,
    },
}

/// Token kinds of the expression language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Logos)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum ExprTokenKind {
    /// An identifier or keyword.
    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*")]
    Ident,
    /// A number literal.
    #[regex(r"[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?")]
    #[regex(r"\.[0-9]+")]
    Number,
    /// A quoted string.
    #[regex(r#""([^"\\]|\\.)*""#)]
    #[regex(r"'([^'\\]|\\.)*'")]
    Str,
    /// A template literal.
    #[regex(r"`([^`\\]|\\.)*`")]
    Template,
    /// `(`
    #[token("(")]
    LParen,
    /// `)`
    #[token(")")]
    RParen,
    /// `[`
    #[token("[")]
    LBracket,
    /// `]`
    #[token("]")]
    RBracket,
    /// `{`
    #[token("{")]
    LBrace,
    /// `}`
    #[token("}")]
    RBrace,
    /// `,`
    #[token(",")]
    Comma,
    /// `;`
    #[token(";")]
    Semicolon,
    /// `:`
    #[token(":")]
    Colon,
    /// `|`, the pipe operator.
    #[token("|")]
    Pipe,
    /// `||`
    #[token("||")]
    Or,
    /// `??`
    #[token("??")]
    Nullish,
    /// `?.`
    #[token("?.")]
    OptionalChain,
    /// `?`
    #[token("?")]
    Question,
    /// `.`
    #[token(".")]
    Dot,
    /// Any other operator.
    #[regex(r"[-+*/%=!<>&\^~]+")]
    Operator,
}

impl ExprTokenKind {
    fn opens(self) -> bool {
        matches!(
            self,
            ExprTokenKind::LParen | ExprTokenKind::LBracket | ExprTokenKind::LBrace
        )
    }

    fn closes(self) -> bool {
        matches!(
            self,
            ExprTokenKind::RParen | ExprTokenKind::RBracket | ExprTokenKind::RBrace
        )
    }

    fn ends_operand(self) -> bool {
        matches!(
            self,
            ExprTokenKind::Ident
                | ExprTokenKind::Number
                | ExprTokenKind::Str
                | ExprTokenKind::Template
                | ExprTokenKind::RParen
                | ExprTokenKind::RBracket
                | ExprTokenKind::RBrace
        )
    }

    fn starts_operand(self) -> bool {
        matches!(
            self,
            ExprTokenKind::Ident
                | ExprTokenKind::Number
                | ExprTokenKind::Str
                | ExprTokenKind::Template
        )
    }
}

#[derive(Debug, Clone, Copy)]
struct Tok {
    kind: ExprTokenKind,
    start: usize,
    end: usize,
}

/// Tokenized expression text plus the template offset it starts at.
struct Source<'a> {
    text: &'a str,
    offset: usize,
    tokens: Vec<Tok>,
}

impl<'a> Source<'a> {
    fn lex(text: &'a str, offset: usize) -> Result<Self, ParseError> {
        let mut lexer = ExprTokenKind::lexer(text);
        let mut tokens = Vec::new();
        while let Some(result) = lexer.next() {
            let range = lexer.span();
            match result {
                Ok(kind) => tokens.push(Tok {
                    kind,
                    start: range.start,
                    end: range.end,
                }),
                Err(()) => {
                    return Err(invalid(
                        format!(
                            "Unexpected character \"{}\" in expression [{}]",
                            lexer.slice(),
                            text
                        ),
                        Span::from_range(range).shift(offset as u32),
                    ))
                }
            }
        }
        Ok(Self {
            text,
            offset,
            tokens,
        })
    }

    fn span(&self, start: usize, end: usize) -> Span {
        Span::from_range(start..end).shift(self.offset as u32)
    }

    fn slice(&self, tokens: &[Tok]) -> (&'a str, Span) {
        match (tokens.first(), tokens.last()) {
            (Some(first), Some(last)) => (
                &self.text[first.start..last.end],
                self.span(first.start, last.end),
            ),
            _ => ("", self.span(0, 0)),
        }
    }

    fn text_of(&self, tok: Tok) -> &'a str {
        &self.text[tok.start..tok.end]
    }

    fn whole_span(&self) -> Span {
        self.span(0, self.text.len())
    }

    /// Builds an expression from a token range, resolving top-level pipes.
    fn build(&self, tokens: &[Tok]) -> Result<Expr, ParseError> {
        let segments = split_top_level(tokens, |t| t.kind == ExprTokenKind::Pipe);
        let (head, pipes) = segments.split_first().ok_or_else(|| self.empty())?;
        if head.is_empty() {
            return Err(self.unexpected_pipe());
        }
        let (source, span) = self.slice(head);
        let mut expr = Expr::Expression {
            source: source.to_string(),
            span,
        };

        for segment in pipes {
            let (name_tok, rest) = segment.split_first().ok_or_else(|| self.unexpected_pipe())?;
            if name_tok.kind != ExprTokenKind::Ident {
                return Err(invalid(
                    format!(
                        "Unexpected token '{}', expected identifier or keyword in expression [{}]",
                        self.text_of(*name_tok),
                        self.text
                    ),
                    self.span(name_tok.start, name_tok.end),
                ));
            }
            let args = self.pipe_args(rest)?;
            let end = segment.last().map_or(name_tok.end, |t| t.end);
            let span = expr.span().cover(self.span(name_tok.start, end));
            expr = Expr::Pipe {
                name: self.text_of(*name_tok).into(),
                inner: Box::new(expr),
                args,
                span,
            };
        }
        Ok(expr)
    }

    /// Splits `:a:b ? c : d` after a pipe name into its arguments.
    fn pipe_args(&self, tokens: &[Tok]) -> Result<Vec<String>, ParseError> {
        let Some((colon, rest)) = tokens.split_first() else {
            return Ok(Vec::new());
        };
        if colon.kind != ExprTokenKind::Colon {
            return Err(invalid(
                format!(
                    "Unexpected token '{}' after pipe name in expression [{}]",
                    self.text_of(*colon),
                    self.text
                ),
                self.span(colon.start, colon.end),
            ));
        }

        let mut pending_ternaries = 0usize;
        let args = split_top_level(rest, |t| match t.kind {
            ExprTokenKind::Question => {
                pending_ternaries += 1;
                false
            }
            ExprTokenKind::Colon if pending_ternaries > 0 => {
                pending_ternaries -= 1;
                false
            }
            ExprTokenKind::Colon => true,
            _ => false,
        });
        args.into_iter()
            .map(|arg| {
                if arg.is_empty() {
                    Err(invalid(
                        format!("Missing pipe argument in expression [{}]", self.text),
                        self.whole_span(),
                    ))
                } else {
                    Ok(self.slice(arg).0.to_string())
                }
            })
            .collect()
    }

    fn empty(&self) -> ParseError {
        invalid(
            format!("Empty expression [{}]", self.text),
            self.whole_span(),
        )
    }

    fn unexpected_pipe(&self) -> ParseError {
        invalid(
            format!("Unexpected token '|' in expression [{}]", self.text),
            self.whole_span(),
        )
    }
}

fn invalid(message: String, span: Span) -> ParseError {
    ParseError::new(ParseErrorKind::InvalidExpression { message }, span)
}

/// Splits a token list at separators that are not nested in brackets.
fn split_top_level(tokens: &[Tok], mut is_separator: impl FnMut(&Tok) -> bool) -> Vec<&[Tok]> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, tok) in tokens.iter().enumerate() {
        if tok.kind.opens() {
            depth += 1;
        } else if tok.kind.closes() {
            depth = depth.saturating_sub(1);
        } else if depth == 0 && is_separator(tok) {
            parts.push(&tokens[start..i]);
            start = i + 1;
        }
    }
    parts.push(&tokens[start..]);
    parts
}

/// Parses a property binding value such as `user.name | uppercase`.
///
/// `offset` is the position of `text` in the template.
pub fn parse_binding(text: &str, offset: usize) -> Result<Expr, ParseError> {
    let source = Source::lex(text, offset)?;
    if source.tokens.is_empty() {
        return Err(source.empty());
    }
    source.build(&source.tokens)
}

/// Returns the offset just past the `}}` closing an interpolation whose body
/// starts at `from`. Quoted strings inside the interpolation may contain `}}`.
pub(crate) fn find_interpolation_end(source: &str, from: usize) -> Option<usize> {
    let bytes = source.as_bytes();
    let mut quote: Option<u8> = None;
    let mut i = from;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) => {
                if b == b'\\' {
                    i += 1;
                } else if b == q {
                    quote = None;
                }
            }
            None => {
                if b == b'\'' || b == b'"' || b == b'`' {
                    quote = Some(b);
                } else if b == b'}' && bytes.get(i + 1) == Some(&b'}') {
                    return Some(i + 2);
                }
            }
        }
        i += 1;
    }
    None
}

/// Splits text into literal fragments and `{{ }}` expressions.
///
/// Returns `Ok(None)` when the text contains no interpolation.
pub fn parse_interpolation(text: &str, offset: usize) -> Result<Option<Interpolation>, ParseError> {
    let mut strings = Vec::new();
    let mut expressions = Vec::new();
    let mut literal_start = 0;
    let mut search = 0;

    while let Some(rel) = text[search..].find("{{") {
        let open = search + rel;
        let body_start = open + 2;
        let Some(end) = find_interpolation_end(text, body_start) else {
            return Err(ParseError::new(
                ParseErrorKind::UnterminatedInterpolation,
                Span::from_range(open..text.len()).shift(offset as u32),
            ));
        };
        let body = &text[body_start..end - 2];
        if body.trim().is_empty() {
            return Err(invalid(
                format!(
                    "Blank expressions are not allowed in interpolated strings [{}]",
                    text
                ),
                Span::from_range(open..end).shift(offset as u32),
            ));
        }
        strings.push(text[literal_start..open].to_string());
        expressions.push(parse_binding(body, offset + body_start)?);
        literal_start = end;
        search = end;
    }

    if expressions.is_empty() {
        return Ok(None);
    }
    strings.push(text[literal_start..].to_string());
    Ok(Some(Interpolation {
        strings,
        expressions,
        span: Span::from_range(0..text.len()).shift(offset as u32),
    }))
}

/// Parses the value of a `*directive="..."` attribute.
///
/// The first binding is always the directive itself (`key`), with the leading
/// expression as its value if there is one. Later keys are prefixed with the
/// directive name: `of` under `ngFor` becomes `ngForOf`.
pub fn parse_template_bindings(
    key: &str,
    key_span: Span,
    value: &str,
    value_offset: usize,
) -> Result<Vec<TemplateBinding>, ParseError> {
    let source = Source::lex(value, value_offset)?;
    let mut parser = MicrosyntaxParser {
        source: &source,
        pos: 0,
    };
    let mut bindings = Vec::new();
    parser.directive_bindings(key.into(), key_span, &mut bindings)?;

    while !parser.at_end() {
        if parser.peek_keyword("let") {
            bindings.push(parser.let_binding()?);
        } else {
            let (raw_key, raw_span) = parser.binding_key()?;
            if let Some(alias) = parser.as_binding(raw_key.clone(), raw_span)? {
                bindings.push(alias);
            } else {
                let prefixed = format!("{key}{}", capitalize(&raw_key));
                parser.directive_bindings(prefixed.into(), raw_span, &mut bindings)?;
            }
        }
        parser.statement_terminator();
    }
    Ok(bindings)
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

struct MicrosyntaxParser<'s, 'a> {
    source: &'s Source<'a>,
    pos: usize,
}

impl<'s, 'a> MicrosyntaxParser<'s, 'a> {
    fn at_end(&self) -> bool {
        self.pos >= self.source.tokens.len()
    }

    fn peek(&self) -> Option<Tok> {
        self.source.tokens.get(self.pos).copied()
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        self.peek().is_some_and(|t| {
            t.kind == ExprTokenKind::Ident && self.source.text_of(t) == keyword
        })
    }

    fn eat(&mut self, kind: ExprTokenKind) -> bool {
        if self.peek().is_some_and(|t| t.kind == kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn statement_terminator(&mut self) {
        if !self.eat(ExprTokenKind::Semicolon) {
            self.eat(ExprTokenKind::Comma);
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        match self.peek() {
            Some(tok) => invalid(
                format!(
                    "Unexpected token '{}', expected {} in [{}]",
                    self.source.text_of(tok),
                    expected,
                    self.source.text
                ),
                self.source.span(tok.start, tok.end),
            ),
            None => invalid(
                format!(
                    "Unexpected end of input, expected {} in [{}]",
                    expected, self.source.text
                ),
                self.source.whole_span(),
            ),
        }
    }

    /// Reads a key such as `of`, `trackBy` or `data-item`.
    fn binding_key(&mut self) -> Result<(String, Span), ParseError> {
        let first = match self.peek() {
            Some(tok) if matches!(tok.kind, ExprTokenKind::Ident | ExprTokenKind::Str) => tok,
            _ => return Err(self.unexpected("identifier, keyword, or string")),
        };
        self.pos += 1;
        let mut key = self.source.text_of(first).to_string();
        if first.kind == ExprTokenKind::Str {
            key = key[1..key.len() - 1].to_string();
        }
        let mut end = first.end;
        while let (Some(dash), Some(next)) = (
            self.peek(),
            self.source.tokens.get(self.pos + 1).copied(),
        ) {
            let joins = dash.kind == ExprTokenKind::Operator
                && self.source.text_of(dash) == "-"
                && next.kind == ExprTokenKind::Ident
                && dash.start == end
                && next.start == dash.end;
            if !joins {
                break;
            }
            key.push('-');
            key.push_str(self.source.text_of(next));
            end = next.end;
            self.pos += 2;
        }
        Ok((key, self.source.span(first.start, end)))
    }

    /// `let x` or `let x = property`.
    fn let_binding(&mut self) -> Result<TemplateBinding, ParseError> {
        let start = self.peek().map_or(0, |t| t.start);
        self.pos += 1;
        let (name, name_span) = self.binding_key()?;
        let mut value = SmolStr::new("$implicit");
        let mut end = name_span;
        if self
            .peek()
            .is_some_and(|t| t.kind == ExprTokenKind::Operator && self.source.text_of(t) == "=")
        {
            self.pos += 1;
            let (property, property_span) = self.binding_key()?;
            value = property.into();
            end = property_span;
        }
        Ok(TemplateBinding::Variable {
            name: name.into(),
            value,
            span: self.source.span(start, start).cover(end),
        })
    }

    /// `key as alias`, producing a variable that reads `key`.
    fn as_binding(
        &mut self,
        value: String,
        value_span: Span,
    ) -> Result<Option<TemplateBinding>, ParseError> {
        if !self.peek_keyword("as") {
            return Ok(None);
        }
        self.pos += 1;
        let (alias, alias_span) = self.binding_key()?;
        Ok(Some(TemplateBinding::Variable {
            name: alias.into(),
            value: value.into(),
            span: value_span.cover(alias_span),
        }))
    }

    /// The binding of `key` itself: `[:] expression [as alias]`.
    fn directive_bindings(
        &mut self,
        key: SmolStr,
        key_span: Span,
        bindings: &mut Vec<TemplateBinding>,
    ) -> Result<(), ParseError> {
        self.eat(ExprTokenKind::Colon);
        let value = self.bound_target()?;
        let span = value
            .as_ref()
            .map_or(key_span, |expr| key_span.cover(expr.span()));
        let alias = self.as_binding(key.to_string(), key_span)?;
        bindings.push(TemplateBinding::Expression { key, value, span });
        bindings.extend(alias);
        self.statement_terminator();
        Ok(())
    }

    /// Reads an expression up to the next statement boundary.
    fn bound_target(&mut self) -> Result<Option<Expr>, ParseError> {
        if self.at_end() || self.peek_keyword("let") || self.peek_keyword("as") {
            return Ok(None);
        }
        let start = self.pos;
        let mut depth = 0usize;
        let mut prev: Option<Tok> = None;
        while let Some(tok) = self.peek() {
            if depth == 0 {
                let boundary = matches!(tok.kind, ExprTokenKind::Semicolon | ExprTokenKind::Comma)
                    || (tok.kind == ExprTokenKind::Ident
                        && matches!(self.source.text_of(tok), "as" | "let"))
                    || (tok.kind.starts_operand()
                        && prev.is_some_and(|p| p.kind.ends_operand()));
                if boundary {
                    break;
                }
            }
            if tok.kind.opens() {
                depth += 1;
            } else if tok.kind.closes() {
                depth = depth.saturating_sub(1);
            }
            prev = Some(tok);
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.unexpected("expression"));
        }
        self.source
            .build(&self.source.tokens[start..self.pos])
            .map(Some)
    }
}
