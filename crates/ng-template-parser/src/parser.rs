//! Tree builder for Angular templates.
//!
//! Builds the raw HTML tree with the same structural rules as Angular's
//! parser: implied end tags, void elements, namespace inheritance for SVG and
//! MathML, and raw text content for `<script>`, `<style>`, `<textarea>` and
//! `<title>`. Unclosed elements at the end of the template are closed
//! implicitly without an error.

use crate::dom::{Attribute, Comment, Element, Expansion, Node, Text};
use crate::error::{ParseError, ParseErrorKind};
use crate::expression::find_interpolation_end;
use crate::lexer::{Lexer, Token, TokenKind};
use crate::tags::{merge_ns_name, ns_prefix, split_ns_name, tag_definition, ContentType};
use source_text::Span;
use std::iter::Peekable;

/// The raw tree of a template plus every error found while building it.
#[derive(Debug, Clone, Default)]
pub struct ParseTree {
    /// Top-level nodes.
    pub nodes: Vec<Node>,
    /// Structural errors, in source order.
    pub errors: Vec<ParseError>,
}

/// The tree builder.
pub struct Parser<'src> {
    /// The template being parsed.
    source: &'src str,
    /// Current byte position.
    pos: usize,
    /// Elements whose end tag has not been seen yet.
    stack: Vec<Element>,
    /// Completed top-level nodes.
    roots: Vec<Node>,
    /// Errors collected so far.
    errors: Vec<ParseError>,
}

impl<'src> Parser<'src> {
    /// Creates a new tree builder.
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            pos: 0,
            stack: Vec::new(),
            roots: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Parses the whole template.
    pub fn parse(mut self) -> ParseTree {
        while self.pos < self.source.len() {
            let rest = &self.source[self.pos..];
            if rest.starts_with("<!--") {
                self.consume_comment();
            } else if rest.starts_with("</") && starts_tag_name(&rest[2..]) {
                self.consume_end_tag();
            } else if rest.starts_with('<') && starts_tag_name(&rest[1..]) {
                self.consume_start_tag();
            } else if rest.starts_with("<!") {
                self.consume_declaration();
            } else if rest.starts_with('{') && !rest.starts_with("{{") {
                self.consume_expansion();
            } else {
                self.consume_text();
            }
        }

        while let Some(element) = self.stack.pop() {
            self.add_to_parent(Node::Element(element));
        }

        ParseTree {
            nodes: self.roots,
            errors: self.errors,
        }
    }

    // === Tree helpers ===

    fn error(&mut self, kind: ParseErrorKind, span: Span) {
        self.errors.push(ParseError::new(kind, span));
    }

    fn add_to_parent(&mut self, node: Node) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.roots.push(node),
        }
    }

    fn add_text(&mut self, start: usize, end: usize) {
        let mut start = start;
        if let Some(parent) = self.stack.last() {
            let (_, local) = split_ns_name(&parent.name);
            if parent.children.is_empty()
                && tag_definition(local).ignores_first_lf()
                && self.source[start..end].starts_with('\n')
            {
                start += 1;
            }
        }
        if start < end {
            self.add_to_parent(Node::Text(Text {
                value: self.source[start..end].to_string(),
                span: Span::from_range(start..end),
            }));
        }
    }

    /// Computes the stored name of an element, applying implicit and
    /// inherited namespaces.
    fn element_full_name(&self, prefix: Option<&str>, local: &str) -> String {
        let mut prefix = prefix;
        if prefix.is_none() {
            prefix = tag_definition(local).implicit_namespace_prefix();
            if prefix.is_none() {
                if let Some(parent) = self.stack.last() {
                    let (_, parent_local) = split_ns_name(&parent.name);
                    if !tag_definition(parent_local).prevents_namespace_inheritance() {
                        prefix = ns_prefix(&parent.name);
                    }
                }
            }
        }
        merge_ns_name(prefix, local)
    }

    /// Closes the innermost open element called `name`, implicitly closing any
    /// element opened after it.
    ///
    /// Returns false when no such element is open, or when an element in
    /// between requires an explicit end tag.
    fn pop_element(&mut self, name: &str, end_span: Span) -> bool {
        let mut unexpected = false;
        for index in (0..self.stack.len()).rev() {
            let node = &self.stack[index];
            if node.name == name {
                while self.stack.len() > index + 1 {
                    if let Some(inner) = self.stack.pop() {
                        self.add_to_parent(Node::Element(inner));
                    }
                }
                if let Some(mut element) = self.stack.pop() {
                    element.end_span = Some(end_span);
                    element.span = element.start_span.cover(end_span);
                    self.add_to_parent(Node::Element(element));
                }
                return !unexpected;
            }
            let (_, local) = split_ns_name(&node.name);
            if !tag_definition(local).is_closed_by_parent() {
                unexpected = true;
            }
        }
        false
    }

    // === Markup ===

    fn consume_start_tag(&mut self) {
        let start = self.pos;
        let mut tokens = Lexer::new(self.source, start + 1).peekable();
        let Some(name_token) = tokens.next() else {
            self.pos = self.source.len();
            return;
        };
        let raw_name = name_token.span.slice(self.source);

        let mut attrs: Vec<Attribute> = Vec::new();
        let mut self_closing = false;
        let end = loop {
            let token = next_token(&mut tokens, self.source.len());
            match token.kind {
                TokenKind::Name => {
                    let attr = self.consume_attribute(token, &mut tokens);
                    attrs.push(attr);
                }
                TokenKind::RAngle => break token.span.hi(),
                TokenKind::SlashRAngle => {
                    self_closing = true;
                    break token.span.hi();
                }
                TokenKind::Slash => {}
                TokenKind::LAngle | TokenKind::Eof => {
                    self.error(
                        ParseErrorKind::UnterminatedTag {
                            name: raw_name.to_string(),
                        },
                        Span::from_range(start..token.span.lo()),
                    );
                    break token.span.lo();
                }
                TokenKind::Eq
                | TokenKind::DoubleQuoted
                | TokenKind::SingleQuoted
                | TokenKind::Error => {
                    self.error(
                        ParseErrorKind::UnexpectedCharacter {
                            found: token.span.slice(self.source).to_string(),
                        },
                        token.span,
                    );
                }
            }
        };
        self.pos = end;

        let (prefix, local) = split_explicit_ns(raw_name);
        let full_name = self.element_full_name(prefix, local);
        let definition = tag_definition(local);
        let start_span = Span::from_range(start..end);

        if self_closing
            && !(definition.can_self_close()
                || ns_prefix(&full_name).is_some()
                || definition.is_void())
        {
            self.error(
                ParseErrorKind::InvalidSelfClose {
                    name: full_name.clone(),
                },
                start_span,
            );
        }

        let closes_parent = self.stack.last().is_some_and(|parent| {
            let (_, parent_local) = split_ns_name(&parent.name);
            tag_definition(parent_local).is_closed_by_child(local)
        });
        if closes_parent {
            if let Some(parent) = self.stack.pop() {
                self.add_to_parent(Node::Element(parent));
            }
        }

        let is_foreign = ns_prefix(&full_name).is_some();
        let element = Element {
            name: full_name.into(),
            attrs,
            children: Vec::new(),
            span: start_span,
            start_span,
            end_span: self_closing.then_some(start_span),
        };

        if self_closing || definition.is_void() {
            self.add_to_parent(Node::Element(element));
            return;
        }
        self.stack.push(element);
        if !is_foreign && definition.content_type() != ContentType::Parsable {
            self.consume_raw_text(local);
        }
    }

    fn consume_attribute(
        &mut self,
        name_token: Token,
        tokens: &mut Peekable<Lexer<'src>>,
    ) -> Attribute {
        let mut attr = Attribute {
            name: name_token.span.slice(self.source).into(),
            value: String::new(),
            span: name_token.span,
            value_span: None,
        };
        if tokens.peek().map(|t| t.kind) != Some(TokenKind::Eq) {
            return attr;
        }
        tokens.next();

        match tokens.peek().cloned() {
            Some(value) if value.kind.is_quoted() => {
                tokens.next();
                let inner = Span::from_range(value.span.lo() + 1..value.span.hi() - 1);
                attr.value = inner.slice(self.source).to_string();
                attr.value_span = Some(inner);
                attr.span = attr.span.cover(value.span);
            }
            Some(value) if value.kind == TokenKind::Name => {
                tokens.next();
                attr.value = value.span.slice(self.source).to_string();
                attr.value_span = Some(value.span);
                attr.span = attr.span.cover(value.span);
            }
            _ => {}
        }
        attr
    }

    fn consume_end_tag(&mut self) {
        let start = self.pos;
        let mut tokens = Lexer::new(self.source, start + 2).peekable();
        let Some(name_token) = tokens.next() else {
            self.pos = self.source.len();
            return;
        };
        let raw_name = name_token.span.slice(self.source);

        let end = loop {
            let token = next_token(&mut tokens, self.source.len());
            match token.kind {
                TokenKind::RAngle => break token.span.hi(),
                TokenKind::LAngle | TokenKind::Eof => {
                    self.error(
                        ParseErrorKind::UnterminatedTag {
                            name: raw_name.to_string(),
                        },
                        Span::from_range(start..token.span.lo()),
                    );
                    break token.span.lo();
                }
                _ => self.error(
                    ParseErrorKind::UnexpectedCharacter {
                        found: token.span.slice(self.source).to_string(),
                    },
                    token.span,
                ),
            }
        };
        self.pos = end;

        let span = Span::from_range(start..end);
        let (prefix, local) = split_explicit_ns(raw_name);
        let full_name = self.element_full_name(prefix, local);

        if tag_definition(&full_name).is_void() {
            self.error(ParseErrorKind::VoidElementEndTag { name: full_name }, span);
            return;
        }
        if !self.pop_element(&full_name, span) {
            self.error(ParseErrorKind::UnexpectedClosingTag { name: full_name }, span);
        }
    }

    /// Reads the content of a raw text element up to its end tag.
    fn consume_raw_text(&mut self, local: &str) {
        let start = self.pos;
        let close = format!("</{}", local.to_ascii_lowercase());
        let end = self.source[start..]
            .to_ascii_lowercase()
            .find(&close)
            .map_or(self.source.len(), |idx| start + idx);
        self.add_text(start, end);
        self.pos = end;
    }

    fn consume_comment(&mut self) {
        let start = self.pos;
        let body_start = start + 4;
        match self.source[body_start..].find("-->") {
            Some(idx) => {
                let end = body_start + idx + 3;
                self.add_to_parent(Node::Comment(Comment {
                    value: self.source[body_start..body_start + idx].to_string(),
                    span: Span::from_range(start..end),
                }));
                self.pos = end;
            }
            None => {
                self.error(
                    ParseErrorKind::UnterminatedComment,
                    Span::from_range(start..self.source.len()),
                );
                self.pos = self.source.len();
            }
        }
    }

    /// Skips `<!DOCTYPE ...>` and similar declarations.
    fn consume_declaration(&mut self) {
        self.pos = self.source[self.pos..]
            .find('>')
            .map_or(self.source.len(), |idx| self.pos + idx + 1);
    }

    // === Text ===

    fn consume_text(&mut self) {
        let source = self.source;
        let start = self.pos;
        let bytes = source.as_bytes();
        let mut i = start;
        while i < bytes.len() {
            match bytes[i] {
                b'<' if is_markup_start(&source[i..]) => break,
                b'{' if bytes.get(i + 1) == Some(&b'{') => {
                    match find_interpolation_end(source, i + 2) {
                        Some(end) => i = end,
                        None => {
                            self.error(
                                ParseErrorKind::UnterminatedInterpolation,
                                Span::from_range(i..bytes.len()),
                            );
                            i = bytes.len();
                        }
                    }
                }
                b'{' => break,
                _ => i += 1,
            }
        }
        self.add_text(start, i);
        self.pos = i;
    }

    /// Reads an ICU message, or reports an unescaped `{`.
    fn consume_expansion(&mut self) {
        let source = self.source;
        let start = self.pos;
        let Some(close) = find_matching_brace(source, start) else {
            self.error(
                ParseErrorKind::UnescapedBrace,
                Span::from_range(start..start + 1),
            );
            self.add_text(start, start + 1);
            self.pos = start + 1;
            return;
        };

        let end = close + 1;
        let body = &source[start + 1..close];
        match parse_icu_header(body) {
            Some((switch_value, kind)) => {
                self.add_to_parent(Node::Expansion(Expansion {
                    switch_value: switch_value.to_string(),
                    kind: kind.into(),
                    span: Span::from_range(start..end),
                }));
            }
            None => {
                self.error(
                    ParseErrorKind::UnescapedBrace,
                    Span::from_range(start..start + 1),
                );
                self.add_text(start, end);
            }
        }
        self.pos = end;
    }
}

fn next_token(tokens: &mut Peekable<Lexer<'_>>, len: usize) -> Token {
    tokens.next().unwrap_or(Token {
        kind: TokenKind::Eof,
        span: Span::from_range(len..len),
    })
}

fn starts_tag_name(rest: &str) -> bool {
    rest.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
}

fn is_markup_start(rest: &str) -> bool {
    rest.starts_with("<!")
        || (rest.starts_with("</") && starts_tag_name(&rest[2..]))
        || starts_tag_name(&rest[1..])
}

/// Splits an explicit `svg:rect` prefix off a tag name.
fn split_explicit_ns(name: &str) -> (Option<&str>, &str) {
    match name.split_once(':') {
        Some((prefix, local)) if !prefix.is_empty() && !local.is_empty() => (Some(prefix), local),
        _ => (None, name),
    }
}

/// Finds the `}` matching the `{` at `open`.
fn find_matching_brace(source: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, b) in source.as_bytes().iter().enumerate().skip(open) {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Recognizes `value, type, cases` at the start of an ICU body.
fn parse_icu_header(body: &str) -> Option<(&str, &str)> {
    let (switch_value, rest) = body.split_once(',')?;
    let (kind, _cases) = rest.split_once(',')?;
    let switch_value = switch_value.trim();
    let kind = kind.trim();
    let valid = !switch_value.is_empty()
        && !switch_value.contains(['{', '}'])
        && !kind.is_empty()
        && kind.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    valid.then_some((switch_value, kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> ParseTree {
        Parser::new(source).parse()
    }

    fn element(node: &Node) -> &Element {
        match node {
            Node::Element(el) => el,
            other => panic!("expected element, got {other:?}"),
        }
    }

    /// Renders the tree as names only, for structural assertions.
    fn outline(nodes: &[Node]) -> String {
        nodes
            .iter()
            .map(|node| match node {
                Node::Element(el) => format!("{}[{}]", el.name, outline(&el.children)),
                Node::Text(text) => format!("'{}'", text.value),
                Node::Comment(_) => "#comment".to_string(),
                Node::Expansion(icu) => format!("icu({})", icu.kind),
            })
            .collect::<Vec<_>>()
            .join(",")
    }

    #[test]
    fn test_simple_element() {
        let tree = parse("<div>hello</div>");
        assert!(tree.errors.is_empty());
        assert_eq!(outline(&tree.nodes), "div['hello']");
        let div = element(&tree.nodes[0]);
        assert_eq!(div.start_span, Span::new(0u32, 5u32));
        assert_eq!(div.end_span, Some(Span::new(10u32, 16u32)));
        assert_eq!(div.span, Span::new(0u32, 16u32));
    }

    #[test]
    fn test_attributes() {
        let tree = parse(r#"<input type=text [value]="name" disabled (change)='go($event)'>"#);
        assert!(tree.errors.is_empty());
        let input = element(&tree.nodes[0]);
        let attrs: Vec<(&str, &str)> = input
            .attrs
            .iter()
            .map(|a| (a.name.as_str(), a.value.as_str()))
            .collect();
        assert_eq!(
            attrs,
            vec![
                ("type", "text"),
                ("[value]", "name"),
                ("disabled", ""),
                ("(change)", "go($event)"),
            ]
        );
    }

    #[test]
    fn test_void_element_spans() {
        let tree = parse("<img><br/><col />");
        assert!(tree.errors.is_empty());
        assert_eq!(outline(&tree.nodes), "img[],br[],col[]");
        assert_eq!(element(&tree.nodes[0]).end_span, None);
        let br = element(&tree.nodes[1]);
        assert_eq!(br.end_span, Some(br.start_span));
    }

    #[test]
    fn test_implied_end_tags() {
        let tree = parse("<tr><td>foo</tr>");
        assert!(tree.errors.is_empty());
        assert_eq!(outline(&tree.nodes), "tr[td['foo']]");
        let tr = element(&tree.nodes[0]);
        assert!(tr.end_span.is_some());
        assert_eq!(element(&tr.children[0]).end_span, None);

        let tree = parse("<ul><li>a<li>b</ul>");
        assert!(tree.errors.is_empty());
        assert_eq!(outline(&tree.nodes), "ul[li['a'],li['b']]");

        let tree = parse("<p>one<div>two</div>");
        assert_eq!(outline(&tree.nodes), "p['one'],div['two']");
    }

    #[test]
    fn test_mismatched_close_tag() {
        let tree = parse("<foo></bar>");
        assert_eq!(tree.errors.len(), 1);
        assert_eq!(
            tree.errors[0].kind,
            ParseErrorKind::UnexpectedClosingTag {
                name: "bar".to_string()
            }
        );
        assert_eq!(tree.errors[0].span, Span::new(5u32, 11u32));
    }

    #[test]
    fn test_close_tag_across_required_end_tag() {
        let tree = parse("<div><span></div>");
        assert_eq!(tree.errors.len(), 1);
        assert!(matches!(
            tree.errors[0].kind,
            ParseErrorKind::UnexpectedClosingTag { .. }
        ));
    }

    #[test]
    fn test_unclosed_at_eof_is_not_an_error() {
        let tree = parse("<div><span>text");
        assert!(tree.errors.is_empty());
        assert_eq!(outline(&tree.nodes), "div[span['text']]");
    }

    #[test]
    fn test_self_close_rules() {
        let tree = parse("<app-item /><ng-container/><svg><polyline points='0 1' /></svg>");
        assert!(tree.errors.is_empty(), "{:?}", tree.errors);
        assert_eq!(
            outline(&tree.nodes),
            "app-item[],ng-container[],:svg:svg[:svg:polyline[]]"
        );

        let tree = parse("<div/>");
        assert_eq!(
            tree.errors[0].kind,
            ParseErrorKind::InvalidSelfClose {
                name: "div".to_string()
            }
        );
    }

    #[test]
    fn test_foreign_object_stops_namespace() {
        let tree = parse("<svg><foreignObject><div></div></foreignObject></svg>");
        assert!(tree.errors.is_empty(), "{:?}", tree.errors);
        assert_eq!(
            outline(&tree.nodes),
            ":svg:svg[:svg:foreignObject[div[]]]"
        );
    }

    #[test]
    fn test_void_end_tag() {
        let tree = parse("<br></br>");
        assert_eq!(
            tree.errors[0].kind,
            ParseErrorKind::VoidElementEndTag {
                name: "br".to_string()
            }
        );
    }

    #[test]
    fn test_interpolation_may_contain_markup_characters() {
        let tree = parse("<b>{{ a < b ? '}}' : c }}</b>");
        assert!(tree.errors.is_empty());
        assert_eq!(outline(&tree.nodes), "b['{{ a < b ? '}}' : c }}']");
    }

    #[test]
    fn test_unterminated_interpolation() {
        let tree = parse("<b>{{ name </b>");
        assert_eq!(tree.errors[0].kind, ParseErrorKind::UnterminatedInterpolation);
    }

    #[test]
    fn test_comments() {
        let tree = parse("<div><!-- <b>x</b> --></div>");
        assert!(tree.errors.is_empty());
        assert_eq!(outline(&tree.nodes), "div[#comment]");

        let tree = parse("<div><!-- open");
        assert_eq!(tree.errors[0].kind, ParseErrorKind::UnterminatedComment);
    }

    #[test]
    fn test_icu_and_unescaped_brace() {
        let tree = parse("<span>{count, plural, =0 {none} other {{{count}} items}}</span>");
        assert!(tree.errors.is_empty(), "{:?}", tree.errors);
        assert_eq!(outline(&tree.nodes), "span[icu(plural)]");

        let tree = parse("<span>a { b</span>");
        assert_eq!(tree.errors[0].kind, ParseErrorKind::UnescapedBrace);

        let tree = parse("<span>{ not an icu }</span>");
        assert_eq!(tree.errors[0].kind, ParseErrorKind::UnescapedBrace);
    }

    #[test]
    fn test_raw_text() {
        let tree = parse("<script>if (a < b) { x(); }</script><textarea>\n{{v}}</textarea>");
        assert!(tree.errors.is_empty(), "{:?}", tree.errors);
        assert_eq!(
            outline(&tree.nodes),
            "script['if (a < b) { x(); }'],textarea['{{v}}']"
        );
    }

    #[test]
    fn test_pre_drops_first_newline() {
        let tree = parse("<pre>\ncode\n</pre>");
        assert_eq!(outline(&tree.nodes), "pre['code\n']");
    }

    #[test]
    fn test_whitespace_and_stray_angle() {
        let tree = parse("  a < b  <i>x</i>\n");
        assert!(tree.errors.is_empty());
        assert_eq!(outline(&tree.nodes), "'  a < b  ',i['x'],'\n'");
    }

    #[test]
    fn test_unterminated_tag() {
        let tree = parse("<div class='a'");
        assert_eq!(
            tree.errors[0].kind,
            ParseErrorKind::UnterminatedTag {
                name: "div".to_string()
            }
        );
    }

    #[test]
    fn test_doctype_is_skipped() {
        let tree = parse("<!DOCTYPE html><p>x</p>");
        assert!(tree.errors.is_empty());
        assert_eq!(outline(&tree.nodes), "p['x']");
    }
}
