//! Angular template parser for ng2react.
//!
//! This crate turns an Angular component template into a bound tree:
//! - Tag lexer using `logos`
//! - Tree builder with HTML's implied end tags, void elements and SVG/MathML namespaces
//! - Binder that interprets `[prop]`, `(event)`, `*directive`, `#ref` and `let-x`
//! - Expression splitting for pipes, interpolations and the `*directive` microsyntax
//!
//! Whitespace and line endings are preserved exactly, so every node keeps the
//! column it was written at.
//!
//! # Example
//!
//! ```
//! use ng_template_parser::{parse, Node};
//!
//! let source = r#"
//! <ul>
//!     <li *ngFor="let hero of heroes" (click)="select(hero)">{{ hero.name }}</li>
//! </ul>
//! "#;
//!
//! let result = parse(source);
//! assert!(result.errors.is_empty());
//! assert!(result.nodes.iter().any(|n| matches!(n, Node::Element(_))));
//! ```

mod ast;
mod binder;
pub mod dom;
mod error;
mod expression;
mod lexer;
mod parser;
mod tags;

pub use ast::*;
pub use error::{ParseError, ParseErrorKind};
pub use expression::{
    parse_binding, parse_interpolation, parse_template_bindings, Expr, Interpolation,
    TemplateBinding,
};
pub use lexer::{Lexer, Token, TokenKind};
pub use source_text::Span;
pub use tags::{split_ns_name, tag_definition, ContentType, TagDefinition};

/// The result of parsing a template.
#[derive(Debug)]
pub struct ParseResult {
    /// Top-level nodes of the bound tree.
    pub nodes: Vec<Node>,
    /// Markup errors followed by binding errors.
    pub errors: Vec<ParseError>,
}

/// Parses a template into a bound tree.
///
/// Parsing always produces a tree; malformed markup and bindings are reported
/// in [`ParseResult::errors`].
pub fn parse(source: &str) -> ParseResult {
    let tree = parse_html(source);
    let (nodes, binding_errors) = binder::bind(&tree.nodes);
    let mut errors = tree.errors;
    errors.extend(binding_errors);
    ParseResult { nodes, errors }
}

/// Parses a template into the raw HTML tree without interpreting bindings.
pub fn parse_html(source: &str) -> parser::ParseTree {
    parser::Parser::new(source).parse()
}

pub use parser::ParseTree;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty() {
        let result = parse("");
        assert!(result.errors.is_empty());
        assert!(result.nodes.is_empty());
    }

    #[test]
    fn test_parse_simple_element() {
        let result = parse("<div>hello</div>");
        assert!(result.errors.is_empty());
        assert_eq!(result.nodes.len(), 1);
    }

    #[test]
    fn test_markup_and_binding_errors_are_combined() {
        let result = parse("<div [x]=\"\"></span>");
        assert_eq!(result.errors.len(), 2);
        assert!(matches!(
            result.errors[0].kind,
            ParseErrorKind::UnexpectedClosingTag { .. }
        ));
        assert!(matches!(
            result.errors[1].kind,
            ParseErrorKind::EmptyExpression { .. }
        ));
    }
}
