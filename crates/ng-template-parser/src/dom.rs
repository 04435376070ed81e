//! The raw HTML tree produced by the tree builder.
//!
//! Attribute names are kept exactly as written; the binder later decides
//! which of them are bindings.

use smol_str::SmolStr;
use source_text::Span;

/// A node of the raw HTML tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// An element with its attributes and children.
    Element(Element),
    /// Text, possibly containing `{{ }}` interpolations.
    Text(Text),
    /// An HTML comment.
    Comment(Comment),
    /// An ICU message such as `{count, plural, =0 {none} other {some}}`.
    Expansion(Expansion),
}

impl Node {
    /// Returns the span of this node.
    pub fn span(&self) -> Span {
        match self {
            Node::Element(el) => el.span,
            Node::Text(text) => text.span,
            Node::Comment(comment) => comment.span,
            Node::Expansion(expansion) => expansion.span,
        }
    }
}

/// An element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// The element name, with a `:ns:` prefix for SVG and MathML content.
    pub name: SmolStr,
    /// Attributes in source order.
    pub attrs: Vec<Attribute>,
    /// Child nodes.
    pub children: Vec<Node>,
    /// From the start of the start tag to the end of the end tag, when there is one.
    pub span: Span,
    /// The start tag.
    pub start_span: Span,
    /// The end tag. Equal to `start_span` for `<x />`, `None` when the element
    /// was closed implicitly or is a void element written without `/`.
    pub end_span: Option<Span>,
}

/// An attribute as written in the start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// The name, including any binding syntax such as `[x]` or `*x`.
    pub name: SmolStr,
    /// The unquoted value; empty when the attribute has none.
    pub value: String,
    /// The whole attribute.
    pub span: Span,
    /// The value without its quotes.
    pub value_span: Option<Span>,
}

/// A text node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    /// The text, verbatim.
    pub value: String,
    /// Where the text is.
    pub span: Span,
}

/// A comment; `value` excludes the `<!--` and `-->` markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// The comment body.
    pub value: String,
    /// Where the comment is.
    pub span: Span,
}

/// An ICU message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    /// The expression being switched on.
    pub switch_value: String,
    /// `plural`, `select` or another ICU type.
    pub kind: SmolStr,
    /// Where the message is.
    pub span: Span,
}
