//! The bound template tree.
//!
//! This is the raw HTML tree after binding syntax has been interpreted:
//! `[x]`, `(x)`, `*x`, `#x` and `let-x` attributes are sorted into inputs,
//! outputs, template bindings, references and variables, and text with
//! interpolations becomes [`BoundText`].

use crate::expression::{Expr, Interpolation};
use smol_str::SmolStr;
use source_text::Span;

/// A node of the bound template tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A plain element or component.
    Element(Element),
    /// `<ng-template>` or an element carrying a `*directive`.
    Template(Template),
    /// `<ng-content>`.
    Content(Content),
    /// Literal text.
    Text(Text),
    /// Text with interpolations.
    BoundText(BoundText),
    /// An ICU message.
    Icu(Icu),
}

impl Node {
    /// Returns the span of this node.
    pub fn span(&self) -> Span {
        match self {
            Node::Element(el) => el.span,
            Node::Template(template) => template.span,
            Node::Content(content) => content.span,
            Node::Text(text) => text.span,
            Node::BoundText(text) => text.span,
            Node::Icu(icu) => icu.span,
        }
    }
}

/// An element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// The element name, with a `:ns:` prefix for SVG and MathML content.
    pub name: SmolStr,
    /// Static attributes.
    pub attributes: Vec<TextAttribute>,
    /// Property, attribute, class and style bindings.
    pub inputs: Vec<BoundAttribute>,
    /// Event bindings.
    pub outputs: Vec<BoundEvent>,
    /// `#ref` declarations.
    pub references: Vec<Reference>,
    /// Child nodes.
    pub children: Vec<Node>,
    /// The whole element.
    pub span: Span,
    /// The start tag.
    pub start_span: Span,
    /// The end tag, see [`crate::dom::Element::end_span`].
    pub end_span: Option<Span>,
}

/// A template: either a literal `<ng-template>` or the implicit template
/// created by a `*directive` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    /// `ng-template` for literal templates, otherwise the wrapped element name.
    pub tag_name: SmolStr,
    /// Static attributes of a literal `<ng-template>`.
    pub attributes: Vec<TextAttribute>,
    /// Bindings on a literal `<ng-template>`.
    pub inputs: Vec<BoundAttribute>,
    /// Events on a literal `<ng-template>`.
    pub outputs: Vec<BoundEvent>,
    /// Bindings produced by the `*directive` microsyntax.
    pub template_attrs: Vec<TemplateAttr>,
    /// `let-x` and microsyntax variables.
    pub variables: Vec<Variable>,
    /// `#ref` declarations on a literal `<ng-template>`.
    pub references: Vec<Reference>,
    /// The template content. For `*directive` this is the wrapped element.
    pub children: Vec<Node>,
    /// The whole template.
    pub span: Span,
    /// The start tag.
    pub start_span: Span,
    /// The end tag.
    pub end_span: Option<Span>,
}

/// One binding from a `*directive` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateAttr {
    /// A binding with a value, such as `ngIf` or `ngForOf`.
    Bound(BoundAttribute),
    /// A binding without a value, such as `ngFor` in `*ngFor="let x of xs"`
    /// or `ngSwitchDefault`.
    Text(TextAttribute),
}

impl TemplateAttr {
    /// Returns the binding name.
    pub fn name(&self) -> &str {
        match self {
            TemplateAttr::Bound(attr) => &attr.name,
            TemplateAttr::Text(attr) => &attr.name,
        }
    }
}

/// `<ng-content>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    /// The `select` attribute, `*` when absent.
    pub selector: String,
    /// Where the element is.
    pub span: Span,
}

/// Literal text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    pub value: String,
    pub span: Span,
}

/// Text with `{{ }}` interpolations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundText {
    pub value: Interpolation,
    pub span: Span,
}

/// An ICU message, kept only so that it can be reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icu {
    pub switch_value: String,
    pub kind: SmolStr,
    pub span: Span,
}

/// A static `name="value"` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextAttribute {
    pub name: SmolStr,
    pub value: String,
    pub span: Span,
}

/// What a bound attribute targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    /// `[prop]`
    Property,
    /// `[attr.name]`
    Attribute,
    /// `[class.name]`
    Class,
    /// `[style.name]` or `[style.name.unit]`
    Style,
    /// `[@trigger]`
    Animation,
}

/// The value of a bound attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingValue {
    /// `[x]="expr"`
    Expr(Expr),
    /// `x="a{{b}}c"`
    Interpolation(Interpolation),
}

/// A property, attribute, class or style binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundAttribute {
    /// The target name: the property, the attribute without `attr.`, the class
    /// or the style property.
    pub name: SmolStr,
    pub kind: BindingKind,
    pub value: BindingValue,
    /// The unit of a `[style.width.px]` binding.
    pub unit: Option<SmolStr>,
    pub span: Span,
}

/// An event binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundEvent {
    /// The event name, without any `target:` prefix.
    pub name: SmolStr,
    /// The handler statement text, trimmed.
    pub handler: String,
    /// `window`, `document` or `body` for `(window:resize)`.
    pub target: Option<SmolStr>,
    pub span: Span,
}

/// A `#name` or `ref-name` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub name: SmolStr,
    /// The exported directive name, empty for the element itself.
    pub value: String,
    pub span: Span,
}

/// A template variable: `let-x="value"` or one declared in microsyntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: SmolStr,
    /// The context property read, `$implicit` when none is named.
    pub value: SmolStr,
    pub span: Span,
}
