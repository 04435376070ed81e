//! The intermediate template tree.
//!
//! Angular specifics are resolved when this tree is built: structural
//! directives become [`TemplateNode::Conditional`], [`TemplateNode::ForOf`]
//! and the switch nodes, bindings are sorted by what they target, and
//! component selectors are replaced by class names. The generator only has
//! to print it.

use ng_template_parser::{Expr, Interpolation};
use smol_str::SmolStr;

/// A template expression: plain source text, or a pipe applied to an inner
/// expression. `a | p1 | p2` is `Pipe(p2, Pipe(p1, a))`.
pub type TemplateExpr = Expr;

/// A node of the intermediate tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateNode {
    Element(ElementNode),
    /// `*ngIf`
    Conditional {
        condition: TemplateExpr,
        /// Column of the directive's element, used to indent the output.
        indent: usize,
        children: Vec<TemplateNode>,
    },
    /// `*ngFor`
    ForOf {
        iterable: TemplateExpr,
        variable: SmolStr,
        index: Option<SmolStr>,
        indent: usize,
        children: Vec<TemplateNode>,
    },
    /// `[ngSwitch]`; children are cases, defaults and whitespace.
    Switch {
        discriminant: TemplateExpr,
        indent: usize,
        children: Vec<TemplateNode>,
    },
    SwitchCase {
        value: TemplateExpr,
        indent: usize,
        children: Vec<TemplateNode>,
    },
    SwitchDefault {
        indent: usize,
        children: Vec<TemplateNode>,
    },
    Text(String),
    TextWithInterpolation(InterpolatedText),
    /// Children rendered in place, fragment-wrapped when needed.
    Container(Vec<TemplateNode>),
}

impl TemplateNode {
    /// True for text made only of whitespace.
    pub fn is_whitespace(&self) -> bool {
        matches!(self, TemplateNode::Text(text) if text.trim().is_empty())
    }

    pub fn children(&self) -> &[TemplateNode] {
        match self {
            TemplateNode::Element(el) => &el.children,
            TemplateNode::Conditional { children, .. }
            | TemplateNode::ForOf { children, .. }
            | TemplateNode::Switch { children, .. }
            | TemplateNode::SwitchCase { children, .. }
            | TemplateNode::SwitchDefault { children, .. }
            | TemplateNode::Container(children) => children,
            TemplateNode::Text(_) | TemplateNode::TextWithInterpolation(_) => &[],
        }
    }
}

/// An element or component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementNode {
    /// The tag, or the class name for components.
    pub tag: SmolStr,
    /// Attributes in source order: inputs, then outputs, then literals.
    pub attributes: Vec<Attribute>,
    /// The literal `class` attribute.
    pub class_name: Option<String>,
    /// `[class.x]` bindings.
    pub conditional_classes: Vec<ConditionalClass>,
    /// The literal `style` attribute.
    pub style: Option<String>,
    /// `[style.x]` bindings.
    pub style_bindings: Vec<StyleBinding>,
    pub self_close: bool,
    pub is_component: bool,
    pub children: Vec<TemplateNode>,
}

/// An attribute of an element other than `class` and `style`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: SmolStr,
    pub value: AttributeValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    /// `name="text"`
    String(String),
    /// `[name]="expr"`
    Expression(TemplateExpr),
    /// `name="a{{b}}c"`
    Interpolation(InterpolatedText),
    /// `(name)="handler"`
    Event(String),
}

/// Literal fragments with an expression between each pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpolatedText {
    /// One more than `expressions`.
    pub strings: Vec<String>,
    pub expressions: Vec<TemplateExpr>,
}

impl From<&Interpolation> for InterpolatedText {
    fn from(interpolation: &Interpolation) -> Self {
        Self {
            strings: interpolation.strings.clone(),
            expressions: interpolation.expressions.clone(),
        }
    }
}

/// `[class.name]="condition"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionalClass {
    pub class_name: SmolStr,
    pub condition: TemplateExpr,
}

/// `[style.property.unit]="expression"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleBinding {
    pub property: SmolStr,
    pub expression: TemplateExpr,
    pub unit: Option<SmolStr>,
}
