//! Interprets Angular binding syntax on the raw HTML tree.
//!
//! | Attribute                    | Result                                 |
//! |------------------------------|----------------------------------------|
//! | `[x]`, `bind-x`              | property binding                       |
//! | `[attr.x]`, `[class.x]`      | attribute / class binding              |
//! | `[style.x]`, `[style.x.px]`  | style binding with optional unit       |
//! | `[@x]`, `@x`                 | animation binding                      |
//! | `(x)`, `on-x`                | event binding                          |
//! | `[(x)]`, `bindon-x`          | property binding plus `xChange` event  |
//! | `#x`, `ref-x`                | reference                              |
//! | `let-x`                      | template variable (`ng-template` only) |
//! | `*x`                         | implicit template around the element   |
//! | `x="a{{b}}"`                 | interpolated property binding          |

use crate::ast::{
    BindingKind, BindingValue, BoundAttribute, BoundEvent, BoundText, Content, Element, Icu,
    Node, Reference, Template, TemplateAttr, Text, TextAttribute, Variable,
};
use crate::dom;
use crate::error::{ParseError, ParseErrorKind};
use crate::expression::{parse_binding, parse_interpolation, parse_template_bindings, TemplateBinding};
use crate::tags::split_ns_name;
use smol_str::SmolStr;
use source_text::Span;

/// Attribute names whose DOM property is spelled differently.
const ATTR_TO_PROP: &[(&str, &str)] = &[
    ("class", "className"),
    ("for", "htmlFor"),
    ("formaction", "formAction"),
    ("innerHtml", "innerHTML"),
    ("readonly", "readOnly"),
    ("tabindex", "tabIndex"),
];

fn mapped_prop_name(name: &str) -> &str {
    ATTR_TO_PROP
        .iter()
        .find(|(attr, _)| *attr == name)
        .map_or(name, |(_, prop)| prop)
}

/// Binds a raw HTML tree. Errors are collected; nodes with errors are still
/// produced where possible.
pub fn bind(nodes: &[dom::Node]) -> (Vec<Node>, Vec<ParseError>) {
    let mut binder = Binder { errors: Vec::new() };
    let nodes = binder.visit_all(nodes);
    (nodes, binder.errors)
}

struct Binder {
    errors: Vec<ParseError>,
}

/// Everything collected from the attributes of one element.
#[derive(Default)]
struct Attributes {
    attributes: Vec<TextAttribute>,
    inputs: Vec<BoundAttribute>,
    outputs: Vec<BoundEvent>,
    references: Vec<Reference>,
    variables: Vec<Variable>,
    template: Option<TemplateBindings>,
}

struct TemplateBindings {
    attrs: Vec<TemplateAttr>,
    variables: Vec<Variable>,
}

impl Binder {
    fn error(&mut self, kind: ParseErrorKind, span: Span) {
        self.errors.push(ParseError::new(kind, span));
    }

    fn visit_all(&mut self, nodes: &[dom::Node]) -> Vec<Node> {
        nodes.iter().filter_map(|node| self.visit(node)).collect()
    }

    fn visit(&mut self, node: &dom::Node) -> Option<Node> {
        match node {
            dom::Node::Element(el) => self.visit_element(el),
            dom::Node::Text(text) => Some(self.visit_text(text)),
            dom::Node::Comment(_) => None,
            dom::Node::Expansion(icu) => Some(Node::Icu(Icu {
                switch_value: icu.switch_value.clone(),
                kind: icu.kind.clone(),
                span: icu.span,
            })),
        }
    }

    fn visit_text(&mut self, text: &dom::Text) -> Node {
        if text.value.contains("{{") {
            match parse_interpolation(&text.value, text.span.lo()) {
                Ok(Some(value)) => {
                    return Node::BoundText(BoundText {
                        value,
                        span: text.span,
                    })
                }
                Ok(None) => {}
                Err(err) => self.errors.push(err),
            }
        }
        Node::Text(Text {
            value: text.value.clone(),
            span: text.span,
        })
    }

    fn visit_element(&mut self, el: &dom::Element) -> Option<Node> {
        let (_, local) = split_ns_name(&el.name);
        if is_ignored(local, el) {
            return None;
        }
        if local == "ng-content" {
            let selector = el
                .attrs
                .iter()
                .find(|a| a.name == "select")
                .map_or_else(|| "*".to_string(), |a| a.value.clone());
            return Some(Node::Content(Content {
                selector,
                span: el.span,
            }));
        }

        let is_template = local == "ng-template";
        let mut attrs = Attributes::default();
        for attr in &el.attrs {
            self.visit_attribute(attr, is_template, &mut attrs);
        }
        let children = self.visit_all(&el.children);

        let node = if is_template {
            Node::Template(Template {
                tag_name: el.name.clone(),
                attributes: attrs.attributes,
                inputs: attrs.inputs,
                outputs: attrs.outputs,
                template_attrs: Vec::new(),
                variables: attrs.variables,
                references: attrs.references,
                children,
                span: el.span,
                start_span: el.start_span,
                end_span: el.end_span,
            })
        } else {
            Node::Element(Element {
                name: el.name.clone(),
                attributes: attrs.attributes,
                inputs: attrs.inputs,
                outputs: attrs.outputs,
                references: attrs.references,
                children,
                span: el.span,
                start_span: el.start_span,
                end_span: el.end_span,
            })
        };

        Some(match attrs.template {
            Some(bindings) => Node::Template(Template {
                tag_name: el.name.clone(),
                attributes: Vec::new(),
                inputs: Vec::new(),
                outputs: Vec::new(),
                template_attrs: bindings.attrs,
                variables: bindings.variables,
                references: Vec::new(),
                children: vec![node],
                span: el.span,
                start_span: el.start_span,
                end_span: el.end_span,
            }),
            None => node,
        })
    }

    fn visit_attribute(&mut self, attr: &dom::Attribute, is_template: bool, out: &mut Attributes) {
        let name = attr.name.as_str();
        if name == "i18n" || name.starts_with("i18n-") {
            return;
        }
        let value_offset = attr.value_span.map_or(attr.span.hi(), |s| s.lo());

        if let Some(key) = name.strip_prefix('*') {
            if out.template.is_some() {
                self.error(ParseErrorKind::MultipleTemplateBindings, attr.span);
                return;
            }
            let key_span = Span::from_range(attr.span.lo() + 1..attr.span.lo() + name.len());
            match parse_template_bindings(key, key_span, &attr.value, value_offset) {
                Ok(bindings) => out.template = Some(template_bindings(bindings)),
                Err(err) => self.errors.push(err),
            }
            return;
        }

        if let Some(target) = delimited(name, "[(", ")]").or_else(|| name.strip_prefix("bindon-")) {
            if let Some(input) = self.property(target, attr, value_offset) {
                out.inputs.push(input);
                out.outputs.push(BoundEvent {
                    name: format!("{target}Change").into(),
                    handler: format!("{} = $event", attr.value.trim()),
                    target: None,
                    span: attr.span,
                });
            }
        } else if let Some(target) = delimited(name, "[", "]").or_else(|| name.strip_prefix("bind-")) {
            out.inputs.extend(self.property(target, attr, value_offset));
        } else if let Some(event) = delimited(name, "(", ")").or_else(|| name.strip_prefix("on-")) {
            out.outputs.extend(self.event(event, attr));
        } else if let Some(reference) = name.strip_prefix('#').or_else(|| name.strip_prefix("ref-")) {
            out.references.push(Reference {
                name: reference.into(),
                value: attr.value.clone(),
                span: attr.span,
            });
        } else if let Some(variable) = name.strip_prefix("let-") {
            if is_template {
                out.variables.push(Variable {
                    name: variable.into(),
                    value: implicit_if_empty(&attr.value),
                    span: attr.span,
                });
            } else {
                self.error(ParseErrorKind::VariableOutsideTemplate, attr.span);
            }
        } else if let Some(trigger) = name.strip_prefix('@') {
            out.inputs.push(BoundAttribute {
                name: trigger.into(),
                kind: BindingKind::Animation,
                value: BindingValue::Expr(crate::expression::Expr::Expression {
                    source: attr.value.clone(),
                    span: attr.value_span.unwrap_or(attr.span),
                }),
                unit: None,
                span: attr.span,
            });
        } else {
            self.literal(attr, value_offset, out);
        }
    }

    /// A plain attribute, which is a property binding when it interpolates.
    fn literal(&mut self, attr: &dom::Attribute, value_offset: usize, out: &mut Attributes) {
        if attr.value.contains("{{") {
            match parse_interpolation(&attr.value, value_offset) {
                Ok(Some(interpolation)) => {
                    out.inputs.push(BoundAttribute {
                        name: mapped_prop_name(&attr.name).into(),
                        kind: BindingKind::Property,
                        value: BindingValue::Interpolation(interpolation),
                        unit: None,
                        span: attr.span,
                    });
                    return;
                }
                Ok(None) => {}
                Err(err) => {
                    self.errors.push(err);
                    return;
                }
            }
        }
        out.attributes.push(TextAttribute {
            name: attr.name.clone(),
            value: attr.value.clone(),
            span: attr.span,
        });
    }

    fn property(
        &mut self,
        target: &str,
        attr: &dom::Attribute,
        value_offset: usize,
    ) -> Option<BoundAttribute> {
        if attr.value.trim().is_empty() {
            self.error(
                ParseErrorKind::EmptyExpression {
                    name: attr.name.to_string(),
                },
                attr.span,
            );
            return None;
        }
        let value = match parse_binding(&attr.value, value_offset) {
            Ok(expr) => BindingValue::Expr(expr),
            Err(err) => {
                self.errors.push(err);
                return None;
            }
        };

        let (kind, name, unit) = classify_property(target);
        Some(BoundAttribute {
            name,
            kind,
            value,
            unit,
            span: attr.span,
        })
    }

    fn event(&mut self, event: &str, attr: &dom::Attribute) -> Option<BoundEvent> {
        if attr.value.trim().is_empty() {
            self.error(
                ParseErrorKind::EmptyExpression {
                    name: attr.name.to_string(),
                },
                attr.span,
            );
            return None;
        }
        let (target, name) = match event.split_once(':') {
            Some((target, name)) => (Some(SmolStr::new(target)), name),
            None => (None, event),
        };
        Some(BoundEvent {
            name: name.into(),
            handler: attr.value.trim().to_string(),
            target,
            span: attr.span,
        })
    }
}

/// Splits a bound property target into its kind, name and unit.
fn classify_property(target: &str) -> (BindingKind, SmolStr, Option<SmolStr>) {
    if let Some(trigger) = target
        .strip_prefix('@')
        .or_else(|| target.strip_prefix("animate."))
    {
        return (BindingKind::Animation, trigger.into(), None);
    }
    let mut parts = target.splitn(3, '.');
    let head = parts.next().unwrap_or_default();
    let rest: Vec<&str> = parts.collect();
    match (head, rest.as_slice()) {
        ("attr", [name, ..]) => (BindingKind::Attribute, (*name).into(), None),
        ("class", [name, ..]) => (BindingKind::Class, (*name).into(), None),
        ("style", [name]) => (BindingKind::Style, (*name).into(), None),
        ("style", [name, unit]) => (BindingKind::Style, (*name).into(), Some((*unit).into())),
        _ => (BindingKind::Property, mapped_prop_name(target).into(), None),
    }
}

fn template_bindings(bindings: Vec<TemplateBinding>) -> TemplateBindings {
    let mut attrs = Vec::new();
    let mut variables = Vec::new();
    for binding in bindings {
        match binding {
            TemplateBinding::Variable { name, value, span } => {
                variables.push(Variable { name, value, span });
            }
            TemplateBinding::Expression {
                key,
                value: Some(expr),
                span,
            } => attrs.push(TemplateAttr::Bound(BoundAttribute {
                name: key,
                kind: BindingKind::Property,
                value: BindingValue::Expr(expr),
                unit: None,
                span,
            })),
            TemplateBinding::Expression {
                key,
                value: None,
                span,
            } => attrs.push(TemplateAttr::Text(TextAttribute {
                name: key,
                value: String::new(),
                span,
            })),
        }
    }
    TemplateBindings { attrs, variables }
}

fn delimited<'a>(name: &'a str, open: &str, close: &str) -> Option<&'a str> {
    name.strip_prefix(open)?.strip_suffix(close)
}

fn implicit_if_empty(value: &str) -> SmolStr {
    if value.is_empty() {
        SmolStr::new("$implicit")
    } else {
        SmolStr::new(value)
    }
}

/// `<script>`, `<style>` and stylesheet links never reach the output.
fn is_ignored(local: &str, el: &dom::Element) -> bool {
    match local.to_ascii_lowercase().as_str() {
        "script" | "style" => true,
        "link" => el
            .attrs
            .iter()
            .any(|a| a.name == "rel" && a.value.eq_ignore_ascii_case("stylesheet")),
        _ => false,
    }
}
