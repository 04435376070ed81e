//! Prints the intermediate tree as TSX.

use once_cell::sync::Lazy;
use regex::Regex;
use source_text::{LineIndex, TextBuffer};

use crate::casing::kebab_to_camel;
use crate::context::FileContext;
use crate::diagnostic::{Diagnostic, DiagnosticCode};
use crate::mappings::{react_event_name, ATTRIBUTE_DOM_ALIASES, CASE_MAP, NON_STRING_ATTRIBUTES};
use crate::policy::{default_pipe, PolicyRegistry};
use crate::template::intermediate::{
    Attribute, AttributeValue, ConditionalClass, ElementNode, InterpolatedText, StyleBinding,
    TemplateExpr, TemplateNode,
};

static EVENT_ARGUMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$event\b").expect("valid regex"));
static CSS_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"/\*.*?\*/").expect("valid regex"));

/// Writes TSX for an intermediate tree.
pub struct TsxGenerator<'a> {
    out: TextBuffer,
    policy: &'a PolicyRegistry,
    ctx: &'a mut FileContext,
    /// Positions of pipe diagnostics are reported against the template.
    line_index: &'a LineIndex,
}

impl<'a> TsxGenerator<'a> {
    pub fn new(
        policy: &'a PolicyRegistry,
        ctx: &'a mut FileContext,
        line_index: &'a LineIndex,
    ) -> Self {
        Self {
            out: TextBuffer::new(),
            policy,
            ctx,
            line_index,
        }
    }

    pub fn generate(mut self, root: &TemplateNode) -> String {
        self.visit(root);
        self.out.into_string()
    }

    fn visit(&mut self, node: &TemplateNode) {
        match node {
            TemplateNode::Element(el) => self.visit_element(el),
            TemplateNode::Conditional {
                condition,
                indent,
                children,
            } => {
                let expr = self.expr(condition);
                self.out.push(&format!("{{ {expr} && ("));
                self.out.push_line(indent + 4, "");
                self.safe_children(children);
                self.out.push(")} ");
            }
            TemplateNode::ForOf {
                iterable,
                variable,
                index,
                indent,
                children,
            } => {
                let expr = self.expr(iterable);
                let params = match index {
                    Some(index) => format!("({variable}, {index})"),
                    None => variable.to_string(),
                };
                self.out.push(&format!("{{({expr}).map({params} => ("));
                self.out.push_line(indent + 4, "");
                self.safe_children(children);
                self.out.push("))} ");
            }
            // Only expressions can be embedded in TSX, so the switch runs
            // inside an immediately invoked arrow function.
            TemplateNode::Switch {
                discriminant,
                indent,
                children,
            } => {
                let expr = self.expr(discriminant);
                self.out.push(&format!("{{(()=>{{ switch ({expr}) {{"));
                self.children(children);
                self.out.push_line(*indent, "}})()} ");
            }
            TemplateNode::SwitchCase {
                value,
                indent,
                children,
            } => {
                let expr = self.expr(value);
                self.out.push(&format!("case {expr}: return ("));
                self.out.push_line(indent + 4, "");
                self.safe_children(children);
                self.out.push("); ");
            }
            TemplateNode::SwitchDefault { indent, children } => {
                self.out.push("default: return (");
                self.out.push_line(indent + 4, "");
                self.safe_children(children);
                self.out.push("); ");
            }
            TemplateNode::Text(text) => self.out.push(text),
            TemplateNode::TextWithInterpolation(text) => {
                let rendered = self.interpolate(text, "{", "}");
                self.out.push(&rendered);
            }
            TemplateNode::Container(children) => self.safe_children(children),
        }
    }

    fn children(&mut self, children: &[TemplateNode]) {
        for child in children {
            self.visit(child);
        }
    }

    /// Visits children inside `<>...</>` unless they are a single element.
    fn safe_children(&mut self, children: &[TemplateNode]) {
        let rooted = is_rooted(children);
        if !rooted {
            self.out.push("<>");
        }
        self.children(children);
        if !rooted {
            self.out.push("</>");
        }
    }

    fn visit_element(&mut self, el: &ElementNode) {
        self.out.push("<");
        self.out.push(&el.tag);
        for attr in &el.attributes {
            self.attribute(attr);
        }
        self.class_name(el.class_name.as_deref(), &el.conditional_classes);
        self.style(el.style.as_deref(), &el.style_bindings);
        if el.self_close {
            self.out.push(" /");
        }
        self.out.push(">");
        self.children(&el.children);
        if !el.self_close {
            self.out.push("</");
            self.out.push(&el.tag);
            self.out.push(">");
        }
    }

    fn attribute(&mut self, attr: &Attribute) {
        self.out.push(" ");
        let value = match &attr.value {
            AttributeValue::Event(handler) => {
                let name = react_event_name(&attr.name).unwrap_or(&attr.name);
                let params = if EVENT_ARGUMENT.is_match(handler) {
                    "($event)"
                } else {
                    "()"
                };
                self.out.push(&format!("{name}={{{params}=>{handler}}}"));
                return;
            }
            AttributeValue::String(text) => text.clone(),
            AttributeValue::Expression(expr) => self.expr(expr),
            AttributeValue::Interpolation(text) => {
                format!("`{}`", self.interpolate(text, "${", "}"))
            }
        };

        let name = dom_name(&attr.name);
        if name.eq_ignore_ascii_case("innerhtml") {
            self.out
                .push(&format!("dangerouslySetInnerHTML={{{{__html: {value} }}}}"));
            return;
        }
        let quoted = matches!(attr.value, AttributeValue::String(_))
            && !NON_STRING_ATTRIBUTES.contains(name.as_str());
        if quoted {
            self.out
                .push(&format!("{name}='{}'", value.replace('\'', "&apos;")));
        } else {
            self.out.push(&format!("{name}={{{value}}}"));
        }
    }

    fn class_name(&mut self, literal: Option<&str>, conditional: &[ConditionalClass]) {
        let literal = literal.unwrap_or("");
        if conditional.is_empty() {
            if !literal.is_empty() {
                self.out
                    .push(&format!(" className='{}'", literal.replace('\'', "&apos;")));
            }
            return;
        }
        let mut expression = format!("'{}'", escape_js_string(literal));
        for class in conditional {
            let condition = self.expr(&class.condition);
            expression.push_str(&format!(
                " + ({condition} ? ' {}' : '')",
                escape_js_string(&class.class_name)
            ));
        }
        self.out.push(&format!(" className={{{expression}}}"));
    }

    fn style(&mut self, literal: Option<&str>, bindings: &[StyleBinding]) {
        let mut declarations: Vec<(String, String)> = literal
            .map(parse_style_attribute)
            .unwrap_or_default();
        for binding in bindings {
            let expr = self.expr(&binding.expression);
            let value = match binding.unit.as_deref() {
                None | Some("px") => expr,
                Some(unit) => format!("`${{{expr}}}{unit}`"),
            };
            declarations.push((binding.property.to_string(), value));
        }
        if declarations.is_empty() {
            return;
        }
        let body = declarations
            .iter()
            .map(|(name, value)| format!("{}: {value}", kebab_to_camel(name)))
            .collect::<Vec<_>>()
            .join(", ");
        self.out.push(&format!(" style={{{{{body}}}}}"));
    }

    /// Renders literal fragments with each expression between `open` and `close`.
    fn interpolate(&mut self, text: &InterpolatedText, open: &str, close: &str) -> String {
        let mut out = String::new();
        for (fragment, expr) in text.strings.iter().zip(&text.expressions) {
            out.push_str(fragment);
            out.push_str(open);
            out.push_str(&self.expr(expr));
            out.push_str(close);
        }
        if let Some(last) = text.strings.last() {
            out.push_str(last);
        }
        out
    }

    /// Renders an expression, resolving pipes through the policy.
    fn expr(&mut self, expr: &TemplateExpr) -> String {
        match expr {
            TemplateExpr::Expression { source, .. } => source.clone(),
            TemplateExpr::Pipe {
                name,
                inner,
                args,
                span,
            } => {
                let inner = self.expr(inner);
                match self.policy.pipe(name) {
                    Some(handler) => {
                        self.ctx.add_imports(&handler.imports);
                        handler.apply(name, &inner, args)
                    }
                    None => {
                        let location = self.line_index.line_col(span.start);
                        self.ctx.report(
                            Diagnostic::new(
                                DiagnosticCode::UnknownPipe,
                                format!(
                                    "No configuration for pipe '{name}'. Using default transformation."
                                ),
                            )
                            .at(location),
                        );
                        default_pipe(name, &inner, args)
                    }
                }
            }
        }
    }
}

/// True when the nodes are a single element or container, ignoring whitespace.
fn is_rooted(nodes: &[TemplateNode]) -> bool {
    let mut significant = nodes.iter().filter(|node| !node.is_whitespace());
    match (significant.next(), significant.next()) {
        (Some(node), None) => matches!(node, TemplateNode::Element(_) | TemplateNode::Container(_)),
        _ => false,
    }
}

/// Converts an HTML attribute name to the React prop name.
fn dom_name(name: &str) -> String {
    if name.starts_with("data-") || name.starts_with("aria-") {
        return name.to_string();
    }
    // `xlink:href` → `xlinkHref`
    let camel = kebab_to_camel(&name.replace(':', "-"));
    let aliased = ATTRIBUTE_DOM_ALIASES
        .get(camel.as_str())
        .map_or(camel.as_str(), |alias| alias);
    CASE_MAP
        .get(aliased)
        .map_or_else(|| aliased.to_string(), |name| name.to_string())
}

/// Escapes text for a single-quoted JS string.
fn escape_js_string(text: &str) -> String {
    text.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Splits a literal `style` attribute into quoted declarations.
fn parse_style_attribute(css: &str) -> Vec<(String, String)> {
    CSS_COMMENT
        .replace_all(css, " ")
        .split(';')
        .map(str::trim)
        .filter(|declaration| !declaration.is_empty())
        .filter_map(|declaration| {
            let (name, value) = declaration.split_once(':')?;
            Some((name.trim().to_string(), format!("'{}'", value.trim())))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dom_name() {
        assert_eq!(dom_name("for"), "htmlFor");
        assert_eq!(dom_name("stroke-width"), "strokeWidth");
        assert_eq!(dom_name("colspan"), "colSpan");
        assert_eq!(dom_name("data-foo-bar"), "data-foo-bar");
        assert_eq!(dom_name("aria-label"), "aria-label");
        assert_eq!(dom_name("xlink:href"), "xlinkHref");
        assert_eq!(dom_name("id"), "id");
    }

    #[test]
    fn test_parse_style_attribute() {
        assert_eq!(
            parse_style_attribute("font-weight: bold; /* note */ background: url(a:b);"),
            vec![
                ("font-weight".to_string(), "'bold'".to_string()),
                ("background".to_string(), "'url(a:b)'".to_string()),
            ]
        );
        assert!(parse_style_attribute(" ; ").is_empty());
    }

    #[test]
    fn test_escape_js_string() {
        assert_eq!(escape_js_string("it's"), r"it\'s");
        assert_eq!(escape_js_string(r"a\b"), r"a\\b");
        assert_eq!(escape_js_string("plain"), "plain");
    }

    #[test]
    fn test_is_rooted() {
        let text = |s: &str| TemplateNode::Text(s.to_string());
        assert!(is_rooted(&[text("  "), TemplateNode::Container(Vec::new()), text("\n")]));
        assert!(!is_rooted(&[text("x")]));
        assert!(!is_rooted(&[]));
    }
}
