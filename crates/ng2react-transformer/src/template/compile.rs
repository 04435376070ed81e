//! Builds the intermediate tree from the bound template.

use ng_template_parser::{
    split_ns_name, BindingKind, BindingValue, BoundAttribute, Element, Node, Span, Template,
    TemplateAttr,
};
use smol_str::SmolStr;
use source_text::LineIndex;

use crate::context::{ComponentRegistry, FileContext};
use crate::diagnostic::{Diagnostic, DiagnosticCode};
use crate::error::{TransformError, TransformResult};
use crate::mappings::is_void_element;
use crate::template::intermediate::{
    Attribute, AttributeValue, ConditionalClass, ElementNode, InterpolatedText, StyleBinding,
    TemplateNode,
};

/// Walks a bound template and produces its intermediate tree.
pub struct TemplateCompiler<'a> {
    source: &'a str,
    line_index: LineIndex,
    registry: &'a ComponentRegistry,
    ctx: &'a mut FileContext,
}

impl<'a> TemplateCompiler<'a> {
    pub fn new(source: &'a str, registry: &'a ComponentRegistry, ctx: &'a mut FileContext) -> Self {
        Self {
            source,
            line_index: LineIndex::new(source),
            registry,
            ctx,
        }
    }

    /// Compiles the top-level nodes into a root container.
    pub fn compile(mut self, nodes: &[Node]) -> TransformResult<TemplateNode> {
        Ok(TemplateNode::Container(self.visit_nodes(nodes)?))
    }

    fn visit_nodes(&mut self, nodes: &[Node]) -> TransformResult<Vec<TemplateNode>> {
        nodes.iter().map(|node| self.visit(node)).collect()
    }

    fn visit(&mut self, node: &Node) -> TransformResult<TemplateNode> {
        match node {
            Node::Element(el) => self.visit_element(el),
            Node::Template(template) => self.visit_template(template),
            Node::Text(text) => Ok(TemplateNode::Text(text.value.clone())),
            Node::BoundText(text) => Ok(TemplateNode::TextWithInterpolation(
                InterpolatedText::from(&text.value),
            )),
            Node::Content(content) => Err(self.not_supported("<ng-content>", content.span)),
            Node::Icu(icu) => Err(self.not_supported(&format!("ICU message '{}'", icu.kind), icu.span)),
        }
    }

    fn visit_element(&mut self, el: &Element) -> TransformResult<TemplateNode> {
        let (_, local) = split_ns_name(&el.name);

        if local == "ng-container" {
            return Ok(TemplateNode::Container(self.visit_element_children(el)?));
        }

        if let Some(reference) = el.references.first() {
            return Err(self.not_supported(
                &format!("element reference #{}", reference.name),
                reference.span,
            ));
        }

        let mut tag = SmolStr::new(local);
        let mut is_component = false;
        if let Some(record) = self.registry.get(local) {
            is_component = true;
            tag = SmolStr::new(&record.exported_name);
            self.ctx.reference_component(record);
        }

        let mut attributes = Vec::new();
        let mut conditional_classes = Vec::new();
        let mut style_bindings = Vec::new();

        for input in &el.inputs {
            match input.kind {
                BindingKind::Class => conditional_classes.push(ConditionalClass {
                    class_name: input.name.clone(),
                    condition: self.binding_expr(input)?,
                }),
                BindingKind::Style => style_bindings.push(StyleBinding {
                    property: input.name.clone(),
                    expression: self.binding_expr(input)?,
                    unit: input.unit.clone(),
                }),
                BindingKind::Property if input.name.contains('.') => {
                    return Err(self.binding_type(input));
                }
                BindingKind::Property if input.name == "ngSwitch" => {}
                BindingKind::Property | BindingKind::Attribute => {
                    let value = match &input.value {
                        BindingValue::Expr(expr) => AttributeValue::Expression(expr.clone()),
                        BindingValue::Interpolation(interpolation) => {
                            AttributeValue::Interpolation(InterpolatedText::from(interpolation))
                        }
                    };
                    attributes.push(Attribute {
                        name: input.name.clone(),
                        value,
                    });
                }
                BindingKind::Animation => return Err(self.binding_type(input)),
            }
        }

        for output in &el.outputs {
            if let Some(target) = &output.target {
                return Err(self.not_supported(
                    &format!("global event listener ({target}:{})", output.name),
                    output.span,
                ));
            }
            attributes.push(Attribute {
                name: output.name.clone(),
                value: AttributeValue::Event(output.handler.clone()),
            });
        }

        let mut class_name = None;
        let mut style = None;
        for attr in &el.attributes {
            match attr.name.as_str() {
                "class" => class_name = Some(attr.value.clone()),
                "style" => style = Some(attr.value.clone()),
                _ => attributes.push(Attribute {
                    name: attr.name.clone(),
                    value: AttributeValue::String(attr.value.clone()),
                }),
            }
        }

        let self_closed_in_source = el.end_span == Some(el.start_span);
        let implicitly_void = el.end_span.is_none() && is_void_element(&tag);
        let self_close = is_component || self_closed_in_source || implicitly_void;

        let children = self.visit_element_children(el)?;
        Ok(TemplateNode::Element(ElementNode {
            tag,
            attributes,
            class_name,
            conditional_classes,
            style,
            style_bindings,
            self_close,
            is_component,
            children,
        }))
    }

    /// Visits children, wrapping them in a switch for `[ngSwitch]`.
    fn visit_element_children(&mut self, el: &Element) -> TransformResult<Vec<TemplateNode>> {
        let children = self.visit_nodes(&el.children)?;
        let Some(switch) = el.inputs.iter().find(|input| input.name == "ngSwitch") else {
            return Ok(children);
        };
        let discriminant = self.binding_expr(switch)?;
        for child in &children {
            let valid = matches!(
                child,
                TemplateNode::SwitchCase { .. } | TemplateNode::SwitchDefault { .. }
            ) || child.is_whitespace();
            if !valid {
                return Err(self.not_supported(
                    "child of [ngSwitch] that is not *ngSwitchCase or *ngSwitchDefault",
                    el.start_span,
                ));
            }
        }
        Ok(vec![TemplateNode::Switch {
            discriminant,
            indent: self.indent(el.start_span),
            children,
        }])
    }

    /// Templates carry the structural directives.
    ///
    /// A literal `<ng-template>` binds its directive through inputs
    /// (`[ngIf]`), a `*directive` through template attributes.
    fn visit_template(&mut self, template: &Template) -> TransformResult<TemplateNode> {
        let is_ng_template = split_ns_name(&template.tag_name).1 == "ng-template";
        let bound: Vec<&BoundAttribute> = if is_ng_template {
            template.inputs.iter().collect()
        } else {
            template
                .template_attrs
                .iter()
                .filter_map(|attr| match attr {
                    TemplateAttr::Bound(bound) => Some(bound),
                    TemplateAttr::Text(_) => None,
                })
                .collect()
        };
        let indent = self.indent(template.start_span);

        let is_switch_default = template
            .template_attrs
            .iter()
            .any(|attr| attr.name() == "ngSwitchDefault")
            || (is_ng_template
                && template
                    .attributes
                    .iter()
                    .any(|attr| attr.name == "ngSwitchDefault"));
        if is_switch_default {
            return Ok(TemplateNode::SwitchDefault {
                indent,
                children: self.visit_nodes(&template.children)?,
            });
        }

        if template.template_attrs.is_empty() && template.inputs.is_empty() {
            if is_ng_template {
                return Ok(TemplateNode::Text(String::new()));
            }
            return Ok(TemplateNode::Container(self.visit_nodes(&template.children)?));
        }

        let Some(directive) = bound.first() else {
            return Ok(TemplateNode::Container(self.visit_nodes(&template.children)?));
        };
        let value = self.binding_expr(directive)?;

        match directive.name.as_str() {
            "ngIf" => {
                if let Some(else_branch) = bound.iter().find(|b| b.name == "ngIfElse") {
                    self.warn(
                        DiagnosticCode::IgnoredNgIfElse,
                        "The else template of *ngIf is not converted",
                        else_branch.span,
                    );
                }
                self.check_variables(template, "*ngIf")?;
                Ok(TemplateNode::Conditional {
                    condition: value,
                    indent,
                    children: self.visit_nodes(&template.children)?,
                })
            }
            "ngSwitchCase" => {
                self.check_variables(template, "*ngSwitchCase")?;
                Ok(TemplateNode::SwitchCase {
                    value,
                    indent,
                    children: self.visit_nodes(&template.children)?,
                })
            }
            "ngForOf" => {
                if let Some(track_by) = bound.iter().find(|b| b.name == "ngForTrackBy") {
                    self.warn(
                        DiagnosticCode::IgnoredTrackBy,
                        "trackBy has no equivalent and is ignored",
                        track_by.span,
                    );
                }
                let (variable, index) = self.loop_variables(template)?;
                Ok(TemplateNode::ForOf {
                    iterable: value,
                    variable,
                    index,
                    indent,
                    children: self.visit_nodes(&template.children)?,
                })
            }
            other => Err(self.not_supported(
                &format!("structural directive '{other}'"),
                directive.span,
            )),
        }
    }

    /// Picks the loop variable and optional `index` alias of an `*ngFor`.
    fn loop_variables(&self, template: &Template) -> TransformResult<(SmolStr, Option<SmolStr>)> {
        let mut variable = None;
        let mut index = None;
        for var in &template.variables {
            match var.value.as_str() {
                "$implicit" if variable.is_none() => variable = Some(var.name.clone()),
                "index" if index.is_none() => index = Some(var.name.clone()),
                other => {
                    return Err(self.not_supported(
                        &format!("*ngFor variable '{}' bound to '{other}'", var.name),
                        var.span,
                    ))
                }
            }
        }
        match variable {
            Some(variable) => Ok((variable, index)),
            None => Err(self.not_supported("*ngFor without a loop variable", template.start_span)),
        }
    }

    fn check_variables(&self, template: &Template, directive: &str) -> TransformResult<()> {
        match template.variables.first() {
            Some(var) => Err(self.not_supported(
                &format!("template variable '{}' on {directive}", var.name),
                var.span,
            )),
            None => Ok(()),
        }
    }

    fn binding_expr(&self, input: &BoundAttribute) -> TransformResult<ng_template_parser::Expr> {
        match &input.value {
            BindingValue::Expr(expr) => Ok(expr.clone()),
            BindingValue::Interpolation(_) => Err(TransformError::BindingType(format!(
                "interpolation in [{}] ({})",
                input.name,
                self.position(input.span)
            ))),
        }
    }

    /// The character column of a span's start.
    fn indent(&self, span: Span) -> usize {
        self.line_index.char_column(self.source, span.start)
    }

    fn position(&self, span: Span) -> String {
        let (line, column) = self.line_index.line_col(span.start).one_based();
        format!("line {line}, column {column}")
    }

    fn not_supported(&self, what: &str, span: Span) -> TransformError {
        TransformError::NotSupported(format!("{what} ({})", self.position(span)))
    }

    fn binding_type(&self, input: &BoundAttribute) -> TransformError {
        let kind = match input.kind {
            BindingKind::Animation => "animation",
            BindingKind::Attribute => "attribute",
            BindingKind::Class => "class",
            BindingKind::Style => "style",
            BindingKind::Property => "property",
        };
        TransformError::BindingType(format!(
            "{kind} binding [{}] ({})",
            input.name,
            self.position(input.span)
        ))
    }

    fn warn(&mut self, code: DiagnosticCode, message: &str, span: Span) {
        let location = self.line_index.line_col(span.start);
        self.ctx.report(Diagnostic::new(code, message).at(location));
    }
}
