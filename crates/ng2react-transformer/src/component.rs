//! Turning one `@Component` class into a React function component.

use source_text::TextBuffer;
use swc_common::Spanned;
use swc_ecma_ast::{
    BlockStmt, Class, ClassMember, ClassMethod, ClassProp, MethodKind,
    ParamOrTsParamProp, Pat, TsParamPropParam,
};

use crate::context::{ComponentRegistry, FileContext};
use crate::error::{TransformError, TransformResult};
use crate::members::{prop_name_text, single_return, ComponentMemberModel};
use crate::metadata::{find_decorator, ComponentMetadata};
use crate::policy::{default_injection, PolicyRegistry};
use crate::provider::{resolve, TemplateProvider};
use crate::rewriter::Rewriter;
use crate::script::Script;
use crate::template::transform_template;

/// Lists shorter than this stay on one line.
const INLINE_LIMIT: usize = 20;

/// Read-only inputs shared by every component of a project.
#[derive(Clone, Copy)]
pub struct Environment<'a> {
    pub registry: &'a ComponentRegistry,
    pub policy: &'a PolicyRegistry,
    pub provider: &'a dyn TemplateProvider,
}

/// A component class found at the top level of a file.
pub struct ComponentClass<'a> {
    pub name: &'a str,
    pub class: &'a Class,
    /// `export`, `export default` or empty.
    pub modifiers: &'static str,
    pub metadata: ComponentMetadata,
    /// Where the first member may start, just past the body's `{`.
    pub body_start: usize,
}

impl ComponentClass<'_> {
    /// Fails unless the metadata names a selector.
    pub fn selector(&self) -> TransformResult<&str> {
        self.metadata.selector.as_deref().ok_or_else(|| {
            TransformError::Configuration(format!(
                "Component {} has no selector in its @Component decorator",
                self.name
            ))
        })
    }
}

/// Converts a component class into the source of a function component.
pub fn convert_component(
    script: &Script<'_>,
    component: &ComponentClass<'_>,
    env: Environment<'_>,
    ctx: &mut FileContext,
) -> TransformResult<String> {
    component.selector()?;
    check_members(component)?;

    for url in &component.metadata.style_urls {
        ctx.reference_style(url.as_str());
    }
    let members = ComponentMemberModel::classify(component.class, script);
    for diagnostic in &members.diagnostics {
        ctx.report(diagnostic.clone());
    }

    let converter = Converter {
        script,
        members: &members,
    };
    let mut out = TextBuffer::new();

    let modifiers = if component.modifiers.is_empty() {
        String::new()
    } else {
        format!("{} ", component.modifiers)
    };
    out.push(&format!(
        "\n\n{modifiers}function {}({}) {{\n",
        component.name,
        converter.props_parameter()
    ));

    if let Some(ctor) = members.constructor {
        for param in &ctor.params {
            out.push("\n\t");
            out.push(&converter.injection(param, env.policy, ctx)?);
        }
    }

    if members.state.is_empty() {
        converter.mount_effects(&mut out);
    } else {
        converter.state_initializer(&mut out);
    }

    let mut prev_end = component.body_start;
    for member in &component.class.body {
        let start = member_start(member, script);
        let trivia = script.slice(prev_end, start);
        prev_end = script.hi(member.span());
        if let Some(code) = converter.member(member) {
            out.push(trivia);
            out.push(&code);
        }
    }

    let tsx = template_tsx(component, env, ctx)?;
    out.push(&format!("\n\n\treturn ({tsx});\n}}\n"));
    Ok(out.into_string())
}

/// Members with no function component counterpart fail the whole class.
fn check_members(component: &ComponentClass<'_>) -> TransformResult<()> {
    for member in &component.class.body {
        let kind = match member {
            ClassMember::PrivateMethod(_) => "private method",
            ClassMember::PrivateProp(_) => "private field",
            ClassMember::TsIndexSignature(_) => "index signature",
            ClassMember::StaticBlock(_) => "static block",
            ClassMember::AutoAccessor(_) => "auto-accessor",
            ClassMember::Constructor(_)
            | ClassMember::Method(_)
            | ClassMember::ClassProp(_)
            | ClassMember::Empty(_) => continue,
        };
        return Err(TransformError::NotSupported(format!(
            "Member not supported: {kind} in {}",
            component.name
        )));
    }
    Ok(())
}

/// Where the member's leading trivia ends, before any decorator.
fn member_start(member: &ClassMember, script: &Script<'_>) -> usize {
    let decorators = match member {
        ClassMember::ClassProp(prop) => prop.decorators.as_slice(),
        ClassMember::Method(method) => method.function.decorators.as_slice(),
        _ => &[],
    };
    decorators
        .iter()
        .map(|decorator| script.lo(decorator.span))
        .chain([script.lo(member.span())])
        .min()
        .unwrap_or_default()
}

fn template_tsx(
    component: &ComponentClass<'_>,
    env: Environment<'_>,
    ctx: &mut FileContext,
) -> TransformResult<String> {
    let metadata = &component.metadata;
    if let Some(url) = &metadata.template_url {
        let file = ctx.file.clone();
        let path = resolve(&file, url);
        let source = env
            .provider
            .load(&file, url)
            .map_err(|source| TransformError::TemplateLoad {
                path: path.to_string(),
                source,
            })?;
        return transform_template(&source, path.as_str(), env.registry, env.policy, ctx);
    }
    if let Some(template) = &metadata.template {
        let file = ctx.file.to_string();
        return transform_template(template, &file, env.registry, env.policy, ctx);
    }
    Ok(String::new())
}

/// Joins items inline when short, one per line otherwise.
fn multiline_if_long(items: &[String], sep: &str, line_break: &str) -> String {
    let single_line = items.join(&format!("{sep} "));
    if single_line.len() < INLINE_LIMIT {
        return format!(" {single_line} ");
    }
    let mut out = String::from(line_break);
    out.push_str(&items.join(&format!("{sep}{line_break}")));
    out.push_str(line_break);
    out
}

fn non_empty(body: Option<&BlockStmt>) -> Option<&BlockStmt> {
    body.filter(|block| !block.stmts.is_empty())
}

struct Converter<'c, 's> {
    script: &'c Script<'s>,
    members: &'c ComponentMemberModel<'c>,
}

impl Converter<'_, '_> {
    fn rewriter(&self) -> Rewriter<'_, '_> {
        Rewriter::new(self.script, self.members)
    }

    /// `{a = 1, b}: {a?: number; b: T}`, or nothing without props.
    fn props_parameter(&self) -> String {
        let props = &self.members.props;
        if props.is_empty() {
            return String::new();
        }
        let fields: Vec<String> = props
            .iter()
            .map(|prop| match prop.initializer {
                Some(init) => format!("{} = {}", prop.name, self.script.text(init.span())),
                None => prop.name.clone(),
            })
            .collect();
        let types: Vec<String> = props
            .iter()
            .map(|prop| {
                let optional = if prop.initializer.is_some() { "?" } else { "" };
                format!("{}{optional}: {}", prop.name, prop.ty)
            })
            .collect();
        format!(
            "{{{}}}: {{{}}}",
            multiline_if_long(&fields, ",", "\n\t\t"),
            multiline_if_long(&types, ";", "\n\t\t")
        )
    }

    fn injection(
        &self,
        param: &ParamOrTsParamProp,
        policy: &PolicyRegistry,
        ctx: &mut FileContext,
    ) -> TransformResult<String> {
        let binding = match param {
            ParamOrTsParamProp::TsParamProp(prop) => match &prop.param {
                TsParamPropParam::Ident(binding) => Some(binding),
                TsParamPropParam::Assign(_) => None,
            },
            ParamOrTsParamProp::Param(param) => match &param.pat {
                Pat::Ident(binding) => Some(binding),
                _ => None,
            },
        };
        let Some(binding) = binding else {
            return Err(TransformError::Configuration(format!(
                "Unsupported constructor parameter: {}",
                self.script.text(param.span())
            )));
        };
        let name = binding.id.sym.as_ref();
        let Some(ann) = binding.type_ann.as_deref() else {
            return Err(TransformError::Configuration(format!(
                "Constructor parameter {name} has no type to inject"
            )));
        };
        let ty = self.script.text(ann.type_ann.span());
        Ok(match policy.injection(ty) {
            Some(handler) => {
                ctx.add_imports(&handler.imports);
                handler.apply(name, ty)
            }
            None => default_injection(name, ty),
        })
    }

    /// The `useState` initializer and the destructuring of its fields.
    fn state_initializer(&self, out: &mut TextBuffer) {
        let members = self.members;
        let declarations: Vec<String> = members
            .state
            .iter()
            .map(|decl| match decl.initializer {
                Some(init) => format!("{}: {}", decl.name, self.script.text(init.span())),
                None => format!("{}: undefined as {}", decl.name, decl.ty),
            })
            .collect();

        out.push(&format!(
            "\n\tconst [{}, {}] = React.useState(()=>{{",
            members.state_name, members.set_state_name
        ));
        out.push(&format!(
            "\n\t\tconst initialState = {{{}}};",
            multiline_if_long(&declarations, ",", "\n\t\t\t")
        ));
        if let Some(body) = non_empty(members.constructor.and_then(|ctor| ctor.body.as_ref())) {
            out.push("\n\t\t/* inlined constructor body */\n\t");
            out.push(&self.rewriter().in_initializer().rewrite_node(body));
        }
        if let Some(body) = non_empty(members.init_hook.and_then(|hook| hook.function.body.as_ref())) {
            out.push("\n\t\t/* inlined ngOnInit */\n\t");
            out.push(&self.rewriter().in_initializer().rewrite_node(body));
        }
        out.push("\n\t\treturn initialState;\n\t});\n\n");

        let names: Vec<&str> = members.state.iter().map(|decl| decl.name.as_str()).collect();
        out.push(&format!(
            "\tconst {{ {} }} = {};",
            names.join(", "),
            members.state_name
        ));
    }

    /// Without state there is no initializer to inline the constructor and
    /// `ngOnInit` into, so they run once on mount.
    fn mount_effects(&self, out: &mut TextBuffer) {
        let members = self.members;
        if let Some(body) = non_empty(members.constructor.and_then(|ctor| ctor.body.as_ref())) {
            out.push("\n\t/* inlined constructor body */\n\tReact.useEffect(() => ");
            out.push(&self.rewriter().rewrite_node(body));
            out.push(", []);");
        }
        if let Some(body) = non_empty(members.init_hook.and_then(|hook| hook.function.body.as_ref())) {
            out.push("\n\t/* inlined ngOnInit */\n\tReact.useEffect(() => ");
            out.push(&self.rewriter().rewrite_node(body));
            out.push(", []);");
        }
    }

    /// The code for one member, or `None` when it is emitted elsewhere.
    fn member(&self, member: &ClassMember) -> Option<String> {
        match member {
            ClassMember::Method(method) => match method.kind {
                MethodKind::Method => self.method(method),
                MethodKind::Getter => self.getter(method),
                MethodKind::Setter => Some(self.setter(method)),
            },
            ClassMember::ClassProp(prop) => self.field(prop),
            _ => None,
        }
    }

    fn method(&self, method: &ClassMethod) -> Option<String> {
        let name = prop_name_text(&method.key, self.script);
        match name.as_str() {
            "ngOnInit" => None,
            "ngOnDestroy" => {
                let body = method.function.body.as_ref()?;
                Some(format!(
                    "React.useEffect(() => () => {}, []);",
                    self.rewriter().rewrite_node(body)
                ))
            }
            _ => {
                let function = &method.function;
                let prefix = if function.is_async { "async " } else { "" };
                let star = if function.is_generator { "*" } else { "" };
                Some(format!(
                    "{prefix}function{star} {name}{}",
                    self.rest_of(method)
                ))
            }
        }
    }

    /// A getter becomes a constant: the returned expression itself, or an
    /// immediately invoked closure for longer bodies.
    fn getter(&self, method: &ClassMethod) -> Option<String> {
        if find_decorator(&method.function.decorators, "Input").is_some() {
            return None;
        }
        let name = prop_name_text(&method.key, self.script);
        let body = method.function.body.as_ref()?;
        if let Some(expr) = single_return(Some(body)) {
            return Some(format!(
                "const {name} = {};",
                self.rewriter().rewrite_node(expr)
            ));
        }
        Some(format!(
            "const {name} /* getter transformed to immediately invoked function */ = (() => {})();",
            self.rewriter().rewrite_node(body)
        ))
    }

    fn setter(&self, method: &ClassMethod) -> String {
        let name = prop_name_text(&method.key, self.script);
        if find_decorator(&method.function.decorators, "Input").is_none() {
            return format!("function set_{name}{}", self.rest_of(method));
        }
        let param = match method.function.params.first().map(|param| &param.pat) {
            Some(Pat::Ident(binding)) => match binding.type_ann.as_deref() {
                Some(ann) => format!("{}: {}", binding.id.sym, self.script.text(ann.type_ann.span())),
                None => binding.id.sym.to_string(),
            },
            Some(pat) => self.script.text(pat.span()).to_string(),
            None => String::new(),
        };
        let body = method
            .function
            .body
            .as_ref()
            .map(|body| self.rewriter().rewrite_node(body))
            .unwrap_or_else(|| "{}".to_string());
        format!(
            "\n\t/* inlined setter for {name} */ (({param}) => {body})({name});\n\t/* inlined setter end */"
        )
    }

    /// Fields that are neither props nor state are constants.
    fn field(&self, prop: &ClassProp) -> Option<String> {
        if self.members.is_prop_or_state(prop) {
            return None;
        }
        let start = self.script.lo(prop.key.span());
        let end = self.script.hi(prop.span);
        let mut code = format!("const {}", self.rewriter().rewrite(prop, start, end));
        if !code.trim_end().ends_with(';') {
            code.push(';');
        }
        Some(code)
    }

    /// Parameters, return type and body of a method, rewritten.
    fn rest_of(&self, method: &ClassMethod) -> String {
        let start = self.script.hi(method.key.span());
        let end = self.script.hi(method.span);
        self.rewriter().rewrite(&*method.function, start, end)
    }
}
