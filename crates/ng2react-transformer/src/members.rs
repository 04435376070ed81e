//! Sorting component class members into props, state and constants.

use swc_common::Spanned;
use swc_ecma_ast::{
    BlockStmt, Class, ClassMember, ClassMethod, ClassProp, Constructor, Decorator, Expr, Lit,
    MethodKind, Pat, PropName, Stmt, TsTypeAnn, UnaryOp,
};

use crate::diagnostic::{Diagnostic, DiagnosticCode};
use crate::metadata::{decorator_name, find_decorator};
use crate::script::Script;

/// Which member a declaration came from.
#[derive(Debug, Clone, Copy)]
pub enum MemberRef<'a> {
    Field(&'a ClassProp),
    Getter(&'a ClassMethod),
    Setter(&'a ClassMethod),
}

/// A prop, state field or constant.
#[derive(Debug, Clone)]
pub struct MemberDeclaration<'a> {
    pub name: String,
    /// The declared type, or one inferred from the initializer.
    pub ty: String,
    pub member: MemberRef<'a>,
    pub initializer: Option<&'a Expr>,
}

/// The members of one component class.
///
/// Every field of the class is in exactly one of `props`, `state` and
/// `constants`.
#[derive(Debug)]
pub struct ComponentMemberModel<'a> {
    pub props: Vec<MemberDeclaration<'a>>,
    pub state: Vec<MemberDeclaration<'a>>,
    pub constants: Vec<MemberDeclaration<'a>>,
    pub constructor: Option<&'a Constructor>,
    pub init_hook: Option<&'a ClassMethod>,
    pub destroy_hook: Option<&'a ClassMethod>,
    pub state_name: String,
    pub set_state_name: String,
    /// Dropped decorators and similar findings.
    pub diagnostics: Vec<Diagnostic>,
}

impl<'a> ComponentMemberModel<'a> {
    /// Classifies the members of `class`, in declaration order.
    pub fn classify(class: &'a Class, script: &Script<'_>) -> Self {
        let mut props = Vec::new();
        let mut state = Vec::new();
        let mut constants = Vec::new();
        let mut diagnostics = Vec::new();
        let mut names = Vec::new();

        for member in &class.body {
            match member {
                ClassMember::ClassProp(prop) => {
                    report_dropped_decorators(&prop.decorators, script, &mut diagnostics);
                    let name = prop_name_text(&prop.key, script);
                    names.push(name.clone());
                    let initializer = prop.value.as_deref();
                    let declared = prop.type_ann.as_deref().map(|ann| type_text(ann, script));

                    if find_decorator(&prop.decorators, "Input").is_some() {
                        props.push(MemberDeclaration {
                            ty: declared.unwrap_or_else(|| infer_type(initializer, script)),
                            name,
                            member: MemberRef::Field(prop),
                            initializer,
                        });
                    } else if find_decorator(&prop.decorators, "Output").is_some() {
                        props.push(MemberDeclaration {
                            name,
                            ty: output_type(initializer, script),
                            member: MemberRef::Field(prop),
                            initializer: None,
                        });
                    } else {
                        let declaration = MemberDeclaration {
                            ty: declared.unwrap_or_else(|| infer_type(initializer, script)),
                            name,
                            member: MemberRef::Field(prop),
                            initializer,
                        };
                        if prop.readonly {
                            constants.push(declaration);
                        } else {
                            state.push(declaration);
                        }
                    }
                }
                ClassMember::Method(method) => {
                    report_dropped_decorators(&method.function.decorators, script, &mut diagnostics);
                    let name = prop_name_text(&method.key, script);
                    names.push(name.clone());
                    let is_input = find_decorator(&method.function.decorators, "Input").is_some();
                    match method.kind {
                        MethodKind::Setter if is_input => props.push(MemberDeclaration {
                            name,
                            ty: setter_type(method, script),
                            member: MemberRef::Setter(method),
                            initializer: None,
                        }),
                        MethodKind::Getter if is_input => props.push(MemberDeclaration {
                            name,
                            ty: getter_type(method, script),
                            member: MemberRef::Getter(method),
                            initializer: None,
                        }),
                        MethodKind::Getter => constants.push(MemberDeclaration {
                            name,
                            ty: getter_type(method, script),
                            member: MemberRef::Getter(method),
                            initializer: None,
                        }),
                        MethodKind::Setter | MethodKind::Method => {}
                    }
                }
                _ => {}
            }
        }

        let state_name = safe_name("state", &names);
        let set_state_name = safe_name("setState", &names);
        Self {
            props,
            state,
            constants,
            constructor: class.body.iter().find_map(|member| match member {
                ClassMember::Constructor(ctor) => Some(ctor),
                _ => None,
            }),
            init_hook: method_named(class, "ngOnInit", script),
            destroy_hook: method_named(class, "ngOnDestroy", script),
            state_name,
            set_state_name,
            diagnostics,
        }
    }

    pub fn is_state(&self, name: &str) -> bool {
        self.state.iter().any(|decl| decl.name == name)
    }

    /// True if `prop` was classified as a prop or state field.
    pub fn is_prop_or_state(&self, prop: &ClassProp) -> bool {
        self.props.iter().chain(&self.state).any(|decl| match decl.member {
            MemberRef::Field(field) => std::ptr::eq(field, prop),
            _ => false,
        })
    }
}

/// Prefixes `$` until the name is not used by any member.
fn safe_name(name: &str, taken: &[String]) -> String {
    let mut candidate = name.to_string();
    while taken.iter().any(|member| *member == candidate) {
        candidate.insert(0, '$');
    }
    candidate
}

fn method_named<'a>(class: &'a Class, name: &str, script: &Script<'_>) -> Option<&'a ClassMethod> {
    class.body.iter().find_map(|member| match member {
        ClassMember::Method(method)
            if method.kind == MethodKind::Method && prop_name_text(&method.key, script) == name =>
        {
            Some(method)
        }
        _ => None,
    })
}

/// The member name as written; computed keys keep their brackets.
pub fn prop_name_text(key: &PropName, script: &Script<'_>) -> String {
    match key {
        PropName::Ident(ident) => ident.sym.to_string(),
        PropName::Str(value) => value.value.to_string_lossy().into_owned(),
        other => script.text(other.span()).to_string(),
    }
}

fn type_text(ann: &TsTypeAnn, script: &Script<'_>) -> String {
    script.text(ann.type_ann.span()).to_string()
}

/// `new EventEmitter<T>()` is typed as the callback `(x: T) => void`.
fn output_type(initializer: Option<&Expr>, script: &Script<'_>) -> String {
    if let Some(Expr::New(new)) = initializer {
        if let Some(arg) = new.type_args.as_ref().and_then(|args| args.params.first()) {
            return format!("(x: {}) => void", script.text(arg.span()));
        }
    }
    "unknown".to_string()
}

fn setter_type(method: &ClassMethod, script: &Script<'_>) -> String {
    match method.function.params.first().map(|param| &param.pat) {
        Some(Pat::Ident(binding)) => binding
            .type_ann
            .as_deref()
            .map_or_else(|| "any".to_string(), |ann| type_text(ann, script)),
        Some(Pat::Assign(assign)) => infer_type(Some(&*assign.right), script),
        _ => "any".to_string(),
    }
}

fn getter_type(method: &ClassMethod, script: &Script<'_>) -> String {
    if let Some(ann) = method.function.return_type.as_deref() {
        return type_text(ann, script);
    }
    infer_type(single_return(method.function.body.as_ref()), script)
}

/// The expression of a body whose first statement is `return <expr>;`.
pub fn single_return(body: Option<&BlockStmt>) -> Option<&Expr> {
    match body?.stmts.first()? {
        Stmt::Return(ret) => ret.arg.as_deref(),
        _ => None,
    }
}

/// Infers a type from an initializer without a type checker.
///
/// Literals widen to their primitive type, `new C<T>()` is `C<T>` and an array
/// of same-typed literals is `T[]`. Everything else is `any`.
pub fn infer_type(initializer: Option<&Expr>, script: &Script<'_>) -> String {
    let Some(expr) = initializer else {
        return "any".to_string();
    };
    literal_type(expr)
        .map(str::to_string)
        .unwrap_or_else(|| match expr {
            Expr::New(new) => {
                let end = new
                    .type_args
                    .as_ref()
                    .map_or(script.hi(new.callee.span()), |args| script.hi(args.span));
                script.slice(script.lo(new.callee.span()), end).to_string()
            }
            Expr::Array(array) => {
                let mut element_types = array
                    .elems
                    .iter()
                    .map(|elem| {
                        elem.as_ref()
                            .filter(|elem| elem.spread.is_none())
                            .and_then(|elem| literal_type(&elem.expr))
                    });
                match element_types.next() {
                    None => "any[]".to_string(),
                    Some(Some(first)) if element_types.all(|ty| ty == Some(first)) => {
                        format!("{first}[]")
                    }
                    Some(_) => "any[]".to_string(),
                }
            }
            Expr::Paren(paren) => infer_type(Some(&*paren.expr), script),
            _ => "any".to_string(),
        })
}

fn literal_type(expr: &Expr) -> Option<&'static str> {
    match expr {
        Expr::Lit(Lit::Num(_)) => Some("number"),
        Expr::Lit(Lit::Str(_)) | Expr::Tpl(_) => Some("string"),
        Expr::Lit(Lit::Bool(_)) => Some("boolean"),
        Expr::Unary(unary) if matches!(unary.op, UnaryOp::Minus | UnaryOp::Plus) => {
            matches!(&*unary.arg, Expr::Lit(Lit::Num(_))).then_some("number")
        }
        _ => None,
    }
}

/// Member decorators other than `@Input` and `@Output` have no equivalent.
fn report_dropped_decorators(
    decorators: &[Decorator],
    script: &Script<'_>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    for decorator in decorators {
        let name = decorator_name(decorator);
        if matches!(name, Some("Input" | "Output")) {
            continue;
        }
        let label = name.map_or_else(|| script.text(decorator.span).to_string(), |n| format!("@{n}"));
        diagnostics.push(
            Diagnostic::new(
                DiagnosticCode::DroppedDecorator,
                format!("Decorator {label} has no React equivalent and was dropped"),
            )
            .at(script.line_col(script.lo(decorator.span))),
        );
    }
}
