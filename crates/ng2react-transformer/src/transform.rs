//! File-level transformation: finding component classes and splicing their
//! conversions into the rest of the module.

use camino::Utf8Path;
use swc_common::Spanned;
use swc_ecma_ast::{Class, Decl, DefaultDecl, ModuleDecl, ModuleItem, Stmt};

use crate::component::{convert_component, ComponentClass, Environment};
use crate::context::{ComponentRecord, ComponentRegistry, FileContext};
use crate::diagnostic::Diagnostic;
use crate::error::{TransformError, TransformResult};
use crate::imports::import_header;
use crate::metadata::component_metadata;
use crate::policy::PolicyRegistry;
use crate::provider::TemplateProvider;
use crate::script::Script;

/// Inputs for transforming one file.
#[derive(Clone, Copy)]
pub struct TransformOptions<'a> {
    /// The file being transformed; templates and imports resolve against it.
    pub file: &'a Utf8Path,
    /// Root that policy import paths are relative to.
    pub src_root: &'a Utf8Path,
    pub registry: &'a ComponentRegistry,
    pub policy: &'a PolicyRegistry,
    pub provider: &'a dyn TemplateProvider,
}

/// The result of transforming one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOutput {
    /// The converted TSX source.
    pub code: String,
    /// Recovered problems, in the order they were found.
    pub diagnostics: Vec<Diagnostic>,
}

/// A top-level module item the transformation touches.
enum Edit<'a> {
    Component {
        start: usize,
        end: usize,
        component: ComponentClass<'a>,
    },
    DropImport {
        start: usize,
        end: usize,
    },
}

impl Edit<'_> {
    fn range(&self) -> (usize, usize) {
        match self {
            Edit::Component { start, end, .. } | Edit::DropImport { start, end } => (*start, *end),
        }
    }
}

/// Scans a TypeScript file for `@Component` classes.
///
/// Fails if a component has no selector.
pub fn find_components(source: &str, file: &Utf8Path) -> TransformResult<Vec<ComponentRecord>> {
    let script = Script::parse(source, file.as_str())?;
    collect_edits(&script)?
        .into_iter()
        .filter_map(|edit| match edit {
            Edit::Component { component, .. } => Some(component),
            Edit::DropImport { .. } => None,
        })
        .map(|component| {
            Ok(ComponentRecord {
                selector: component.selector()?.to_string(),
                exported_name: component.name.to_string(),
                origin_file: file.to_owned(),
            })
        })
        .collect()
}

/// Converts every component class in a file.
///
/// A file without components is returned unchanged. Otherwise `@angular/*`
/// imports are removed, each component class is replaced by a function
/// component and the import header is prepended.
pub fn transform_component_file(
    source: &str,
    options: &TransformOptions<'_>,
) -> TransformResult<TransformOutput> {
    let script = Script::parse(source, options.file.as_str())?;
    let edits = collect_edits(&script)?;
    if !edits.iter().any(|edit| matches!(edit, Edit::Component { .. })) {
        return Ok(TransformOutput {
            code: source.to_string(),
            diagnostics: Vec::new(),
        });
    }

    let env = Environment {
        registry: options.registry,
        policy: options.policy,
        provider: options.provider,
    };
    let mut ctx = FileContext::new(options.file);
    let mut body = String::with_capacity(source.len());
    let mut cursor = 0;
    for edit in &edits {
        let (start, end) = edit.range();
        body.push_str(script.slice(cursor, start));
        cursor = end;
        match edit {
            Edit::Component { component, .. } => {
                body.push_str(&convert_component(&script, component, env, &mut ctx)?);
            }
            Edit::DropImport { .. } => {
                if script.slice(cursor, cursor + 1) == "\n" {
                    cursor += 1;
                }
            }
        }
    }
    body.push_str(script.slice(cursor, source.len()));

    let mut code = import_header(&ctx, options.src_root);
    code.push_str(&body);
    Ok(TransformOutput {
        code,
        diagnostics: ctx.diagnostics,
    })
}

/// Top-level component classes and Angular imports, in source order.
///
/// Classes nested in functions or namespaces are not components.
fn collect_edits<'a>(script: &'a Script<'_>) -> TransformResult<Vec<Edit<'a>>> {
    let mut edits = Vec::new();
    for item in &script.module.body {
        let item_start = script.lo(item.span());
        let item_end = script.hi(item.span());
        let (name_end, name, class, modifiers) = match item {
            ModuleItem::Stmt(Stmt::Decl(Decl::Class(decl))) => (
                Some(script.hi(decl.ident.span)),
                Some(decl.ident.sym.as_ref()),
                &*decl.class,
                "",
            ),
            ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export)) => match &export.decl {
                Decl::Class(decl) => (
                    Some(script.hi(decl.ident.span)),
                    Some(decl.ident.sym.as_ref()),
                    &*decl.class,
                    "export",
                ),
                _ => continue,
            },
            ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultDecl(export)) => match &export.decl {
                DefaultDecl::Class(expr) => (
                    expr.ident.as_ref().map(|ident| script.hi(ident.span)),
                    expr.ident.as_ref().map(|ident| ident.sym.as_ref()),
                    &*expr.class,
                    "export default",
                ),
                _ => continue,
            },
            ModuleItem::ModuleDecl(ModuleDecl::Import(import)) => {
                if import.src.value.to_string_lossy().starts_with("@angular") {
                    edits.push(Edit::DropImport {
                        start: item_start,
                        end: item_end,
                    });
                }
                continue;
            }
            _ => continue,
        };

        let Some(metadata) = component_metadata(class) else {
            continue;
        };
        let Some(name) = name else {
            return Err(TransformError::Configuration(
                "Component classes must be named".to_string(),
            ));
        };
        let start = class
            .decorators
            .iter()
            .map(|decorator| script.lo(decorator.span))
            .chain([item_start, script.lo(class.span)])
            .min()
            .unwrap_or(item_start);
        let end = item_end.max(script.hi(class.span));
        edits.push(Edit::Component {
            start,
            end,
            component: ComponentClass {
                name,
                class,
                modifiers,
                metadata,
                body_start: body_start(class, name_end, script),
            },
        });
    }
    Ok(edits)
}

/// The offset just past the `{` that opens the class body.
fn body_start(class: &Class, name_end: Option<usize>, script: &Script<'_>) -> usize {
    let header_end = [
        name_end,
        class.decorators.iter().map(|d| script.hi(d.span)).max(),
        class.type_params.as_ref().map(|params| script.hi(params.span)),
        class.super_class.as_ref().map(|expr| script.hi(expr.span())),
        class.super_type_params.as_ref().map(|params| script.hi(params.span)),
        class.implements.iter().map(|i| script.hi(i.span)).max(),
    ]
    .into_iter()
    .flatten()
    .max()
    .unwrap_or_else(|| script.lo(class.span));

    let rest = script.slice(header_end, script.hi(class.span));
    rest.find('{')
        .map_or(header_end, |offset| header_end + offset + 1)
}
