//! Reading the `@Component({...})` decorator argument.

use swc_ecma_ast::{
    ArrayLit, Callee, Class, Decorator, Expr, Lit, ObjectLit, Prop, PropName, PropOrSpread,
};

/// The parts of the component metadata the converter uses.
///
/// Only literal values are understood; anything computed reads as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentMetadata {
    pub selector: Option<String>,
    pub template: Option<String>,
    pub template_url: Option<String>,
    pub style_urls: Vec<String>,
}

/// Finds a decorator of the form `@Name(...)`.
pub fn find_decorator<'a>(decorators: &'a [Decorator], name: &str) -> Option<&'a Decorator> {
    decorators.iter().find(|decorator| decorator_name(decorator) == Some(name))
}

/// The callee name of a `@Name(...)` decorator.
pub fn decorator_name(decorator: &Decorator) -> Option<&str> {
    let Expr::Call(call) = &*decorator.expr else {
        return None;
    };
    match &call.callee {
        Callee::Expr(callee) => match &**callee {
            Expr::Ident(ident) => Some(ident.sym.as_ref()),
            _ => None,
        },
        _ => None,
    }
}

/// Returns the metadata of a class decorated with `@Component`, or `None` for
/// any other class.
pub fn component_metadata(class: &Class) -> Option<ComponentMetadata> {
    let decorator = find_decorator(&class.decorators, "Component")?;
    let Expr::Call(call) = &*decorator.expr else {
        return None;
    };
    let mut metadata = ComponentMetadata::default();
    if let Some(Expr::Object(object)) = call.args.first().map(|arg| &*arg.expr) {
        read_object(object, &mut metadata);
    }
    Some(metadata)
}

fn read_object(object: &ObjectLit, metadata: &mut ComponentMetadata) {
    for prop in &object.props {
        let PropOrSpread::Prop(prop) = prop else {
            continue;
        };
        let Prop::KeyValue(key_value) = &**prop else {
            continue;
        };
        let Some(key) = prop_name(&key_value.key) else {
            continue;
        };
        match key.as_str() {
            "selector" => metadata.selector = string_value(&key_value.value),
            "template" => metadata.template = string_value(&key_value.value),
            "templateUrl" => metadata.template_url = string_value(&key_value.value),
            "styleUrls" => {
                if let Expr::Array(array) = &*key_value.value {
                    metadata.style_urls = string_array(array);
                }
            }
            "styleUrl" => metadata.style_urls.extend(string_value(&key_value.value)),
            _ => {}
        }
    }
}

fn prop_name(name: &PropName) -> Option<String> {
    match name {
        PropName::Ident(ident) => Some(ident.sym.to_string()),
        PropName::Str(value) => Some(value.value.to_string_lossy().into_owned()),
        _ => None,
    }
}

/// A string literal or a template literal without substitutions.
fn string_value(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Lit(Lit::Str(value)) => Some(value.value.to_string_lossy().into_owned()),
        Expr::Tpl(tpl) if tpl.exprs.is_empty() => tpl.quasis.first().map(|quasi| quasi.raw.to_string()),
        Expr::Paren(paren) => string_value(&paren.expr),
        _ => None,
    }
}

fn string_array(array: &ArrayLit) -> Vec<String> {
    array
        .elems
        .iter()
        .flatten()
        .filter(|elem| elem.spread.is_none())
        .filter_map(|elem| string_value(&elem.expr))
        .collect()
}
