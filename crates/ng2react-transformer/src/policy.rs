//! Pluggable handlers for pipes and constructor injections.
//!
//! A pipe or injection type without a handler falls back to a default
//! rendering: a plain function call for pipes and a context lookup for
//! injections. Handlers replace that rendering with a template string and can
//! request imports, which are added to the file being transformed.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use rustc_hash::FxHashMap;

static PIPE_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$(inner|args)").expect("valid regex"));
static INJECTION_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$(name|type)").expect("valid regex"));

/// An import requested by a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// Named exports to import.
    pub names: Vec<String>,
    /// Module path relative to the project source root, e.g. `pipes.ts`.
    pub file: String,
}

impl Import {
    pub fn new(names: &[&str], file: impl Into<String>) -> Self {
        Self {
            names: names.iter().map(|name| name.to_string()).collect(),
            file: file.into(),
        }
    }
}

/// How a pipe is rendered.
///
/// `transform` may use `$inner` for the piped expression and `$args` for the
/// comma separated pipe arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipeHandler {
    pub transform: Option<String>,
    pub imports: Vec<Import>,
}

impl PipeHandler {
    /// Renders `inner | name:args`.
    pub fn apply(&self, name: &str, inner: &str, args: &[String]) -> String {
        match &self.transform {
            Some(template) => {
                let args = args.join(", ");
                PIPE_PLACEHOLDER
                    .replace_all(template, |caps: &Captures| match &caps[1] {
                        "inner" => inner,
                        _ => args.as_str(),
                    })
                    .into_owned()
            }
            None => default_pipe(name, inner, args),
        }
    }
}

/// How a constructor parameter is turned into a local.
///
/// `transform` may use `$name` for the parameter name and `$type` for its
/// declared type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InjectionHandler {
    pub transform: Option<String>,
    pub imports: Vec<Import>,
}

impl InjectionHandler {
    /// Renders the declaration for `name: ty`.
    pub fn apply(&self, name: &str, ty: &str) -> String {
        match &self.transform {
            Some(template) => INJECTION_PLACEHOLDER
                .replace_all(template, |caps: &Captures| match &caps[1] {
                    "name" => name,
                    _ => ty,
                })
                .into_owned(),
            None => default_injection(name, ty),
        }
    }
}

/// Renders a pipe with no handler as a function call.
pub fn default_pipe(name: &str, inner: &str, args: &[String]) -> String {
    let mut out = format!("{name}({inner}");
    for arg in args {
        out.push_str(", ");
        out.push_str(arg);
    }
    out.push(')');
    out
}

/// Renders an injection with no handler as a context lookup.
pub fn default_injection(name: &str, ty: &str) -> String {
    format!("const {name} = React.useContext({ty});")
}

/// Pipe and injection handlers keyed by pipe name and injected type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyRegistry {
    pipes: FxHashMap<String, PipeHandler>,
    injections: FxHashMap<String, InjectionHandler>,
}

impl Default for PolicyRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl PolicyRegistry {
    /// Creates a registry with no handlers at all.
    pub fn empty() -> Self {
        Self {
            pipes: FxHashMap::default(),
            injections: FxHashMap::default(),
        }
    }

    /// Creates a registry with the built-in handlers.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.insert_pipe(
            "uppercase",
            PipeHandler {
                transform: None,
                imports: vec![Import::new(&["uppercase"], "pipes.ts")],
            },
        );
        registry.insert_pipe(
            "keyvalue",
            PipeHandler {
                transform: None,
                imports: vec![Import::new(&["keyvalue"], "pipes.ts")],
            },
        );
        registry.insert_pipe(
            "text",
            PipeHandler {
                transform: Some("<TextComponent name={$inner} />".to_string()),
                imports: vec![Import::new(&["TextComponent"], "TextComponent.ts")],
            },
        );
        registry.insert_injection(
            "ElementRef",
            InjectionHandler {
                transform: Some("const $name = React.createRef();".to_string()),
                imports: Vec::new(),
            },
        );
        registry.insert_injection(
            "ChangeDetectorRef",
            InjectionHandler {
                transform: Some(
                    "const $name = null; /* No equivalent to ChangeDetectorRef in React */"
                        .to_string(),
                ),
                imports: Vec::new(),
            },
        );
        registry
    }

    /// Adds or replaces a pipe handler.
    pub fn insert_pipe(&mut self, name: impl Into<String>, handler: PipeHandler) {
        self.pipes.insert(name.into(), handler);
    }

    /// Adds or replaces an injection handler.
    pub fn insert_injection(&mut self, ty: impl Into<String>, handler: InjectionHandler) {
        self.injections.insert(ty.into(), handler);
    }

    pub fn pipe(&self, name: &str) -> Option<&PipeHandler> {
        self.pipes.get(name)
    }

    pub fn injection(&self, ty: &str) -> Option<&InjectionHandler> {
        self.injections.get(ty)
    }
}
