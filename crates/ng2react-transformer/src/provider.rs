//! Loading of external `templateUrl` templates.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use rustc_hash::FxHashMap;

/// Supplies template source for `templateUrl`.
pub trait TemplateProvider: Sync {
    /// Loads `template_url` as referenced from `component_file`.
    fn load(&self, component_file: &Utf8Path, template_url: &str) -> io::Result<String>;
}

/// Reads templates from disk, relative to the component file.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsTemplateProvider;

impl TemplateProvider for FsTemplateProvider {
    fn load(&self, component_file: &Utf8Path, template_url: &str) -> io::Result<String> {
        std::fs::read_to_string(resolve(component_file, template_url))
    }
}

/// Serves templates from memory, keyed by resolved path.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTemplateProvider {
    templates: FxHashMap<Utf8PathBuf, String>,
}

impl InMemoryTemplateProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<Utf8PathBuf>, source: impl Into<String>) {
        self.templates.insert(path.into(), source.into());
    }
}

impl TemplateProvider for InMemoryTemplateProvider {
    fn load(&self, component_file: &Utf8Path, template_url: &str) -> io::Result<String> {
        let path = resolve(component_file, template_url);
        self.templates.get(&path).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no template at {path}"))
        })
    }
}

/// Resolves `template_url` against the directory of `component_file`,
/// folding `.` and `..` segments.
pub fn resolve(component_file: &Utf8Path, template_url: &str) -> Utf8PathBuf {
    let base = component_file.parent().unwrap_or(Utf8Path::new(""));
    let mut out = Utf8PathBuf::new();
    for component in base.join(template_url).components() {
        match component {
            camino::Utf8Component::CurDir => {}
            camino::Utf8Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_str()),
        }
    }
    out
}
