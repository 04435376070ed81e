//! The component registry and the per-file transformation context.

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashMap;

use crate::diagnostic::Diagnostic;
use crate::policy::Import;

/// A component found during the project scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentRecord {
    /// The `selector` from `@Component`, used as the tag name in templates.
    pub selector: String,
    /// The class name, which becomes the function name.
    pub exported_name: String,
    /// The file that declares the component.
    pub origin_file: Utf8PathBuf,
}

/// All components of a project, keyed by selector.
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    components: FxHashMap<String, ComponentRecord>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a component, replacing any earlier one with the same selector.
    pub fn insert(&mut self, record: ComponentRecord) {
        self.components.insert(record.selector.clone(), record);
    }

    pub fn get(&self, selector: &str) -> Option<&ComponentRecord> {
        self.components.get(selector)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ComponentRecord> {
        self.components.values()
    }
}

impl FromIterator<ComponentRecord> for ComponentRegistry {
    fn from_iter<T: IntoIterator<Item = ComponentRecord>>(iter: T) -> Self {
        let mut registry = Self::new();
        for record in iter {
            registry.insert(record);
        }
        registry
    }
}

/// What a single file needs imported, and what was noticed along the way.
///
/// Everything is kept in insertion order so the generated header is stable.
#[derive(Debug, Clone)]
pub struct FileContext {
    /// The file being transformed.
    pub file: Utf8PathBuf,
    /// Components used in templates, keyed by exported name.
    pub components_referenced: IndexMap<String, ComponentRecord>,
    /// Style URLs from `styleUrls`, as written.
    pub style_files_referenced: IndexSet<String>,
    /// Module (relative to the source root) → names requested by handlers.
    pub additional_imports: IndexMap<String, IndexSet<String>>,
    pub diagnostics: Vec<Diagnostic>,
}

impl FileContext {
    pub fn new(file: impl Into<Utf8PathBuf>) -> Self {
        Self {
            file: file.into(),
            components_referenced: IndexMap::new(),
            style_files_referenced: IndexSet::new(),
            additional_imports: IndexMap::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Records a reference to another component.
    pub fn reference_component(&mut self, record: &ComponentRecord) {
        self.components_referenced
            .entry(record.exported_name.clone())
            .or_insert_with(|| record.clone());
    }

    pub fn reference_style(&mut self, url: impl Into<String>) {
        self.style_files_referenced.insert(url.into());
    }

    /// Records imports requested by a policy handler.
    pub fn add_imports(&mut self, imports: &[Import]) {
        for import in imports {
            let names = self.additional_imports.entry(import.file.clone()).or_default();
            names.extend(import.names.iter().cloned());
        }
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// The directory of the file being transformed.
    pub fn dir(&self) -> &Utf8Path {
        self.file.parent().unwrap_or(Utf8Path::new(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(selector: &str, name: &str, file: &str) -> ComponentRecord {
        ComponentRecord {
            selector: selector.to_string(),
            exported_name: name.to_string(),
            origin_file: file.into(),
        }
    }

    #[test]
    fn test_registry_lookup() {
        let registry: ComponentRegistry = [
            record("app-hero", "HeroComponent", "src/hero.component.ts"),
            record("app-list", "ListComponent", "src/list.component.ts"),
        ]
        .into_iter()
        .collect();
        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.get("app-hero").map(|r| r.exported_name.as_str()),
            Some("HeroComponent")
        );
        assert!(registry.get("app-missing").is_none());
    }

    #[test]
    fn test_references_are_deduplicated() {
        let mut ctx = FileContext::new("src/app/app.component.ts");
        let hero = record("app-hero", "HeroComponent", "src/hero.component.ts");
        ctx.reference_component(&hero);
        ctx.reference_component(&hero);
        assert_eq!(ctx.components_referenced.len(), 1);

        ctx.add_imports(&[Import::new(&["uppercase"], "pipes.ts")]);
        ctx.add_imports(&[Import::new(&["keyvalue", "uppercase"], "pipes.ts")]);
        let names: Vec<_> = ctx.additional_imports["pipes.ts"].iter().cloned().collect();
        assert_eq!(names, vec!["uppercase", "keyvalue"]);
        assert_eq!(ctx.dir(), "src/app");
    }
}
