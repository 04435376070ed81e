//! The import header prepended to every converted file.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use indexmap::IndexSet;

use crate::context::FileContext;

/// Builds the import lines for everything `ctx` recorded, in order: React,
/// components from other files, stylesheets, then policy modules.
///
/// Policy module paths are relative to `src_root`.
pub fn import_header(ctx: &FileContext, src_root: &Utf8Path) -> String {
    let dir = ctx.dir();
    let mut lines = IndexSet::new();
    lines.insert("import React from 'react';".to_string());

    for component in ctx.components_referenced.values() {
        if normalize(&component.origin_file) == normalize(&ctx.file) {
            continue;
        }
        let path = relative_path(dir, &component.origin_file);
        lines.insert(format!(
            "import {{{}}} from '{}';",
            component.exported_name,
            import_path(&path)
        ));
    }

    for url in &ctx.style_files_referenced {
        lines.insert(format!("import '{url}';"));
    }

    for (module, names) in &ctx.additional_imports {
        if names.is_empty() {
            continue;
        }
        let path = relative_path(dir, &src_root.join(module));
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        lines.insert(format!(
            "import {{{}}} from '{}';",
            names.join(", "),
            import_path(&path)
        ));
    }

    let mut header = String::new();
    for line in lines {
        header.push_str(&line);
        header.push('\n');
    }
    header
}

/// A module specifier: no extension, forward slashes, `./` unless the path
/// already starts with a dot.
pub fn import_path(path: &Utf8Path) -> String {
    let without_ext = match path.extension() {
        Some(ext) => {
            let text = path.as_str();
            text[..text.len() - ext.len() - 1].to_string()
        }
        None => path.to_string(),
    };
    let unix = without_ext.replace('\\', "/");
    if unix.starts_with('.') {
        unix
    } else {
        format!("./{unix}")
    }
}

/// The path of `to` as seen from the directory `from_dir`, computed lexically.
pub fn relative_path(from_dir: &Utf8Path, to: &Utf8Path) -> Utf8PathBuf {
    let from = normalize(from_dir);
    let to = normalize(to);
    let from_parts: Vec<_> = from.components().collect();
    let to_parts: Vec<_> = to.components().collect();
    let common = from_parts
        .iter()
        .zip(&to_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut out = Utf8PathBuf::new();
    for _ in common..from_parts.len() {
        out.push("..");
    }
    for part in &to_parts[common..] {
        out.push(part.as_str());
    }
    out
}

/// Folds `.` and `..` segments without touching the file system.
fn normalize(path: &Utf8Path) -> Utf8PathBuf {
    let mut out = Utf8PathBuf::new();
    for component in path.components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => {
                let parent_is_normal = matches!(
                    out.components().next_back(),
                    Some(Utf8Component::Normal(_))
                );
                if parent_is_normal {
                    out.pop();
                } else {
                    out.push("..");
                }
            }
            other => out.push(other.as_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ComponentRecord;
    use crate::policy::Import;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_relative_path() {
        assert_eq!(
            relative_path(Utf8Path::new("src/app/list"), Utf8Path::new("src/app/hero/hero.ts")),
            Utf8PathBuf::from("../hero/hero.ts")
        );
        assert_eq!(
            relative_path(Utf8Path::new("src/app"), Utf8Path::new("src/app/./hero.ts")),
            Utf8PathBuf::from("hero.ts")
        );
    }

    #[test]
    fn test_import_path() {
        assert_eq!(import_path(Utf8Path::new("hero.component.ts")), "./hero.component");
        assert_eq!(import_path(Utf8Path::new("../pipes.ts")), "../pipes");
        assert_eq!(import_path(Utf8Path::new("shared/text")), "./shared/text");
    }

    #[test]
    fn test_header_order_and_dedup() {
        let mut ctx = FileContext::new("src/app/list/list.component.ts");
        let hero = ComponentRecord {
            selector: "app-hero".to_string(),
            exported_name: "HeroComponent".to_string(),
            origin_file: "src/app/hero/hero.component.ts".into(),
        };
        let local = ComponentRecord {
            selector: "app-row".to_string(),
            exported_name: "RowComponent".to_string(),
            origin_file: "src/app/list/list.component.ts".into(),
        };
        ctx.reference_component(&hero);
        ctx.reference_component(&hero);
        ctx.reference_component(&local);
        ctx.reference_style("./list.component.css");
        ctx.add_imports(&[Import::new(&["uppercase"], "pipes.ts")]);
        ctx.add_imports(&[Import::new(&["keyvalue", "uppercase"], "pipes.ts")]);

        assert_eq!(
            import_header(&ctx, Utf8Path::new("src")),
            "import React from 'react';\n\
             import {HeroComponent} from '../hero/hero.component';\n\
             import './list.component.css';\n\
             import {uppercase, keyvalue} from '../../pipes';\n"
        );
    }
}
