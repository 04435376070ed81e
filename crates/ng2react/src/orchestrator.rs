//! Main orchestration logic.

use crate::cli::{Args, OutputFormat};
use crate::config::{ConfigError, PolicyConfig};
use crate::output::{FormattedDiagnostic, Formatter, RunSummary};
use camino::{Utf8Path, Utf8PathBuf};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ng2react_transformer::{
    find_components, transform_component_file, ComponentRegistry, Diagnostic, FsTemplateProvider,
    PolicyRegistry, Severity, TransformError, TransformOptions,
};
use rayon::prelude::*;
use std::fs;
use std::io;
use thiserror::Error;
use walkdir::WalkDir;

/// Patterns that are never converted or copied.
const DEFAULT_IGNORES: [&str; 2] = ["**/node_modules/**", "**/dist/**"];

/// Orchestration errors.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Invalid glob pattern.
    #[error("invalid glob pattern: {0}")]
    InvalidGlob(String),

    /// The source root is not a directory.
    #[error("source directory not found: {0}")]
    MissingSource(Utf8PathBuf),

    /// `ng2react.json` could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Why a single file was not written.
#[derive(Debug, Error)]
pub enum FileError {
    /// The file could not be converted.
    #[error(transparent)]
    Transform(#[from] TransformError),

    /// Failed to read file.
    #[error("failed to read file: {0}")]
    Read(#[source] io::Error),

    /// Failed to write the output.
    #[error("failed to write {path}: {source}")]
    Write {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
}

/// What a file is treated as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// A TypeScript file declaring at least one component.
    Component,
    /// A `*.component.html` template, inlined into its component.
    Template,
    /// Anything else, copied unchanged.
    Other,
}

/// A file found under the source root.
#[derive(Debug, Clone)]
pub struct ProjectFile {
    pub path: Utf8PathBuf,
    /// Path relative to the source root.
    pub relative: Utf8PathBuf,
    pub kind: FileKind,
}

/// What happened to one file.
#[derive(Debug)]
pub struct FileOutcome {
    pub relative: Utf8PathBuf,
    pub status: FileStatus,
}

#[derive(Debug)]
pub enum FileStatus {
    Converted { diagnostics: Vec<Diagnostic> },
    Copied,
    Skipped,
    Failed(FileError),
}

/// A scanned Angular project: every file under the source root and the
/// selector registry built from its components.
#[derive(Debug)]
pub struct Project {
    root: Utf8PathBuf,
    files: Vec<ProjectFile>,
    registry: ComponentRegistry,
    failures: Vec<FileOutcome>,
}

impl Project {
    /// Walks `root`, skipping `ignore` and the default ignores, and registers
    /// every component it finds.
    ///
    /// A TypeScript file that cannot be read or scanned is recorded as a
    /// failure and left out of the run.
    pub fn scan(root: &Utf8Path, ignore: &[String]) -> Result<Self, OrchestratorError> {
        if !root.is_dir() {
            return Err(OrchestratorError::MissingSource(root.to_owned()));
        }
        let ignore_set = build_ignore_set(ignore)?;

        let paths: Vec<Utf8PathBuf> = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| Utf8PathBuf::try_from(e.into_path()).ok())
            .filter(|p| {
                let relative = p.strip_prefix(root).unwrap_or(p);
                !ignore_set.is_match(relative.as_str())
            })
            .collect();

        let scanned: Vec<Result<(ProjectFile, Vec<_>), FileOutcome>> = paths
            .into_par_iter()
            .map(|path| {
                let relative = path.strip_prefix(root).unwrap_or(&path).to_owned();
                let name = path.file_name().unwrap_or("");
                if name.ends_with(".component.html") {
                    return Ok((file(path, relative, FileKind::Template), Vec::new()));
                }
                if !is_script(name) {
                    return Ok((file(path, relative, FileKind::Other), Vec::new()));
                }

                let records = fs::read_to_string(&path)
                    .map_err(FileError::Read)
                    .and_then(|source| Ok(find_components(&source, &path)?));
                match records {
                    Ok(records) if records.is_empty() => {
                        Ok((file(path, relative, FileKind::Other), records))
                    }
                    Ok(records) => Ok((file(path, relative, FileKind::Component), records)),
                    Err(error) => Err(FileOutcome {
                        relative,
                        status: FileStatus::Failed(error),
                    }),
                }
            })
            .collect();

        let mut project = Project {
            root: root.to_owned(),
            files: Vec::new(),
            registry: ComponentRegistry::new(),
            failures: Vec::new(),
        };
        for entry in scanned {
            match entry {
                Ok((file, records)) => {
                    for record in records {
                        project.registry.insert(record);
                    }
                    project.files.push(file);
                }
                Err(failure) => project.failures.push(failure),
            }
        }
        Ok(project)
    }

    /// Writes the converted project to `out`.
    ///
    /// Component files become `<out>/<relative>.tsx`, templates are dropped
    /// and everything else is copied. Files are independent, so one failure
    /// does not stop the others. Outcomes are sorted by path, scan failures
    /// included.
    pub fn run(self, out: &Utf8Path, policy: &PolicyRegistry, emit_tsx: bool) -> Vec<FileOutcome> {
        let mut outcomes: Vec<FileOutcome> = self
            .files
            .par_iter()
            .map(|file| FileOutcome {
                relative: file.relative.clone(),
                status: self.process(file, out, policy, emit_tsx),
            })
            .collect();
        outcomes.extend(self.failures);
        outcomes.sort_by(|a, b| a.relative.cmp(&b.relative));
        outcomes
    }

    fn process(
        &self,
        file: &ProjectFile,
        out: &Utf8Path,
        policy: &PolicyRegistry,
        emit_tsx: bool,
    ) -> FileStatus {
        let target = out.join(&file.relative);
        let result = match file.kind {
            FileKind::Template => return FileStatus::Skipped,
            FileKind::Other => copy_file(&file.path, &target).map(|()| FileStatus::Copied),
            FileKind::Component => self
                .convert(file, policy)
                .and_then(|(code, diagnostics)| {
                    if emit_tsx {
                        eprintln!("=== TSX for {} ===\n{}", file.relative, code);
                    }
                    write_file(&target.with_extension("tsx"), &code)?;
                    Ok(FileStatus::Converted { diagnostics })
                }),
        };
        result.unwrap_or_else(FileStatus::Failed)
    }

    fn convert(
        &self,
        file: &ProjectFile,
        policy: &PolicyRegistry,
    ) -> Result<(String, Vec<Diagnostic>), FileError> {
        let source = fs::read_to_string(&file.path).map_err(FileError::Read)?;
        let options = TransformOptions {
            file: &file.path,
            src_root: &self.root,
            registry: &self.registry,
            policy,
            provider: &FsTemplateProvider,
        };
        let output = transform_component_file(&source, &options)?;
        Ok((output.code, output.diagnostics))
    }
}

/// Runs the conversion described by `args` and prints its report.
pub fn run(args: Args) -> Result<RunSummary, OrchestratorError> {
    let policy = match args.config.clone().or_else(|| PolicyConfig::find(&args.src)) {
        Some(path) => PolicyConfig::load(&path)?.into_registry(),
        None => PolicyRegistry::default(),
    };

    let project = Project::scan(&args.src, &args.ignore)?;
    let outcomes = project.run(&args.out, &policy, args.emit_tsx);

    let formatter = Formatter::new(args.output);
    let output_json = args.output == OutputFormat::Json;
    let mut json_output: Vec<FormattedDiagnostic> = Vec::new();
    let summary = summarize(&outcomes);

    for outcome in &outcomes {
        match &outcome.status {
            FileStatus::Converted { diagnostics } if !diagnostics.is_empty() => {
                if output_json {
                    json_output.extend(Formatter::format_json_diagnostics(
                        diagnostics,
                        &outcome.relative,
                    ));
                } else {
                    print!("{}", formatter.format(diagnostics, &outcome.relative));
                }
            }
            FileStatus::Failed(error) => {
                if output_json {
                    json_output.push(Formatter::failure_json(error, &outcome.relative));
                } else {
                    print!("{}", formatter.format_failure(error, &outcome.relative));
                }
            }
            _ => {}
        }
    }

    if output_json {
        let json = serde_json::to_string_pretty(&json_output).unwrap_or_else(|_| "[]".to_string());
        println!("{}", json);
    } else {
        println!("{}", summary.format());
    }

    Ok(summary)
}

/// Counts what happened across a run.
pub fn summarize(outcomes: &[FileOutcome]) -> RunSummary {
    let mut summary = RunSummary::default();
    for outcome in outcomes {
        match &outcome.status {
            FileStatus::Converted { diagnostics } => {
                summary.converted_count += 1;
                summary.warning_count += diagnostics
                    .iter()
                    .filter(|d| d.severity == Severity::Warning)
                    .count();
            }
            FileStatus::Copied => summary.copied_count += 1,
            FileStatus::Skipped => {}
            FileStatus::Failed(_) => summary.error_count += 1,
        }
    }
    summary
}

fn build_ignore_set(ignore: &[String]) -> Result<GlobSet, OrchestratorError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in ignore.iter().map(String::as_str).chain(DEFAULT_IGNORES) {
        let glob = Glob::new(pattern).map_err(|e| OrchestratorError::InvalidGlob(e.to_string()))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| OrchestratorError::InvalidGlob(e.to_string()))
}

fn file(path: Utf8PathBuf, relative: Utf8PathBuf, kind: FileKind) -> ProjectFile {
    ProjectFile {
        path,
        relative,
        kind,
    }
}

/// TypeScript sources that may declare components; declaration files never do.
fn is_script(name: &str) -> bool {
    name.ends_with(".ts") && !name.ends_with(".d.ts")
}

fn write_file(path: &Utf8Path, contents: &str) -> Result<(), FileError> {
    create_parent(path)?;
    fs::write(path, contents).map_err(|source| FileError::Write {
        path: path.to_owned(),
        source,
    })
}

fn copy_file(from: &Utf8Path, to: &Utf8Path) -> Result<(), FileError> {
    create_parent(to)?;
    fs::copy(from, to)
        .map(|_| ())
        .map_err(|source| FileError::Write {
            path: to.to_owned(),
            source,
        })
}

fn create_parent(path: &Utf8Path) -> Result<(), FileError> {
    match path.parent() {
        Some(dir) => fs::create_dir_all(dir).map_err(|source| FileError::Write {
            path: dir.to_owned(),
            source,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const HERO: &str = r#"import { Component, Input } from '@angular/core';

@Component({
    selector: 'app-hero',
    templateUrl: './hero.component.html',
    styleUrls: ['./hero.component.css']
})
export class HeroComponent {
    @Input() name: string;
}
"#;

    const LIST: &str = r#"import { Component } from '@angular/core';
import { Hero } from '../model';

@Component({
    selector: 'app-list',
    template: '<app-hero *ngFor="let hero of heroes" [name]="hero.name | date"></app-hero>'
})
export class ListComponent {
    heroes: Hero[] = [];
}
"#;

    fn project() -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().join("src")).unwrap();
        let files = [
            ("app/hero/hero.component.ts", HERO),
            ("app/hero/hero.component.html", "<h2>{{ name }}</h2>"),
            ("app/hero/hero.component.css", "h2 { color: red; }"),
            ("app/list/list.component.ts", LIST),
            ("app/model.ts", "export interface Hero { name: string; }\n"),
            ("typings.d.ts", "declare const VERSION: string;\n"),
            ("node_modules/lib/index.ts", "export const x = 1;\n"),
        ];
        for (path, content) in files {
            let path = root.join(path);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        (dir, root)
    }

    fn kinds(project: &Project) -> Vec<(&str, FileKind)> {
        project
            .files
            .iter()
            .map(|f| (f.relative.as_str(), f.kind))
            .collect()
    }

    #[test]
    fn test_scan_classifies_files() {
        let (_dir, root) = project();
        let project = Project::scan(&root, &[]).unwrap();

        assert_eq!(
            kinds(&project),
            vec![
                ("app/hero/hero.component.css", FileKind::Other),
                ("app/hero/hero.component.html", FileKind::Template),
                ("app/hero/hero.component.ts", FileKind::Component),
                ("app/list/list.component.ts", FileKind::Component),
                ("app/model.ts", FileKind::Other),
                ("typings.d.ts", FileKind::Other),
            ]
        );
        assert_eq!(project.registry.len(), 2);
        let hero = project.registry.get("app-hero").unwrap();
        assert_eq!(hero.exported_name, "HeroComponent");
        assert_eq!(hero.origin_file, root.join("app/hero/hero.component.ts"));
        assert!(project.failures.is_empty());
    }

    #[test]
    fn test_scan_user_ignores() {
        let (_dir, root) = project();
        let project = Project::scan(&root, &["**/*.css".to_string()]).unwrap();
        assert!(project
            .files
            .iter()
            .all(|f| f.relative.extension() != Some("css")));
    }

    #[test]
    fn test_run_writes_project() {
        let (dir, root) = project();
        let out = Utf8PathBuf::from_path_buf(dir.path().join("react")).unwrap();
        let project = Project::scan(&root, &[]).unwrap();
        let outcomes = project.run(&out, &PolicyRegistry::default(), false);

        let summary = summarize(&outcomes);
        assert_eq!(
            summary,
            RunSummary {
                converted_count: 2,
                copied_count: 3,
                error_count: 0,
                warning_count: 1,
            }
        );

        let hero = fs::read_to_string(out.join("app/hero/hero.component.tsx")).unwrap();
        assert!(hero.starts_with("import React from 'react';\nimport './hero.component.css';\n"));
        assert!(hero.contains("export function HeroComponent({ name }"));
        assert!(hero.contains("<h2>{name}</h2>"));

        let list = fs::read_to_string(out.join("app/list/list.component.tsx")).unwrap();
        assert!(list.contains("import {HeroComponent} from '../hero/hero.component';"));
        assert!(list.contains("import { Hero } from '../model';"));
        assert!(!list.contains("@angular/core"));

        assert_eq!(
            fs::read_to_string(out.join("app/model.ts")).unwrap(),
            "export interface Hero { name: string; }\n"
        );
        assert!(out.join("typings.d.ts").is_file());
        assert!(out.join("app/hero/hero.component.css").is_file());
        assert!(!out.join("app/hero/hero.component.html").exists());
        assert!(!out.join("app/hero/hero.component.ts").exists());
        assert!(!out.join("node_modules").exists());
    }

    #[test]
    fn test_failing_file_does_not_stop_the_run() {
        let (dir, root) = project();
        fs::write(
            root.join("app/broken.component.ts"),
            "@Component({ selector: 'app-broken', template: '<p>' })\nexport class Broken {\n    #secret = 1;\n}\n",
        )
        .unwrap();
        fs::write(root.join("app/bad.ts"), "export const = ;\n").unwrap();
        let out = Utf8PathBuf::from_path_buf(dir.path().join("react")).unwrap();

        let outcomes = Project::scan(&root, &[])
            .unwrap()
            .run(&out, &PolicyRegistry::default(), false);

        let failed: Vec<&str> = outcomes
            .iter()
            .filter(|o| matches!(o.status, FileStatus::Failed(_)))
            .map(|o| o.relative.as_str())
            .collect();
        assert_eq!(failed, vec!["app/bad.ts", "app/broken.component.ts"]);
        assert_eq!(summarize(&outcomes).converted_count, 2);
        assert!(!out.join("app/broken.component.tsx").exists());
        assert!(out.join("app/list/list.component.tsx").is_file());
    }

    #[test]
    fn test_missing_template_fails_component() {
        let (dir, root) = project();
        fs::remove_file(root.join("app/hero/hero.component.html")).unwrap();
        let out = Utf8PathBuf::from_path_buf(dir.path().join("react")).unwrap();

        let outcomes = Project::scan(&root, &[])
            .unwrap()
            .run(&out, &PolicyRegistry::default(), false);
        let hero = outcomes
            .iter()
            .find(|o| o.relative == "app/hero/hero.component.ts")
            .unwrap();
        assert!(matches!(
            hero.status,
            FileStatus::Failed(FileError::Transform(TransformError::TemplateLoad { .. }))
        ));
    }

    #[test]
    fn test_is_script() {
        assert!(is_script("hero.component.ts"));
        assert!(!is_script("globals.d.ts"));
        assert!(!is_script("hero.component.html"));
    }

    #[test]
    fn test_default_ignores() {
        let set = build_ignore_set(&[]).unwrap();
        assert!(set.is_match("node_modules/lib/index.ts"));
        assert!(set.is_match("app/dist/main.js"));
        assert!(!set.is_match("app/distance.ts"));
    }

    #[test]
    fn test_invalid_glob() {
        let err = build_ignore_set(&["a/[".to_string()]).unwrap_err();
        assert!(matches!(err, OrchestratorError::InvalidGlob(_)));
    }

    #[test]
    fn test_missing_source() {
        let err = Project::scan(Utf8Path::new("no/such/dir"), &[]).unwrap_err();
        assert!(matches!(err, OrchestratorError::MissingSource(_)));
    }
}
