//! Angular component to React function component transformation.
//!
//! This crate rewrites TypeScript files containing `@Component` classes into
//! TSX files containing React function components. It handles:
//! - Sorting class fields into props, state and constants
//! - Compiling the component template into TSX
//! - Rewriting member access and state mutation in method bodies
//! - Building the import header for referenced components, styles and helpers
//!
//! Source outside the component classes is passed through byte for byte.
//!
//! # Example
//!
//! ```
//! use camino::Utf8Path;
//! use ng2react_transformer::{
//!     transform_component_file, ComponentRegistry, InMemoryTemplateProvider, PolicyRegistry,
//!     TransformOptions,
//! };
//!
//! let source = r#"
//! import { Component } from '@angular/core';
//!
//! @Component({ selector: 'app-counter', template: '<button (click)="inc()">{{ count }}</button>' })
//! export class CounterComponent {
//!     count = 0;
//!     inc() { this.count = this.count + 1; }
//! }
//! "#;
//!
//! let registry = ComponentRegistry::new();
//! let policy = PolicyRegistry::default();
//! let provider = InMemoryTemplateProvider::new();
//! let options = TransformOptions {
//!     file: Utf8Path::new("src/app/counter.component.ts"),
//!     src_root: Utf8Path::new("src"),
//!     registry: &registry,
//!     policy: &policy,
//!     provider: &provider,
//! };
//! let output = transform_component_file(source, &options).unwrap();
//! assert!(output.code.contains("setState({...state, count: count + 1})"));
//! ```

mod casing;
mod component;
mod context;
mod diagnostic;
mod error;
mod imports;
mod mappings;
mod members;
mod metadata;
mod policy;
mod provider;
mod rewriter;
mod script;
pub mod template;
mod transform;

pub use context::{ComponentRecord, ComponentRegistry, FileContext};
pub use diagnostic::{Diagnostic, DiagnosticCode, Severity};
pub use error::{TemplateError, TransformError, TransformResult};
pub use policy::{Import, InjectionHandler, PipeHandler, PolicyRegistry};
pub use provider::{FsTemplateProvider, InMemoryTemplateProvider, TemplateProvider};
pub use template::{parse_template, transform_template, TemplateNode};
pub use transform::{find_components, transform_component_file, TransformOptions, TransformOutput};
