//! Error types for component transformation.

use std::fmt;
use std::io;

use thiserror::Error;

/// A failure that stops a file from being transformed.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The component is not set up in a way that can be converted, e.g. a
    /// missing selector or an untyped constructor parameter.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The template did not parse.
    #[error("{}", format_template_errors(.0))]
    Parse(Vec<TemplateError>),

    /// A construct the converter does not handle.
    #[error("Not supported: {0}")]
    NotSupported(String),

    /// A binding whose target category has no React equivalent.
    #[error("Binding type not supported: {0}")]
    BindingType(String),

    /// The TypeScript source did not parse.
    #[error("{file}:{line}:{column}: {message}")]
    Script {
        file: String,
        line: u32,
        column: u32,
        message: String,
    },

    /// An external template could not be read.
    #[error("Failed to load template {path}")]
    TemplateLoad {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// One template parse error with its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateError {
    /// The template file, or the component file for inline templates.
    pub file: String,
    /// 1-based line.
    pub line: u32,
    /// 1-based column.
    pub column: u32,
    pub message: String,
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}: {}", self.file, self.line, self.column, self.message)
    }
}

fn format_template_errors(errors: &[TemplateError]) -> String {
    let mut out = String::from("Template parse errors:");
    for error in errors {
        out.push('\n');
        out.push_str(&error.to_string());
    }
    out
}

/// Result alias used throughout the transformer.
pub type TransformResult<T> = Result<T, TransformError>;
