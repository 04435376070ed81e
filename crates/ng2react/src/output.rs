//! Output formatting.

use crate::cli::OutputFormat;
use crate::orchestrator::FileError;
use camino::Utf8Path;
use ng2react_transformer::{Diagnostic, Severity, TransformError};
use serde::Serialize;

/// A formatted diagnostic for output.
#[derive(Debug, Serialize)]
pub struct FormattedDiagnostic {
    /// The diagnostic type (Error, Warning, Hint).
    #[serde(rename = "type")]
    pub diagnostic_type: String,
    /// The file path.
    pub filename: String,
    /// Where the problem was found, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<Position>,
    /// The message.
    pub message: String,
    /// The diagnostic code.
    pub code: String,
}

/// A position in the source.
#[derive(Debug, Serialize)]
pub struct Position {
    /// 1-indexed line number.
    pub line: u32,
    /// 1-indexed column number.
    pub column: u32,
}

/// Formats diagnostics and failures for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats the recovered diagnostics of one converted file.
    pub fn format(&self, diagnostics: &[Diagnostic], file_path: &Utf8Path) -> String {
        match self.format {
            OutputFormat::Human => Self::format_human(&Self::format_json_diagnostics(
                diagnostics,
                file_path,
            )),
            OutputFormat::Json => {
                let formatted = Self::format_json_diagnostics(diagnostics, file_path);
                serde_json::to_string_pretty(&formatted).unwrap_or_default()
            }
        }
    }

    /// Formats a file that could not be converted.
    pub fn format_failure(&self, error: &FileError, file_path: &Utf8Path) -> String {
        let formatted = [Self::failure_json(error, file_path)];
        match self.format {
            OutputFormat::Human => Self::format_human(&formatted),
            OutputFormat::Json => serde_json::to_string_pretty(&formatted).unwrap_or_default(),
        }
    }

    fn format_human(diagnostics: &[FormattedDiagnostic]) -> String {
        let mut output = String::new();
        for diag in diagnostics {
            match &diag.start {
                Some(start) => output.push_str(&format!(
                    "{}:{}:{}\n",
                    diag.filename, start.line, start.column
                )),
                None => output.push_str(&format!("{}\n", diag.filename)),
            }
            output.push_str(&format!(
                "{}: {} ({})\n\n",
                diag.diagnostic_type, diag.message, diag.code
            ));
        }
        output
    }

    /// Formats diagnostics into JSON-ready structs.
    pub fn format_json_diagnostics(
        diagnostics: &[Diagnostic],
        file_path: &Utf8Path,
    ) -> Vec<FormattedDiagnostic> {
        diagnostics
            .iter()
            .map(|diag| FormattedDiagnostic {
                diagnostic_type: match diag.severity {
                    Severity::Warning => "Warning".to_string(),
                    Severity::Hint => "Hint".to_string(),
                },
                filename: file_path.to_string(),
                start: diag.location.map(|location| {
                    let (line, column) = location.one_based();
                    Position { line, column }
                }),
                message: diag.message.clone(),
                code: diag.code.to_string(),
            })
            .collect()
    }

    /// Formats a failed file into a JSON-ready struct.
    pub fn failure_json(error: &FileError, file_path: &Utf8Path) -> FormattedDiagnostic {
        let start = match error {
            FileError::Transform(TransformError::Script { line, column, .. }) => Some(Position {
                line: *line,
                column: *column,
            }),
            _ => None,
        };
        FormattedDiagnostic {
            diagnostic_type: "Error".to_string(),
            filename: file_path.to_string(),
            start,
            message: error.to_string(),
            code: error_code(error).to_string(),
        }
    }
}

/// A stable code for each kind of failure.
pub fn error_code(error: &FileError) -> &'static str {
    match error {
        FileError::Transform(TransformError::Configuration(_)) => "configuration",
        FileError::Transform(TransformError::Parse(_)) => "template-parse",
        FileError::Transform(TransformError::NotSupported(_)) => "not-supported",
        FileError::Transform(TransformError::BindingType(_)) => "binding-type",
        FileError::Transform(TransformError::Script { .. }) => "script-parse",
        FileError::Transform(TransformError::TemplateLoad { .. }) => "template-load",
        FileError::Read(_) | FileError::Write { .. } => "io",
    }
}

/// Summary of a conversion run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Files converted to TSX.
    pub converted_count: usize,
    /// Files copied unchanged.
    pub copied_count: usize,
    /// Files that could not be converted.
    pub error_count: usize,
    /// Recovered warnings across all converted files.
    pub warning_count: usize,
}

impl RunSummary {
    /// Formats the summary line.
    pub fn format(&self) -> String {
        let plural = |count: usize, word: &str| {
            if count == 1 {
                format!("{count} {word}")
            } else {
                format!("{count} {word}s")
            }
        };

        format!(
            "====================================\nng2react converted {} and copied {} with {} and {}",
            plural(self.converted_count, "file"),
            plural(self.copied_count, "file"),
            plural(self.error_count, "error"),
            plural(self.warning_count, "warning"),
        )
    }
}
