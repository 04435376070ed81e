//! Diagnostic types.
//!
//! Diagnostics record conditions the transformer recovers from. Anything it
//! cannot recover from is a [`crate::TransformError`] instead.

use source_text::LineCol;

/// A diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The diagnostic code.
    pub code: DiagnosticCode,
    /// The severity level.
    pub severity: Severity,
    /// The diagnostic message.
    pub message: String,
    /// Where in the component's script or template the condition was found.
    pub location: Option<LineCol>,
}

impl Diagnostic {
    /// Creates a new diagnostic.
    pub fn new(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity: code.default_severity(),
            code,
            message: message.into(),
            location: None,
        }
    }

    /// Attaches a position to this diagnostic.
    pub fn at(mut self, location: LineCol) -> Self {
        self.location = Some(location);
        self
    }
}

/// The severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// A hint or suggestion.
    Hint,
    /// A warning that doesn't prevent the output from being written.
    Warning,
}

/// Diagnostic codes for every recovered condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    /// `unknown-pipe`: a pipe with no registered handler, emitted as a call
    UnknownPipe,
    /// `ignored-track-by`: `trackBy` in `*ngFor` has no equivalent
    IgnoredTrackBy,
    /// `dropped-decorator`: a member decorator other than `@Input`/`@Output`
    DroppedDecorator,
    /// `ignored-ng-if-else`: the `else` template of `*ngIf` is not emitted
    IgnoredNgIfElse,
}

impl DiagnosticCode {
    /// Returns the default severity for this diagnostic code.
    pub fn default_severity(&self) -> Severity {
        match self {
            DiagnosticCode::UnknownPipe
            | DiagnosticCode::DroppedDecorator
            | DiagnosticCode::IgnoredNgIfElse => Severity::Warning,
            DiagnosticCode::IgnoredTrackBy => Severity::Hint,
        }
    }

    /// Returns the diagnostic code as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::UnknownPipe => "unknown-pipe",
            DiagnosticCode::IgnoredTrackBy => "ignored-track-by",
            DiagnosticCode::DroppedDecorator => "dropped-decorator",
            DiagnosticCode::IgnoredNgIfElse => "ignored-ng-if-else",
        }
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Hint => f.write_str("hint"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_severity() {
        let diagnostic = Diagnostic::new(DiagnosticCode::UnknownPipe, "Unknown pipe date");
        assert_eq!(diagnostic.severity, Severity::Warning);
        assert_eq!(diagnostic.location, None);
        assert_eq!(
            Diagnostic::new(DiagnosticCode::IgnoredTrackBy, "").severity,
            Severity::Hint
        );
    }

    #[test]
    fn test_code_display() {
        assert_eq!(DiagnosticCode::DroppedDecorator.to_string(), "dropped-decorator");
        let diagnostic =
            Diagnostic::new(DiagnosticCode::UnknownPipe, "x").at(LineCol::new(2, 4));
        assert_eq!(diagnostic.location.map(LineCol::one_based), Some((3, 5)));
    }
}
