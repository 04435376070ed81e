//! Parse error types.

use source_text::Span;
use thiserror::Error;

/// An error that occurred while parsing a template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct ParseError {
    /// The kind of error.
    pub kind: ParseErrorKind,
    /// The location in the template where the error occurred.
    pub span: Span,
}

impl ParseError {
    /// Creates a new parse error.
    pub fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// The kind of parse error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// A closing tag with no matching open element, or one that would close
    /// elements which require an explicit end tag.
    #[error(
        "Unexpected closing tag \"{name}\". It may happen when the tag has already been closed by another tag"
    )]
    UnexpectedClosingTag {
        /// The tag name as written.
        name: String,
    },

    /// A closing tag for a void element such as `</br>`.
    #[error("Void elements do not have end tags \"{name}\"")]
    VoidElementEndTag {
        /// The tag name as written.
        name: String,
    },

    /// `<div/>` and other non-void HTML elements written self-closed.
    #[error("Only void, custom and foreign elements can be self closed \"{name}\"")]
    InvalidSelfClose {
        /// The tag name as written.
        name: String,
    },

    /// A start or end tag without its closing `>`.
    #[error("Unterminated tag \"{name}\"")]
    UnterminatedTag {
        /// The tag name as written.
        name: String,
    },

    /// A character that cannot appear inside a tag.
    #[error("Unexpected character \"{found}\" in tag")]
    UnexpectedCharacter {
        /// The offending text.
        found: String,
    },

    /// `<!--` without a matching `-->`.
    #[error("Unterminated comment")]
    UnterminatedComment,

    /// `{{` without a matching `}}`.
    #[error("Missing closing \"}}}}\" in interpolation")]
    UnterminatedInterpolation,

    /// A lone `{` in text that does not start an ICU message.
    #[error("Unexpected character \"{{\" (Do you have an unescaped \"{{\" in your template? Use \"{{{{ '{{' }}}}\") to escape it.)")]
    UnescapedBrace,

    /// More than one `*` directive on the same element.
    #[error("Can't have multiple template bindings on one element. Use only one attribute prefixed with *")]
    MultipleTemplateBindings,

    /// `let-x` on an element other than `<ng-template>`.
    #[error("\"let-\" is only supported on ng-template elements")]
    VariableOutsideTemplate,

    /// A binding whose expression is empty, such as `[value]=""`.
    #[error("Empty expressions are not allowed in binding \"{name}\"")]
    EmptyExpression {
        /// The binding as written.
        name: String,
    },

    /// A malformed binding expression or microsyntax.
    #[error("{message}")]
    InvalidExpression {
        /// A description of the problem.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = ParseError::new(
            ParseErrorKind::UnexpectedClosingTag {
                name: "bar".to_string(),
            },
            Span::new(5u32, 11u32),
        );
        assert!(error.to_string().starts_with("Unexpected closing tag \"bar\""));
    }

    #[test]
    fn test_brace_messages_render_literally() {
        assert_eq!(
            ParseErrorKind::UnterminatedInterpolation.to_string(),
            "Missing closing \"}}\" in interpolation"
        );
        assert!(ParseErrorKind::UnescapedBrace
            .to_string()
            .contains("Use \"{{ '{' }}\") to escape it"));
    }
}
