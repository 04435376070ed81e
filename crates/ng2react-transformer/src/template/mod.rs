//! Angular template → TSX.
//!
//! Two stages: [`compile`] resolves Angular semantics into the
//! [`intermediate`] tree, [`generate`] prints that tree.

pub mod compile;
pub mod generate;
pub mod intermediate;

use source_text::LineIndex;

use crate::context::{ComponentRegistry, FileContext};
use crate::error::{TemplateError, TransformError, TransformResult};
use crate::policy::PolicyRegistry;

pub use compile::TemplateCompiler;
pub use generate::TsxGenerator;
pub use intermediate::TemplateNode;

/// Converts template source to TSX.
///
/// `file` names the template in error messages. Every markup error is
/// reported at once.
pub fn transform_template(
    source: &str,
    file: &str,
    registry: &ComponentRegistry,
    policy: &PolicyRegistry,
    ctx: &mut FileContext,
) -> TransformResult<String> {
    let root = parse_template(source, file, registry, ctx)?;
    let line_index = LineIndex::new(source);
    Ok(TsxGenerator::new(policy, ctx, &line_index).generate(&root))
}

/// Parses and compiles a template into its intermediate tree.
pub fn parse_template(
    source: &str,
    file: &str,
    registry: &ComponentRegistry,
    ctx: &mut FileContext,
) -> TransformResult<TemplateNode> {
    let parsed = ng_template_parser::parse(source);
    if !parsed.errors.is_empty() {
        let line_index = LineIndex::new(source);
        let errors = parsed
            .errors
            .iter()
            .map(|error| {
                let (line, column) = line_index.line_col(error.span.start).one_based();
                TemplateError {
                    file: file.to_string(),
                    line,
                    column,
                    message: error.to_string(),
                }
            })
            .collect();
        return Err(TransformError::Parse(errors));
    }
    TemplateCompiler::new(source, registry, ctx).compile(&parsed.nodes)
}
