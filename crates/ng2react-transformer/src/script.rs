//! Parsing of component TypeScript and byte-offset helpers over it.

use std::sync::Arc;

use source_text::{LineCol, LineIndex};
use swc_common::{BytePos, FileName, SourceMap, Span as SwcSpan, Spanned};
use swc_ecma_ast::Module;
use swc_ecma_parser::{Parser, StringInput, Syntax, TsSyntax};

use crate::error::{TransformError, TransformResult};

/// A parsed TypeScript file and the text it came from.
///
/// swc positions are offset by the file's start in its source map; every
/// helper here converts them back to byte offsets into `source`.
pub struct Script<'a> {
    pub source: &'a str,
    pub module: Module,
    file_start: BytePos,
    line_index: LineIndex,
}

impl<'a> Script<'a> {
    /// Parses `source` as TypeScript with decorators enabled.
    pub fn parse(source: &'a str, file: &str) -> TransformResult<Self> {
        let cm: Arc<SourceMap> = Default::default();
        let fm = cm.new_source_file(FileName::Custom(file.into()).into(), source.to_string());
        let file_start = fm.start_pos;
        let syntax = Syntax::Typescript(TsSyntax {
            tsx: false,
            decorators: true,
            ..Default::default()
        });
        let mut parser = Parser::new(syntax, StringInput::from(&*fm), None);
        let line_index = LineIndex::new(source);
        match parser.parse_module() {
            Ok(module) => Ok(Self {
                source,
                module,
                file_start,
                line_index,
            }),
            Err(err) => {
                let offset = err.span().lo.0.saturating_sub(file_start.0);
                let (line, column) = line_index.line_col(offset.into()).one_based();
                Err(TransformError::Script {
                    file: file.to_string(),
                    line,
                    column,
                    message: err.kind().msg().into_owned(),
                })
            }
        }
    }

    /// Byte offset of a swc position.
    pub fn offset(&self, pos: BytePos) -> usize {
        pos.0.saturating_sub(self.file_start.0) as usize
    }

    pub fn lo(&self, span: SwcSpan) -> usize {
        self.offset(span.lo)
    }

    pub fn hi(&self, span: SwcSpan) -> usize {
        self.offset(span.hi)
    }

    /// The source text of a node.
    pub fn text(&self, span: SwcSpan) -> &'a str {
        self.slice(self.lo(span), self.hi(span))
    }

    /// The source between two byte offsets, empty when out of range.
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        self.source.get(start..end).unwrap_or("")
    }

    pub fn line_col(&self, offset: usize) -> LineCol {
        self.line_index.line_col((offset as u32).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swc_ecma_ast::ModuleItem;

    #[test]
    fn test_offsets_are_relative_to_the_source() {
        let source = "const a = 1;\n@Component({selector: 'x'})\nclass A {}";
        let script = Script::parse(source, "a.ts").unwrap();
        let ModuleItem::Stmt(stmt) = &script.module.body[1] else {
            panic!("expected a statement");
        };
        assert!(script.text(stmt.span()).contains("class A {}"));
        assert_eq!(script.line_col(script.hi(stmt.span())).line, 2);
    }

    #[test]
    fn test_syntax_error_position() {
        let err = Script::parse("let x = ;\n", "broken.ts").err().unwrap();
        match err {
            TransformError::Script { file, line, .. } => {
                assert_eq!(file, "broken.ts");
                assert_eq!(line, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
