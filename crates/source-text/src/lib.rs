//! Source position tracking and text emission for ng2react.
//!
//! Templates and component scripts are rewritten by slicing the original text
//! between spans and splicing generated code in between. This crate holds the
//! span type shared by the template parser and the transformer, a line index
//! used to report positions, and the buffer the generators write into.

mod buffer;
mod line_index;
mod span;

pub use buffer::TextBuffer;
pub use line_index::{LineCol, LineIndex};
pub use span::{ByteOffset, Span};
