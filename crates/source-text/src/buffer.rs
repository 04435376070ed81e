//! Output buffer for generated TSX.

/// Generated code, written front to back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    text: String,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, text: &str) {
        self.text.push_str(text);
    }

    /// Starts a new line indented by `indent` spaces, then appends `text`.
    pub fn push_line(&mut self, indent: usize, text: &str) {
        self.text.push('\n');
        self.text.extend(std::iter::repeat(' ').take(indent));
        self.text.push_str(text);
    }

    pub fn into_string(self) -> String {
        self.text
    }
}
