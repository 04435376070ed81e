//! String casing helpers for attribute and style names.

/// Converts `kebab-case` to `camelCase`: each `-` followed by a word
/// character is removed and that character upper-cased.
///
/// A trailing `-` or one followed by a non-word character is kept.
pub fn kebab_to_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut chars = name.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '-' {
            if let Some(&next) = chars.peek() {
                if next.is_ascii_alphanumeric() || next == '_' {
                    out.extend(next.to_uppercase());
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}
