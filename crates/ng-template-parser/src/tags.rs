//! HTML tag definitions used by the tree builder.
//!
//! Covers the parsing rules Angular applies to plain HTML: void elements,
//! implied end tags, implicit namespaces for SVG and MathML, and raw text
//! content.

use once_cell::sync::Lazy;
use rustc_hash::{FxHashMap, FxHashSet};

/// How the content of an element is tokenized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    /// Regular markup.
    Parsable,
    /// `<script>` and `<style>`: everything up to the end tag is text.
    RawText,
    /// `<textarea>` and `<title>`: text only, interpolations still apply.
    EscapableRawText,
}

/// Parsing rules for one tag name.
#[derive(Debug, Clone)]
pub struct TagDefinition {
    closed_by_children: FxHashSet<&'static str>,
    closed_by_parent: bool,
    implicit_namespace_prefix: Option<&'static str>,
    content_type: ContentType,
    is_void: bool,
    ignore_first_lf: bool,
    can_self_close: bool,
    prevent_namespace_inheritance: bool,
}

impl TagDefinition {
    fn new() -> Self {
        Self {
            closed_by_children: FxHashSet::default(),
            closed_by_parent: false,
            implicit_namespace_prefix: None,
            content_type: ContentType::Parsable,
            is_void: false,
            ignore_first_lf: false,
            can_self_close: false,
            prevent_namespace_inheritance: false,
        }
    }

    fn void() -> Self {
        Self {
            is_void: true,
            closed_by_parent: true,
            can_self_close: true,
            ..Self::new()
        }
    }

    fn closed_by(mut self, children: &[&'static str]) -> Self {
        self.closed_by_children.extend(children.iter().copied());
        self
    }

    fn closed_by_parent(mut self) -> Self {
        self.closed_by_parent = true;
        self
    }

    fn namespace(mut self, prefix: &'static str) -> Self {
        self.implicit_namespace_prefix = Some(prefix);
        self
    }

    fn content(mut self, content_type: ContentType) -> Self {
        self.content_type = content_type;
        self
    }

    fn ignore_first_lf(mut self) -> Self {
        self.ignore_first_lf = true;
        self
    }

    fn self_closing(mut self) -> Self {
        self.can_self_close = true;
        self
    }

    /// True for elements that never have children or an end tag.
    pub fn is_void(&self) -> bool {
        self.is_void
    }

    /// True when the element may be implicitly closed by its parent's end tag.
    pub fn is_closed_by_parent(&self) -> bool {
        self.closed_by_parent
    }

    /// True when opening `child` implicitly closes this element.
    pub fn is_closed_by_child(&self, child: &str) -> bool {
        self.closed_by_children
            .contains(child.to_ascii_lowercase().as_str())
    }

    /// Namespace given to this element when none is inherited.
    pub fn implicit_namespace_prefix(&self) -> Option<&'static str> {
        self.implicit_namespace_prefix
    }

    /// How the element content is tokenized.
    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    /// True when a newline directly after the start tag is dropped.
    pub fn ignores_first_lf(&self) -> bool {
        self.ignore_first_lf
    }

    /// True when `<tag />` is accepted.
    pub fn can_self_close(&self) -> bool {
        self.can_self_close
    }

    /// True when children do not inherit this element's namespace.
    pub fn prevents_namespace_inheritance(&self) -> bool {
        self.prevent_namespace_inheritance
    }
}

const P_CLOSED_BY: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "div",
    "dl",
    "fieldset",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hgroup",
    "hr",
    "main",
    "nav",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "ul",
];

/// Standard HTML elements. Anything else (custom elements, components,
/// `ng-container`, `ng-template`) may be written self-closed.
const KNOWN_ELEMENTS: &[&str] = &[
    "a", "abbr", "address", "article", "aside", "audio", "b", "bdi", "bdo", "blockquote", "body",
    "button", "canvas", "caption", "cite", "code", "colgroup", "data", "datalist", "del",
    "details", "dfn", "dialog", "div", "dl", "em", "fieldset", "figcaption", "figure", "footer",
    "form", "h1", "h2", "h3", "h4", "h5", "h6", "head", "header", "hgroup", "html", "i", "iframe",
    "ins", "kbd", "label", "legend", "main", "map", "mark", "menu", "meter", "nav", "noscript",
    "object", "output", "picture", "progress", "q", "s", "samp", "section", "select", "slot",
    "small", "span", "strong", "sub", "summary", "sup", "table", "template", "time", "u", "ul",
    "ol", "var", "video",
];

static TAG_DEFINITIONS: Lazy<FxHashMap<&'static str, TagDefinition>> = Lazy::new(|| {
    let mut defs = FxHashMap::default();

    for name in [
        "base", "meta", "area", "embed", "link", "img", "input", "param", "hr", "br", "source",
        "track", "wbr", "col",
    ] {
        defs.insert(name, TagDefinition::void());
    }

    defs.insert(
        "p",
        TagDefinition::new().closed_by(P_CLOSED_BY).closed_by_parent(),
    );
    defs.insert("thead", TagDefinition::new().closed_by(&["tbody", "tfoot"]));
    defs.insert(
        "tbody",
        TagDefinition::new()
            .closed_by(&["tbody", "tfoot"])
            .closed_by_parent(),
    );
    defs.insert(
        "tfoot",
        TagDefinition::new().closed_by(&["tbody"]).closed_by_parent(),
    );
    defs.insert(
        "tr",
        TagDefinition::new().closed_by(&["tr"]).closed_by_parent(),
    );
    for cell in ["td", "th"] {
        defs.insert(
            cell,
            TagDefinition::new().closed_by(&["td", "th"]).closed_by_parent(),
        );
    }
    defs.insert(
        "li",
        TagDefinition::new().closed_by(&["li"]).closed_by_parent(),
    );
    defs.insert("dt", TagDefinition::new().closed_by(&["dt", "dd"]));
    defs.insert(
        "dd",
        TagDefinition::new().closed_by(&["dt", "dd"]).closed_by_parent(),
    );
    for ruby in ["rb", "rt", "rp"] {
        defs.insert(
            ruby,
            TagDefinition::new()
                .closed_by(&["rb", "rt", "rtc", "rp"])
                .closed_by_parent(),
        );
    }
    defs.insert(
        "rtc",
        TagDefinition::new()
            .closed_by(&["rb", "rtc", "rp"])
            .closed_by_parent(),
    );
    defs.insert(
        "optgroup",
        TagDefinition::new().closed_by(&["optgroup"]).closed_by_parent(),
    );
    defs.insert(
        "option",
        TagDefinition::new()
            .closed_by(&["option", "optgroup"])
            .closed_by_parent(),
    );

    defs.insert("svg", TagDefinition::new().namespace("svg").self_closing());
    defs.insert(
        "foreignObject",
        TagDefinition {
            prevent_namespace_inheritance: true,
            ..TagDefinition::new().namespace("svg").self_closing()
        },
    );
    defs.insert("math", TagDefinition::new().namespace("math").self_closing());

    defs.insert("pre", TagDefinition::new().ignore_first_lf());
    defs.insert("listing", TagDefinition::new().ignore_first_lf());
    defs.insert("style", TagDefinition::new().content(ContentType::RawText));
    defs.insert("script", TagDefinition::new().content(ContentType::RawText));
    defs.insert(
        "title",
        TagDefinition::new().content(ContentType::EscapableRawText),
    );
    defs.insert(
        "textarea",
        TagDefinition::new()
            .content(ContentType::EscapableRawText)
            .ignore_first_lf(),
    );

    for name in KNOWN_ELEMENTS {
        defs.entry(*name).or_insert_with(TagDefinition::new);
    }
    defs
});

static UNKNOWN_ELEMENT: Lazy<TagDefinition> = Lazy::new(|| TagDefinition::new().self_closing());

/// Returns the parsing rules for a local (namespace-free) tag name.
///
/// Lookup tries the exact spelling first so that `foreignObject` matches, then
/// the lowercase form.
pub fn tag_definition(name: &str) -> &'static TagDefinition {
    TAG_DEFINITIONS
        .get(name)
        .or_else(|| TAG_DEFINITIONS.get(name.to_ascii_lowercase().as_str()))
        .unwrap_or(&UNKNOWN_ELEMENT)
}

/// Splits `:svg:path` into `(Some("svg"), "path")`.
pub fn split_ns_name(name: &str) -> (Option<&str>, &str) {
    if let Some(rest) = name.strip_prefix(':') {
        if let Some(colon) = rest.find(':') {
            return (Some(&rest[..colon]), &rest[colon + 1..]);
        }
    }
    (None, name)
}

/// Joins a namespace prefix and a local name the way element names are stored.
pub fn merge_ns_name(prefix: Option<&str>, local: &str) -> String {
    match prefix {
        Some(prefix) => format!(":{prefix}:{local}"),
        None => local.to_string(),
    }
}

/// Returns the namespace prefix of a stored element name.
pub fn ns_prefix(name: &str) -> Option<&str> {
    split_ns_name(name).0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_void_elements() {
        assert!(tag_definition("img").is_void());
        assert!(tag_definition("IMG").is_void());
        assert!(tag_definition("col").can_self_close());
        assert!(!tag_definition("div").is_void());
    }

    #[test]
    fn test_implied_end_tags() {
        assert!(tag_definition("li").is_closed_by_child("li"));
        assert!(tag_definition("p").is_closed_by_child("div"));
        assert!(!tag_definition("p").is_closed_by_child("span"));
        assert!(tag_definition("td").is_closed_by_parent());
        assert!(!tag_definition("div").is_closed_by_parent());
    }

    #[test]
    fn test_self_close_rules() {
        assert!(!tag_definition("div").can_self_close());
        assert!(tag_definition("app-hero").can_self_close());
        assert!(tag_definition("ng-container").can_self_close());
    }

    #[test]
    fn test_namespaces() {
        assert_eq!(tag_definition("svg").implicit_namespace_prefix(), Some("svg"));
        assert!(tag_definition("foreignObject").prevents_namespace_inheritance());
        assert_eq!(split_ns_name(":svg:path"), (Some("svg"), "path"));
        assert_eq!(split_ns_name("path"), (None, "path"));
        assert_eq!(merge_ns_name(Some("math"), "mi"), ":math:mi");
        assert_eq!(ns_prefix(":svg:svg"), Some("svg"));
    }

    #[test]
    fn test_raw_text_content() {
        assert_eq!(tag_definition("script").content_type(), ContentType::RawText);
        assert_eq!(
            tag_definition("textarea").content_type(),
            ContentType::EscapableRawText
        );
        assert!(tag_definition("pre").ignores_first_lf());
    }
}
