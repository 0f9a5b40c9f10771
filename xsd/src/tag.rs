//! A small nested-node model of the emitted XSD document and its text rendering.

use std::fmt;

use indexmap::IndexMap;

use crate::builtins::XS_PREFIX;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Content {
    Tag(Tag),
    Text(String),
}

impl From<Tag> for Content {
    fn from(tag: Tag) -> Self {
        Self::Tag(tag)
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// An XSD construct. `name` is stored without prefix, e.g. `complexType`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tag {
    name: String,
    attrs: IndexMap<String, String>,
    /// `None` renders as a self-closing tag.
    value: Option<Vec<Content>>,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: IndexMap::new(),
            value: None,
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: impl Into<Content>) -> Self {
        self.add(child);
        self
    }

    pub fn with_children<C: Into<Content>>(mut self, children: impl IntoIterator<Item = C>) -> Self {
        for child in children {
            self.add(child);
        }
        self
    }

    /// Appends to the content, creating it if the tag was self-closing so far.
    pub fn add(&mut self, child: impl Into<Content>) {
        self.value.get_or_insert_with(Vec::new).push(child.into());
    }

    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attrs.insert(key.into(), value.into());
    }

    /// Wraps `inner` in `chain`, outermost first: `nest([a, b], c)` is `<a><b><c/></b></a>`.
    pub fn nest(chain: impl IntoIterator<Item = Tag>, inner: Tag) -> Tag {
        let chain: Vec<Tag> = chain.into_iter().collect();
        chain
            .into_iter()
            .rev()
            .fold(inner, |nested, outer| outer.with_child(nested))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn content(&self) -> Option<&[Content]> {
        self.value.as_deref()
    }

    /// Child tags, skipping text.
    pub fn children(&self) -> impl Iterator<Item = &Tag> {
        self.value.iter().flatten().filter_map(|content| match content {
            Content::Tag(tag) => Some(tag),
            Content::Text(_) => None,
        })
    }

    pub fn is_self_closing(&self) -> bool {
        self.value.is_none()
    }

    /// Stable sort of the content by `rank`; equal ranks keep their order.
    pub fn sort_children_by_key<K: Ord>(&mut self, rank: impl FnMut(&Content) -> K) {
        if let Some(value) = &mut self.value {
            value.sort_by_key(rank);
        }
    }

    pub fn render(&self, level: usize, indent: &str) -> String {
        let mut out = String::new();
        self.write_to(&mut out, level, indent);
        out
    }

    pub fn render_with(&self, options: &RenderOptions) -> String {
        self.render(0, &options.indent)
    }

    fn write_to(&self, out: &mut String, level: usize, indent: &str) {
        let indentation = indent.repeat(level);
        out.push_str(&indentation);
        out.push('<');
        push_name(out, &self.name);
        for (key, value) in &self.attrs {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            escape_into(out, value, true);
            out.push('"');
        }

        let Some(value) = &self.value else {
            out.push_str("/>");
            return;
        };
        out.push('>');

        if value.iter().all(|c| matches!(c, Content::Text(_))) {
            // text-only content stays on one line
            for content in value {
                if let Content::Text(text) = content {
                    escape_into(out, text, false);
                }
            }
        } else {
            for content in value {
                out.push('\n');
                match content {
                    Content::Tag(tag) => tag.write_to(out, level + 1, indent),
                    Content::Text(text) => {
                        out.push_str(&indent.repeat(level + 1));
                        escape_into(out, text, false);
                    }
                }
            }
            out.push('\n');
            out.push_str(&indentation);
        }

        out.push_str("</");
        push_name(out, &self.name);
        out.push('>');
    }
}

fn push_name(out: &mut String, name: &str) {
    out.push_str(XS_PREFIX);
    out.push(':');
    out.push_str(name);
}

fn escape_into(out: &mut String, text: &str, attribute: bool) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(0, RenderOptions::DEFAULT_INDENT))
    }
}

/// Layout of rendered output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderOptions {
    /// Inserted once per nesting level.
    pub indent: String,
}

impl RenderOptions {
    pub const DEFAULT_INDENT: &'static str = "  ";

    pub fn spaces(width: usize) -> Self {
        Self {
            indent: " ".repeat(width),
        }
    }

    pub fn tabs() -> Self {
        Self {
            indent: "\t".to_string(),
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            indent: Self::DEFAULT_INDENT.to_string(),
        }
    }
}
