use std::ops::Range;

use crate::SyntaxKind;

/// A block tag of a documentation comment, e.g. `@schema` or `@deprecated use Other`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocTag {
    pub name: String,
    pub comment: Option<String>,
}

impl DocTag {
    /// Extracts the block tags of a `/** ... */` comment.
    pub fn parse_comment(comment: &str) -> Vec<DocTag> {
        let body = comment
            .trim_start_matches("/**")
            .trim_end_matches("*/");

        let mut tags: Vec<DocTag> = Vec::new();
        for line in body.lines() {
            let line = line.trim().trim_start_matches('*').trim();
            if let Some(tagged) = line.strip_prefix('@') {
                let (name, rest) = tagged
                    .split_once(char::is_whitespace)
                    .unwrap_or((tagged, ""));
                if name.is_empty() {
                    continue;
                }
                let rest = rest.trim();
                tags.push(DocTag {
                    name: name.to_string(),
                    comment: (!rest.is_empty()).then(|| rest.to_string()),
                });
            } else if let Some(last) = tags.last_mut() {
                // continuation line of the previous tag's comment
                if !line.is_empty() {
                    let comment = last.comment.get_or_insert_with(String::new);
                    if !comment.is_empty() {
                        comment.push(' ');
                    }
                    comment.push_str(line);
                }
            }
        }
        tags
    }
}

/// A node of the declaration tree.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    kind: SyntaxKind,
    text: Option<String>,
    children: Vec<Node>,
    tags: Vec<DocTag>,
    span: Range<usize>,
}

impl Node {
    pub fn new(kind: SyntaxKind, span: Range<usize>) -> Self {
        Self {
            kind,
            text: None,
            children: Vec::new(),
            tags: Vec::new(),
            span,
        }
    }

    pub fn with_text(kind: SyntaxKind, text: impl Into<String>, span: Range<usize>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::new(kind, span)
        }
    }

    pub fn kind(&self) -> SyntaxKind {
        self.kind
    }

    /// The identifier name or literal value carried by this node, if any.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// Documentation tags attached to this declaration.
    pub fn tags(&self) -> &[DocTag] {
        &self.tags
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|tag| tag.name == name)
    }

    /// Direct children, in source order.
    pub fn children(&self) -> impl Iterator<Item = &Node> {
        self.children.iter()
    }

    pub fn first_child(&self, kind: SyntaxKind) -> Option<&Node> {
        self.children.iter().find(|c| c.kind == kind)
    }

    pub fn first_child_of(&self, kinds: &[SyntaxKind]) -> Option<&Node> {
        self.children.iter().find(|c| kinds.contains(&c.kind))
    }

    pub fn first_child_where(&self, predicate: impl Fn(SyntaxKind) -> bool) -> Option<&Node> {
        self.children.iter().find(|c| predicate(c.kind))
    }

    pub fn children_of<'a>(
        &'a self,
        kinds: &'a [SyntaxKind],
    ) -> impl Iterator<Item = &'a Node> + 'a {
        self.children.iter().filter(move |c| kinds.contains(&c.kind))
    }

    pub fn has_child(&self, kind: SyntaxKind) -> bool {
        self.first_child(kind).is_some()
    }

    /// This node and all of its descendants, in pre-order.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    pub fn find_all(&self, kind: SyntaxKind) -> impl Iterator<Item = &Node> {
        self.descendants().filter(move |n| n.kind == kind)
    }

    pub(crate) fn push(&mut self, child: Node) {
        self.children.push(child);
    }

    pub(crate) fn set_tags(&mut self, tags: Vec<DocTag>) {
        self.tags = tags;
    }

    pub(crate) fn set_end(&mut self, end: usize) {
        self.span.end = end.max(self.span.start);
    }
}

pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
