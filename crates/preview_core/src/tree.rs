//! HTML-shaped syntax tree shared by all pipeline stages.
//!
//! The tree is produced by the parse stage, mutated in place by every
//! transform stage and finally serialized by the stringify stage. Exactly one
//! tree is alive per render pass.

use crate::pipeline::Frontmatter;

/// Elements whose text must never be touched by prose transforms.
const CODE_LIKE_TAGS: &[&str] = &["pre", "code", "kbd", "samp", "script", "style"];

/// A node of the syntax tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    /// Markup passed through verbatim (inline or block HTML from the source).
    Raw(String),
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Returns the heading rank (1-6) if this node is a `h1`..`h6` element.
    pub fn heading_rank(&self) -> Option<u8> {
        self.as_element().and_then(Element::heading_rank)
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

/// Attributes of an element.
///
/// The class list is kept apart from the other attributes so that stages can
/// add and query classes without string splitting. Attribute order is
/// insertion order, which keeps the serialized output deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    pub class_name: Vec<String>,
    attributes: Vec<(String, String)>,
}

impl Properties {
    pub fn has_class(&self, class: &str) -> bool {
        self.class_name.iter().any(|c| c == class)
    }

    /// Appends `class` unless it is already present.
    pub fn add_class(&mut self, class: impl Into<String>) {
        let class = class.into();
        if !self.has_class(&class) {
            self.class_name.push(class);
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Sets an attribute, replacing the value in place if it already exists.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

/// An element node: tag name, properties and ordered children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag_name: String,
    pub properties: Properties,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            properties: Properties::default(),
            children: Vec::new(),
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.properties.add_class(class);
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.set(name, value);
        self
    }

    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_child(Node::Text(text.into()))
    }

    pub fn is(&self, tag_name: &str) -> bool {
        self.tag_name == tag_name
    }

    pub fn heading_rank(&self) -> Option<u8> {
        match self.tag_name.as_str() {
            "h1" => Some(1),
            "h2" => Some(2),
            "h3" => Some(3),
            "h4" => Some(4),
            "h5" => Some(5),
            "h6" => Some(6),
            _ => None,
        }
    }

    pub fn is_code_like(&self) -> bool {
        CODE_LIKE_TAGS.contains(&self.tag_name.as_str())
    }

    /// First direct child element with the given tag.
    pub fn child_element(&self, tag_name: &str) -> Option<&Element> {
        self.children
            .iter()
            .filter_map(Node::as_element)
            .find(|child| child.is(tag_name))
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self) -> String {
        text_content(&self.children)
    }
}

/// Root of the syntax tree, plus the data the parse stage extracts on the side.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Root {
    pub children: Vec<Node>,
    pub frontmatter: Option<Frontmatter>,
}

impl Root {
    pub fn new(children: Vec<Node>) -> Self {
        Self {
            children,
            frontmatter: None,
        }
    }

    /// Visits every element depth-first in document order.
    ///
    /// The callback sees a parent before its children, so children inserted by
    /// the callback are visited as well.
    pub fn visit_elements_mut(&mut self, f: &mut dyn FnMut(&mut Element)) {
        visit_elements_mut(&mut self.children, f);
    }

    pub fn visit_elements(&self, f: &mut dyn FnMut(&Element)) {
        visit_elements(&self.children, f);
    }

    /// Rewrites prose text nodes, see [`rewrite_text`].
    pub fn rewrite_text(&mut self, f: &mut dyn FnMut(&str) -> Option<Vec<Node>>) {
        rewrite_text(&mut self.children, f);
    }
}

pub fn visit_elements_mut(nodes: &mut [Node], f: &mut dyn FnMut(&mut Element)) {
    for node in nodes {
        if let Node::Element(element) = node {
            f(element);
            visit_elements_mut(&mut element.children, f);
        }
    }
}

pub fn visit_elements(nodes: &[Node], f: &mut dyn FnMut(&Element)) {
    for node in nodes {
        if let Node::Element(element) = node {
            f(element);
            visit_elements(&element.children, f);
        }
    }
}

/// Replaces text nodes outside of code-like elements.
///
/// `f` returns `None` to keep a text node as is, or the nodes to splice in its
/// place. Replacement nodes are not revisited.
pub fn rewrite_text(nodes: &mut Vec<Node>, f: &mut dyn FnMut(&str) -> Option<Vec<Node>>) {
    let mut i = 0;
    while i < nodes.len() {
        let replacement = match &mut nodes[i] {
            Node::Element(element) => {
                if !element.is_code_like() {
                    rewrite_text(&mut element.children, f);
                }
                None
            }
            Node::Text(text) => f(text),
            Node::Raw(_) => None,
        };

        match replacement {
            Some(replacement) => {
                let len = replacement.len();
                nodes.splice(i..=i, replacement);
                i += len;
            }
            None => i += 1,
        }
    }
}

pub fn text_content(nodes: &[Node]) -> String {
    let mut text = String::new();
    collect_text(nodes, &mut text);
    text
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Element(element) => collect_text(&element.children, out),
            Node::Text(text) => out.push_str(text),
            Node::Raw(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Root {
        Root::new(vec![
            Element::new("p").with_text("one...").into(),
            Element::new("pre")
                .with_child(Element::new("code").with_text("two..."))
                .into(),
            Node::Raw("<!-- three... -->".to_string()),
        ])
    }

    #[test]
    fn test_properties_set_replaces_in_place() {
        let mut props = Properties::default();
        props.set("id", "a");
        props.set("title", "t");
        props.set("id", "b");
        let attrs: Vec<_> = props.attributes().collect();
        assert_eq!(attrs, vec![("id", "b"), ("title", "t")]);
    }

    #[test]
    fn test_add_class_deduplicates() {
        let mut props = Properties::default();
        props.add_class("x");
        props.add_class("x");
        props.add_class("y");
        assert_eq!(props.class_name, vec!["x", "y"]);
    }

    #[test]
    fn test_rewrite_text_skips_code() {
        let mut root = sample();
        root.rewrite_text(&mut |text| Some(vec![Node::text(text.replace("...", "!"))]));
        assert_eq!(text_content(&root.children), "one!two...");
    }

    #[test]
    fn test_rewrite_text_splices_multiple_nodes() {
        let mut root = Root::new(vec![Element::new("p").with_text("a b").into()]);
        root.rewrite_text(&mut |text| {
            let (left, right) = text.split_once(' ')?;
            Some(vec![
                Node::text(left),
                Element::new("br").into(),
                Node::text(right),
            ])
        });
        let p = root.children[0].as_element().unwrap();
        assert_eq!(p.children.len(), 3);
        assert_eq!(p.text_content(), "ab");
    }

    #[test]
    fn test_visit_order_is_preorder() {
        let root = sample();
        let mut tags = Vec::new();
        root.visit_elements(&mut |el| tags.push(el.tag_name.clone()));
        assert_eq!(tags, vec!["p", "pre", "code"]);
    }
}
