//! HTML serialization of the syntax tree.

use crate::tree::{Element, Node};

/// Elements serialized without a closing tag.
const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "link", "meta"];

/// Block elements followed by a newline for readable output.
const BLOCK_ELEMENTS: &[&str] = &[
    "blockquote", "div", "h1", "h2", "h3", "h4", "h5", "h6", "hr", "li", "ol", "p", "pre",
    "section", "table", "tbody", "thead", "tr", "ul",
];

/// Serializes nodes to HTML.
///
/// Text and attribute values are escaped, raw nodes are written verbatim. The
/// `class` attribute always comes first.
pub fn to_html_string(nodes: &[Node]) -> String {
    let mut out = String::new();
    write_nodes(nodes, &mut out);
    out
}

fn write_nodes(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Element(element) => write_element(element, out),
            Node::Text(text) => escape_text(text, out),
            Node::Raw(raw) => out.push_str(raw),
        }
    }
}

fn write_element(element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&element.tag_name);

    if !element.properties.class_name.is_empty() {
        out.push_str(" class=\"");
        escape_attribute(&element.properties.class_name.join(" "), out);
        out.push('"');
    }

    for (name, value) in element.properties.attributes() {
        out.push(' ');
        out.push_str(name);
        // Boolean attributes such as `checked` and `disabled`.
        if !value.is_empty() || !is_boolean_attribute(name) {
            out.push_str("=\"");
            escape_attribute(value, out);
            out.push('"');
        }
    }

    out.push('>');

    let tag = element.tag_name.as_str();
    if VOID_ELEMENTS.contains(&tag) {
        if BLOCK_ELEMENTS.contains(&tag) {
            out.push('\n');
        }
        return;
    }

    write_nodes(&element.children, out);

    out.push_str("</");
    out.push_str(tag);
    out.push('>');
    if BLOCK_ELEMENTS.contains(&tag) {
        out.push('\n');
    }
}

fn is_boolean_attribute(name: &str) -> bool {
    matches!(name, "checked" | "disabled")
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
}

fn escape_attribute(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
}
