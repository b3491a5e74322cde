//! Directive containers and GitHub-style admonitions.
//!
//! Two source conventions end up as the same container element:
//!
//! ```text
//! :::warning Mind the gap
//! Body
//! :::
//!
//! > [!WARNING]
//! > Body
//! ```
//!
//! `:::` containers are recognized before parsing and replaced with comment
//! markers that the tree builder turns into elements. Callouts are rewritten
//! after parsing by the [`Admonitions`] stage.
//!
//! The single-line forms are handled on the tree by [`InlineDirectives`]:
//! `::name[label]{attrs}` alone in a paragraph becomes a `div`, and
//! `:name[label]{attrs}` inside prose becomes a `span`.

use super::{PipelineError, Transform};
use crate::tree::{Element, Node, Properties, Root};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use pulldown_cmark::{Event, Options, Parser, Tag};
use std::borrow::Cow;
use regex::Regex;
use std::ops::Range;

static LEAF_DIRECTIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^::([A-Za-z][\w-]*)(?:\[([^\]\n]*)\])?(?:\{([^}\n]*)\})?\s*$")
        .expect("valid leaf directive regex")
});

static TEXT_DIRECTIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(^|[^:\w]):([A-Za-z][\w-]*)\[([^\]\n]*)\](?:\{([^}\n]*)\})?")
        .expect("valid text directive regex")
});

static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"#([\w-]+)|\.([\w-]+)|([\w:-]+)(?:=(?:"([^"]*)"|'([^']*)'|([^\s"']+)))?"#)
        .expect("valid directive attribute regex")
});

pub(crate) const CONTAINER_OPEN_PREFIX: &str = "<!--directive:";
pub(crate) const CONTAINER_CLOSE: &str = "<!--/directive-->";

/// GitHub callout types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmonitionKind {
    Note,
    Tip,
    Important,
    Warning,
    Caution,
}

impl AdmonitionKind {
    pub const ALL: &'static [AdmonitionKind] = &[
        Self::Note,
        Self::Tip,
        Self::Important,
        Self::Warning,
        Self::Caution,
    ];

    /// Case-insensitive lookup by directive name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Tip => "tip",
            Self::Important => "important",
            Self::Warning => "warning",
            Self::Caution => "caution",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Note => "Note",
            Self::Tip => "Tip",
            Self::Important => "Important",
            Self::Warning => "Warning",
            Self::Caution => "Caution",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Note => "fas fa-info-circle",
            Self::Tip => "fas fa-lightbulb",
            Self::Important => "fas fa-exclamation-circle",
            Self::Warning => "fas fa-exclamation-triangle",
            Self::Caution => "fas fa-fire",
        }
    }
}

/// Detects a `[!TYPE]` callout marker at the start of `text`.
///
/// Returns the callout kind and the text following the marker.
///
/// # Example
///
/// ```
/// use preview_core::pipeline::{detect_admonition, AdmonitionKind};
///
/// let (kind, rest) = detect_admonition("[!NOTE] Something").unwrap();
/// assert_eq!(kind, AdmonitionKind::Note);
/// assert_eq!(rest, "Something");
/// ```
pub fn detect_admonition(text: &str) -> Option<(AdmonitionKind, &str)> {
    let rest = text.trim_start().strip_prefix("[!")?;
    let (name, rest) = rest.split_once(']')?;
    let kind = AdmonitionKind::from_name(name)?;
    Some((kind, rest.trim_start()))
}

/// A `:::` container found in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ContainerSpec {
    pub name: String,
    pub title: Option<String>,
}

/// Builds the container element shared by `:::` directives and callouts.
pub(crate) fn container_element(name: &str, title: Option<&str>) -> Element {
    let mut element = Element::new("div");
    element.properties = container_properties(name);

    let admonition = AdmonitionKind::from_name(name);
    let title = title
        .filter(|t| !t.is_empty())
        .or_else(|| admonition.map(|kind| kind.title()));

    if let Some(title) = title {
        let mut title_row = Element::new("div").with_class("directive-title");
        if let Some(kind) = admonition {
            let mut icon = Element::new("i").with_attribute("aria-hidden", "true");
            for class in kind.icon().split_whitespace() {
                icon.properties.add_class(class);
            }
            title_row = title_row.with_child(icon);
        }
        element
            .children
            .push(title_row.with_child(Element::new("span").with_text(title)).into());
    }

    element
}

fn container_properties(name: &str) -> Properties {
    let mut properties = directive_properties(name);
    if AdmonitionKind::from_name(name).is_some() {
        properties.add_class("admonition");
    }
    properties
}

fn directive_properties(name: &str) -> Properties {
    let name = name.to_ascii_lowercase();
    let mut properties = Properties::default();
    properties.add_class("directive");
    properties.add_class(format!("directive-{name}"));
    properties.set("data-directive", name);
    properties
}

/// Applies a `{#id .class key=value key="quoted value"}` attribute list.
fn apply_attributes(properties: &mut Properties, attributes: &str) {
    for caps in ATTRIBUTE.captures_iter(attributes) {
        if let Some(id) = caps.get(1) {
            properties.set("id", id.as_str());
        } else if let Some(class) = caps.get(2) {
            properties.add_class(class.as_str());
        } else if let Some(name) = caps.get(3) {
            let value = caps
                .get(4)
                .or_else(|| caps.get(5))
                .or_else(|| caps.get(6))
                .map_or("", |value| value.as_str());
            if name.as_str() == "class" {
                for class in value.split_whitespace() {
                    properties.add_class(class);
                }
            } else {
                properties.set(name.as_str(), value);
            }
        }
    }
}

fn directive_element(
    tag_name: &str,
    name: &str,
    label: Option<&str>,
    attributes: Option<&str>,
) -> Element {
    let mut element = Element::new(tag_name);
    element.properties = directive_properties(name);
    if let Some(attributes) = attributes {
        apply_attributes(&mut element.properties, attributes);
    }
    if let Some(label) = label.filter(|label| !label.is_empty()) {
        element.children.push(Node::text(label));
    }
    element
}

/// Byte ranges of blocks whose content is verbatim: code, raw HTML and
/// metadata blocks.
fn verbatim_ranges(source: &str, options: Options) -> Vec<Range<usize>> {
    Parser::new_ext(source, options)
        .into_offset_iter()
        .filter_map(|(event, range)| match event {
            Event::Start(Tag::CodeBlock(_) | Tag::HtmlBlock | Tag::MetadataBlock(_)) => {
                Some(range)
            }
            _ => None,
        })
        .collect()
}

/// Columns of leading whitespace, tabs counting as a full tab stop.
fn indent_width(line: &str) -> usize {
    let mut width = 0;
    for c in line.chars() {
        match c {
            ' ' => width += 1,
            '\t' => width += 4 - width % 4,
            _ => break,
        }
    }
    width
}

/// Replaces `:::name Title` / `:::` lines with comment markers.
///
/// Lines inside code, raw HTML or metadata blocks are kept as is; the block
/// boundaries come from parsing `source` with `options`. Container lines
/// must be indented less than four columns. The returned specs are indexed
/// by the number in each opening marker. A closing `:::` without an open
/// container is left as text.
pub(crate) fn extract_containers(
    source: &str,
    options: Options,
) -> (Cow<'_, str>, Vec<ContainerSpec>) {
    if !source.contains(":::") {
        return (Cow::Borrowed(source), Vec::new());
    }

    let verbatim = verbatim_ranges(source, options);
    let mut specs = Vec::new();
    let mut output = String::with_capacity(source.len() + 64);
    let mut depth = 0usize;
    let mut offset = 0usize;

    for line in source.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();

        let trimmed = line.trim_start();
        let marker_at = line_start + (line.len() - trimmed.len());
        if !trimmed.starts_with(":::")
            || indent_width(line) >= 4
            || verbatim.iter().any(|range| range.contains(&marker_at))
        {
            output.push_str(line);
            continue;
        }

        let rest = trimmed.trim_start_matches(':').trim();
        if rest.is_empty() {
            if depth > 0 {
                depth -= 1;
                output.push('\n');
                output.push_str(CONTAINER_CLOSE);
                output.push_str("\n\n");
                continue;
            }
        } else if let Some(spec) = parse_container_line(rest) {
            output.push('\n');
            output.push_str(&format!("{CONTAINER_OPEN_PREFIX}{}-->", specs.len()));
            output.push_str("\n\n");
            specs.push(spec);
            depth += 1;
            continue;
        }

        output.push_str(line);
    }

    (Cow::Owned(output), specs)
}

/// Parses `name Title`, `name[Title]` or `name`.
fn parse_container_line(rest: &str) -> Option<ContainerSpec> {
    let name_end = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .unwrap_or(rest.len());
    let (name, tail) = rest.split_at(name_end);
    if name.is_empty() {
        return None;
    }

    let tail = tail.trim();
    let title = if let Some(label) = tail.strip_prefix('[') {
        label.split_once(']').map(|(label, _)| label.trim().to_string())
    } else if tail.is_empty() {
        None
    } else {
        Some(tail.to_string())
    };

    Some(ContainerSpec {
        name: name.to_string(),
        title,
    })
}

/// Converts GitHub callout blockquotes into directive containers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Admonitions;

#[async_trait]
impl Transform for Admonitions {
    fn name(&self) -> &'static str {
        "admonitions"
    }

    async fn transform(&self, tree: &mut Root) -> Result<(), PipelineError> {
        tree.visit_elements_mut(&mut convert_callout);
        Ok(())
    }
}

fn convert_callout(element: &mut Element) {
    if !element.is("blockquote") {
        return;
    }

    let Some(first_paragraph) = element.children.iter_mut().find_map(|node| match node {
        Node::Element(el) => Some(el),
        _ => None,
    }) else {
        return;
    };
    if !first_paragraph.is("p") {
        return;
    }
    let Some(Node::Text(first_text)) = first_paragraph.children.first_mut() else {
        return;
    };
    let Some((kind, rest)) = detect_admonition(first_text) else {
        return;
    };

    let rest = rest.to_string();
    if rest.is_empty() {
        first_paragraph.children.remove(0);
    } else {
        *first_text = rest;
    }

    // Drop the paragraph entirely when it only held the marker.
    let paragraph_is_empty = first_paragraph.children.iter().all(|child| match child {
        Node::Text(text) => text.trim().is_empty(),
        _ => false,
    });
    if paragraph_is_empty {
        if let Some(idx) = element
            .children
            .iter()
            .position(|node| node.as_element().is_some())
        {
            element.children.remove(idx);
        }
    }

    let container = container_element(kind.name(), None);
    element.tag_name = container.tag_name;
    element.properties = container.properties;
    for (idx, child) in container.children.into_iter().enumerate() {
        element.children.insert(idx, child);
    }
}

/// Converts leaf (`::name[label]`) and text (`:name[label]`) directives.
///
/// A text directive needs a `[label]` so that ordinary colons in prose stay
/// untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineDirectives;

#[async_trait]
impl Transform for InlineDirectives {
    fn name(&self) -> &'static str {
        "directives"
    }

    async fn transform(&self, tree: &mut Root) -> Result<(), PipelineError> {
        tree.visit_elements_mut(&mut convert_leaf_directive);
        tree.rewrite_text(&mut split_text_directives);
        Ok(())
    }
}

fn convert_leaf_directive(element: &mut Element) {
    if !element.is("p") {
        return;
    }
    let [Node::Text(text)] = element.children.as_slice() else {
        return;
    };
    let Some(caps) = LEAF_DIRECTIVE.captures(text.trim()) else {
        return;
    };

    let directive = directive_element(
        "div",
        &caps[1],
        caps.get(2).map(|m| m.as_str()),
        caps.get(3).map(|m| m.as_str()),
    );
    *element = directive;
}

fn split_text_directives(text: &str) -> Option<Vec<Node>> {
    if !text.contains(':') || !text.contains('[') {
        return None;
    }

    let mut nodes = Vec::new();
    let mut last = 0;
    for caps in TEXT_DIRECTIVE.captures_iter(text) {
        let (Some(whole), Some(prefix)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if prefix.end() > last {
            nodes.push(Node::text(&text[last..prefix.end()]));
        }
        nodes.push(
            directive_element(
                "span",
                &caps[2],
                Some(&caps[3]),
                caps.get(4).map(|m| m.as_str()),
            )
            .into(),
        );
        last = whole.end();
    }

    if nodes.is_empty() {
        return None;
    }
    if last < text.len() {
        nodes.push(Node::text(&text[last..]));
    }
    Some(nodes)
}
