//! Flexible paragraphs: a leading `~` marker classifies and aligns a paragraph.
//!
//! ```text
//! ~ a flexible paragraph
//! ~> aligned to the right
//! ~ab| centered, classified as `a` and `b`
//! ```

use super::{PipelineError, Transform};
use crate::tree::{Element, Node, Root};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

static MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^~([a-z]*)([<>|=]?)[ \t]+").expect("valid paragraph marker regex"));

const CLASS_PREFIX: &str = "flexible-paragraph";

/// Paragraph alignment selected by the character after the classifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphAlignment {
    Left,
    Right,
    Center,
    Justify,
}

impl ParagraphAlignment {
    fn from_marker(marker: &str) -> Option<Self> {
        match marker {
            "<" => Some(Self::Left),
            ">" => Some(Self::Right),
            "|" => Some(Self::Center),
            "=" => Some(Self::Justify),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Center => "center",
            Self::Justify => "justify",
        }
    }
}

/// Turns `~`-prefixed paragraphs into classified `p.flexible-paragraph`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlexibleParagraphs;

#[async_trait]
impl Transform for FlexibleParagraphs {
    fn name(&self) -> &'static str {
        "flexible-paragraphs"
    }

    async fn transform(&self, tree: &mut Root) -> Result<(), PipelineError> {
        tree.visit_elements_mut(&mut flex_paragraph);
        Ok(())
    }
}

fn flex_paragraph(element: &mut Element) {
    if !element.is("p") {
        return;
    }
    let Some(Node::Text(text)) = element.children.first_mut() else {
        return;
    };
    let Some(caps) = MARKER.captures(text) else {
        return;
    };

    let marker_len = caps[0].len();
    let classifications: Vec<String> = caps[1]
        .chars()
        .map(|c| format!("{CLASS_PREFIX}-{c}"))
        .collect();
    let alignment = ParagraphAlignment::from_marker(&caps[2]);

    text.replace_range(..marker_len, "");
    if text.is_empty() {
        element.children.remove(0);
    }

    element.properties.add_class(CLASS_PREFIX);
    for class in classifications {
        element.properties.add_class(class);
    }
    if let Some(alignment) = alignment {
        element
            .properties
            .add_class(format!("{CLASS_PREFIX}-align-{}", alignment.name()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flexed(paragraph: Element) -> Element {
        let mut root = Root::new(vec![paragraph.into()]);
        root.visit_elements_mut(&mut flex_paragraph);
        root.children[0].as_element().unwrap().clone()
    }

    #[test]
    fn test_plain_marker() {
        let p = flexed(Element::new("p").with_text("~ Hello"));
        assert_eq!(p.properties.class_name, vec!["flexible-paragraph"]);
        assert_eq!(p.text_content(), "Hello");
    }

    #[test]
    fn test_classifications_and_alignment() {
        let p = flexed(Element::new("p").with_text("~ab| Centered"));
        assert_eq!(
            p.properties.class_name,
            vec![
                "flexible-paragraph",
                "flexible-paragraph-a",
                "flexible-paragraph-b",
                "flexible-paragraph-align-center"
            ]
        );
        assert_eq!(p.text_content(), "Centered");

        let p = flexed(Element::new("p").with_text("~> Right"));
        assert!(p.properties.has_class("flexible-paragraph-align-right"));
    }

    #[test]
    fn test_marker_before_inline_markup() {
        let p = flexed(
            Element::new("p")
                .with_text("~= ")
                .with_child(Element::new("em").with_text("wide")),
        );
        assert!(p.properties.has_class("flexible-paragraph-align-justify"));
        assert_eq!(p.children.len(), 1);
        assert!(p.child_element("em").is_some());
    }

    #[test]
    fn test_not_a_marker() {
        for text in ["~5 minutes", "~", "a ~ b", "~A shout"] {
            let p = flexed(Element::new("p").with_text(text));
            assert!(p.properties.class_name.is_empty(), "{text:?}");
            assert_eq!(p.text_content(), text);
        }
    }

    #[test]
    fn test_only_paragraphs() {
        let mut root = Root::new(vec![Element::new("pre")
            .with_child(Element::new("code").with_text("~ keep"))
            .into()]);
        let before = root.clone();
        root.visit_elements_mut(&mut flex_paragraph);
        assert_eq!(root, before);
    }
}
