//! Copy-to-clipboard buttons around code blocks.

use super::{PipelineError, Transform};
use crate::tree::{Element, Node, Root};
use async_trait::async_trait;

const WRAPPER_CLASS: &str = "code-wrapper";

const BOLT_ICON: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" height="24" viewBox="0 0 24 24" width="24"><path d="M4 14L14 3v7h6L10 21v-7z"/></svg>"#;

/// Wraps each `<pre><code>` in `div.code-wrapper` with a leading
/// `button.copy-button`. The click behavior belongs to the page script.
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyButtons;

#[async_trait]
impl Transform for CopyButtons {
    fn name(&self) -> &'static str {
        "copy-buttons"
    }

    async fn transform(&self, tree: &mut Root) -> Result<(), PipelineError> {
        wrap_code_blocks(&mut tree.children);
        Ok(())
    }
}

fn copy_button() -> Element {
    Element::new("button")
        .with_class("copy-button")
        .with_attribute("type", "button")
        .with_attribute("aria-label", "Copy code")
        .with_child(Node::Raw(BOLT_ICON.to_string()))
}

fn wrap_code_blocks(nodes: &mut [Node]) {
    for node in nodes {
        let Node::Element(element) = node else {
            continue;
        };

        if element.properties.has_class(WRAPPER_CLASS) {
            continue;
        }

        if element.is("pre") {
            if element.child_element("code").is_some() {
                let pre = std::mem::replace(element, Element::new("div"));
                *element = Element::new("div")
                    .with_class(WRAPPER_CLASS)
                    .with_child(copy_button())
                    .with_child(pre);
            }
        } else {
            wrap_code_blocks(&mut element.children);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> Root {
        Root::new(vec![Element::new("section")
            .with_child(
                Element::new("pre").with_child(Element::new("code").with_text("ls")),
            )
            .into()])
    }

    #[tokio::test]
    async fn test_wraps_code_block() {
        let mut root = document();
        CopyButtons.transform(&mut root).await.unwrap();

        let section = root.children[0].as_element().unwrap();
        let wrapper = section.children[0].as_element().unwrap();
        assert!(wrapper.properties.has_class("code-wrapper"));
        let button = wrapper.children[0].as_element().unwrap();
        assert!(button.is("button"));
        assert!(button.properties.has_class("copy-button"));
        assert!(wrapper.children[1].as_element().unwrap().is("pre"));
    }

    #[tokio::test]
    async fn test_idempotent() {
        let mut root = document();
        CopyButtons.transform(&mut root).await.unwrap();
        let once = root.clone();
        CopyButtons.transform(&mut root).await.unwrap();
        assert_eq!(root, once);
    }
}
