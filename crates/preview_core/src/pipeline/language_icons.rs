//! Language badges for fenced code blocks.

use super::{PipelineError, Transform};
use crate::icons::icon_for_language;
use crate::tree::{Element, Root};
use async_trait::async_trait;

const LANGUAGE_CLASS_PREFIX: &str = "language-";

/// Marks every `<pre>` whose code carries a `language-X` class.
///
/// The block gets the `has-language` class, a `data-language` attribute with
/// the lowercased identifier and, as its first child, an icon badge:
///
/// ```html
/// <pre class="has-language" data-language="python">
///   <div class="language-icon"><i class="fab fa-python" title="PYTHON"></i></div>
///   <code class="language-python">...</code>
/// </pre>
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LanguageIcons;

#[async_trait]
impl Transform for LanguageIcons {
    fn name(&self) -> &'static str {
        "language-icons"
    }

    async fn transform(&self, tree: &mut Root) -> Result<(), PipelineError> {
        tree.visit_elements_mut(&mut |element| {
            if element.is("pre") && !element.properties.has_class("has-language") {
                if let Some(language) = code_language(element) {
                    annotate(element, &language);
                }
            }
        });
        Ok(())
    }
}

/// Lowercased language identifier of the `<code>` child of a `<pre>`.
fn code_language(pre: &Element) -> Option<String> {
    pre.child_element("code")?
        .properties
        .class_name
        .iter()
        .find_map(|class| class.strip_prefix(LANGUAGE_CLASS_PREFIX))
        .filter(|language| !language.is_empty())
        .map(str::to_lowercase)
}

fn annotate(pre: &mut Element, language: &str) {
    let mut icon = Element::new("i").with_attribute("title", language.to_uppercase());
    for class in icon_for_language(language).split_whitespace() {
        icon.properties.add_class(class);
    }

    pre.properties.add_class("has-language");
    pre.properties.set("data-language", language);
    pre.children.insert(
        0,
        Element::new("div")
            .with_class("language-icon")
            .with_child(icon)
            .into(),
    );
}
