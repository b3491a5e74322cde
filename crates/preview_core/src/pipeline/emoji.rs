//! Accessible emoji: every emoji in prose gets an `img` role and a spoken label.

use super::{PipelineError, Transform};
use crate::tree::{Element, Node, Root};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

static SHORTCODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":([a-z0-9_+\-]+):").expect("valid shortcode regex"));

/// Wraps emoji as `<span role="img" aria-label="NAME">EMOJI</span>`.
///
/// Known `:shortcode:` sequences are substituted with their emoji first.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessibleEmoji;

#[async_trait]
impl Transform for AccessibleEmoji {
    fn name(&self) -> &'static str {
        "emoji"
    }

    async fn transform(&self, tree: &mut Root) -> Result<(), PipelineError> {
        tree.rewrite_text(&mut |text| {
            let text = substitute_shortcodes(text);
            wrap_emoji(&text)
        });
        Ok(())
    }
}

fn emoji_span(emoji: &emojis::Emoji) -> Node {
    Element::new("span")
        .with_attribute("role", "img")
        .with_attribute("aria-label", emoji.name())
        .with_text(emoji.as_str())
        .into()
}

fn substitute_shortcodes(text: &str) -> std::borrow::Cow<'_, str> {
    if !text.contains(':') {
        return std::borrow::Cow::Borrowed(text);
    }
    SHORTCODE.replace_all(text, |caps: &regex::Captures| {
        match emojis::get_by_shortcode(&caps[1]) {
            Some(emoji) => emoji.as_str().to_string(),
            None => caps[0].to_string(),
        }
    })
}

/// Splits `text` around emoji graphemes; `None` when there is no emoji.
fn wrap_emoji(text: &str) -> Option<Vec<Node>> {
    if text.is_ascii() {
        return None;
    }

    let mut nodes = Vec::new();
    let mut plain = String::new();
    for grapheme in text.graphemes(true) {
        match emojis::get(grapheme).filter(|_| !grapheme.is_ascii()) {
            Some(emoji) => {
                if !plain.is_empty() {
                    nodes.push(Node::Text(std::mem::take(&mut plain)));
                }
                nodes.push(emoji_span(emoji));
            }
            None => plain.push_str(grapheme),
        }
    }

    if nodes.is_empty() {
        return None;
    }
    if !plain.is_empty() {
        nodes.push(Node::Text(plain));
    }
    Some(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_unicode_emoji() {
        let nodes = wrap_emoji("Nice 🚀 launch").unwrap();
        assert_eq!(nodes.len(), 3);
        let span = nodes[1].as_element().unwrap();
        assert_eq!(span.properties.get("role"), Some("img"));
        assert_eq!(span.properties.get("aria-label"), Some("rocket"));
        assert_eq!(span.text_content(), "🚀");
    }

    #[test]
    fn test_plain_text_untouched() {
        assert!(wrap_emoji("no emoji here").is_none());
        assert!(wrap_emoji("café").is_none());
    }

    #[test]
    fn test_shortcodes() {
        assert_eq!(substitute_shortcodes("go :rocket:!"), "go 🚀!");
        assert_eq!(substitute_shortcodes("time 10:30:00"), "time 10:30:00");
        assert_eq!(substitute_shortcodes(":not_an_emoji_code:"), ":not_an_emoji_code:");
    }

    #[tokio::test]
    async fn test_emoji_in_code_untouched() {
        let mut root = Root::new(vec![Element::new("code").with_text("🚀").into()]);
        AccessibleEmoji.transform(&mut root).await.unwrap();
        let code = root.children[0].as_element().unwrap();
        assert_eq!(code.children, vec![Node::text("🚀")]);
    }
}
