//! Typographic text replacements on prose.

use super::{PipelineError, Transform};
use crate::tree::{Node, Root};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

static TRIPLE_DOT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.{3}").expect("valid ellipsis regex"));

/// Replaces `...` with a single `…` glyph outside of code.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ellipsis;

#[async_trait]
impl Transform for Ellipsis {
    fn name(&self) -> &'static str {
        "ellipsis"
    }

    async fn transform(&self, tree: &mut Root) -> Result<(), PipelineError> {
        tree.rewrite_text(&mut |text| {
            if !text.contains("...") {
                return None;
            }
            Some(vec![Node::Text(ellipses(text))])
        });
        Ok(())
    }
}

pub(crate) fn ellipses(input: &str) -> String {
    TRIPLE_DOT.replace_all(input, "…").into_owned()
}
