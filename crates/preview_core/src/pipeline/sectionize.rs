//! Wraps each heading and its content in a `<section>`.

use super::{PipelineError, Transform};
use crate::tree::{Element, Node, Root};
use async_trait::async_trait;
use std::iter::Peekable;

/// A section runs from a heading up to the next heading of equal or higher
/// rank; deeper headings open nested sections. Only top-level nodes take part.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sectionize;

#[async_trait]
impl Transform for Sectionize {
    fn name(&self) -> &'static str {
        "sectionize"
    }

    async fn transform(&self, tree: &mut Root) -> Result<(), PipelineError> {
        let children = std::mem::take(&mut tree.children);
        tree.children = sectionize(children);
        Ok(())
    }
}

fn sectionize(nodes: Vec<Node>) -> Vec<Node> {
    let mut iter = nodes.into_iter().peekable();
    let mut out = Vec::new();

    while let Some(node) = iter.next() {
        match node.heading_rank() {
            Some(rank) => out.push(section(node, rank, &mut iter)),
            None => out.push(node),
        }
    }

    out
}

fn section<I>(heading: Node, rank: u8, iter: &mut Peekable<I>) -> Node
where
    I: Iterator<Item = Node>,
{
    let mut section = Element::new("section").with_child(heading);

    while let Some(next) = iter.next_if(|node| node.heading_rank().map_or(true, |r| r > rank)) {
        let child = match next.heading_rank() {
            Some(sub_rank) => self::section(next, sub_rank, iter),
            None => next,
        };
        section.children.push(child);
    }

    section.into()
}
