//! Heading anchors and the generated table of contents.

use super::{PipelineError, Transform};
use crate::tree::{Element, Node, Root};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static TOC_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^((table[ -]of[ -])?contents?|toc)$").expect("valid toc heading regex")
});

/// Generates a GitHub-compatible anchor slug from heading text.
///
/// Converts to lowercase, replaces spaces with hyphens and drops any character
/// that is not alphanumeric, `_` or `-`. Consecutive hyphens collapse into one.
pub fn slugify(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter_map(|c| {
            if c.is_alphanumeric() || c == '_' {
                Some(c)
            } else if c == ' ' || c == '-' {
                Some('-')
            } else {
                None
            }
        })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Hands out unique slugs within one document.
#[derive(Debug, Default)]
pub struct Slugger {
    occurrences: HashMap<String, usize>,
}

impl Slugger {
    /// Marks an id as taken without generating it.
    pub fn reserve(&mut self, id: &str) {
        self.occurrences.entry(id.to_string()).or_insert(0);
    }

    /// Slug for `text`; repeated slugs get a `-1`, `-2`, ... suffix.
    pub fn slug(&mut self, text: &str) -> String {
        let base = slugify(text);
        let mut slug = base.clone();

        while self.occurrences.contains_key(&slug) {
            let count = self.occurrences.entry(base.clone()).or_insert(0);
            *count += 1;
            slug = format!("{base}-{count}");
        }

        self.occurrences.insert(slug.clone(), 0);
        slug
    }
}

/// Gives every heading without an `id` a unique slug.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadingIds;

#[async_trait]
impl Transform for HeadingIds {
    fn name(&self) -> &'static str {
        "heading-ids"
    }

    async fn transform(&self, tree: &mut Root) -> Result<(), PipelineError> {
        let mut slugger = Slugger::default();

        tree.visit_elements(&mut |element| {
            if element.heading_rank().is_some() {
                if let Some(id) = element.properties.get("id") {
                    slugger.reserve(id);
                }
            }
        });

        tree.visit_elements_mut(&mut |element| {
            if element.heading_rank().is_none() || element.properties.get("id").is_some() {
                return;
            }
            let slug = slugger.slug(&element.text_content());
            if !slug.is_empty() {
                element.properties.set("id", slug);
            }
        });

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TocEntry {
    rank: u8,
    text: String,
    id: String,
}

/// Inserts a nested link list under the first heading named "Contents",
/// "Table of contents" or "TOC".
///
/// Anything between that heading and the next heading of the same or higher
/// rank is replaced. Only headings after the replaced range are listed.
#[derive(Debug, Clone, Copy)]
pub struct TableOfContents {
    max_depth: u8,
}

impl TableOfContents {
    pub fn new(max_depth: u8) -> Self {
        Self {
            max_depth: max_depth.clamp(1, 6),
        }
    }
}

impl Default for TableOfContents {
    fn default() -> Self {
        Self::new(6)
    }
}

#[async_trait]
impl Transform for TableOfContents {
    fn name(&self) -> &'static str {
        "toc"
    }

    async fn transform(&self, tree: &mut Root) -> Result<(), PipelineError> {
        let Some((index, rank)) = tree.children.iter().enumerate().find_map(|(i, node)| {
            let element = node.as_element()?;
            let rank = element.heading_rank()?;
            TOC_HEADING
                .is_match(element.text_content().trim())
                .then_some((i, rank))
        }) else {
            return Ok(());
        };

        let end = tree.children[index + 1..]
            .iter()
            .position(|node| node.heading_rank().is_some_and(|r| r <= rank))
            .map_or(tree.children.len(), |offset| index + 1 + offset);

        let mut entries = Vec::new();
        crate::tree::visit_elements(&tree.children[end..], &mut |element| {
            if let Some(rank) = element.heading_rank().filter(|r| *r <= self.max_depth) {
                let text = element.text_content();
                let id = element
                    .properties
                    .get("id")
                    .map(str::to_string)
                    .unwrap_or_else(|| slugify(&text));
                entries.push(TocEntry { rank, text, id });
            }
        });

        if entries.is_empty() {
            tracing::debug!("Table of contents heading without following headings");
            return Ok(());
        }

        tree.children
            .splice(index + 1..end, [Node::from(build_list(&entries))]);

        Ok(())
    }
}

fn build_list(entries: &[TocEntry]) -> Element {
    let mut list = Element::new("ul");
    let mut i = 0;

    while i < entries.len() {
        let entry = &entries[i];
        let end = entries[i + 1..]
            .iter()
            .position(|next| next.rank <= entry.rank)
            .map_or(entries.len(), |offset| i + 1 + offset);

        let link = Element::new("a")
            .with_attribute("href", format!("#{}", entry.id))
            .with_text(entry.text.clone());
        let mut item = Element::new("li").with_child(link);
        if end > i + 1 {
            item.children.push(build_list(&entries[i + 1..end]).into());
        }

        list.children.push(item.into());
        i = end;
    }

    list
}
