//! Parse stage: markdown source into an HTML-shaped syntax tree.

use super::directives::{container_element, extract_containers, ContainerSpec};
use super::directives::{CONTAINER_CLOSE, CONTAINER_OPEN_PREFIX};
use super::frontmatter::{Frontmatter, FrontmatterFormat};
use super::PipelineError;
use crate::tree::{Element, Node, Root};
use pulldown_cmark::{
    Alignment, CodeBlockKind, Event, HeadingLevel, MetadataBlockKind, Options, Parser, Tag,
    TagEnd,
};

/// Options for the parse stage.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// GFM tables, strikethrough, task lists and footnotes.
    pub gfm: bool,
    pub frontmatter: Vec<FrontmatterFormat>,
    /// Recognize `:::` directive containers.
    pub directives: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            gfm: true,
            frontmatter: vec![FrontmatterFormat::Yaml, FrontmatterFormat::Toml],
            directives: true,
        }
    }
}

impl ParseOptions {
    fn to_pulldown_options(&self) -> Options {
        let mut options = Options::empty();
        if self.gfm {
            options.insert(Options::ENABLE_TABLES);
            options.insert(Options::ENABLE_STRIKETHROUGH);
            options.insert(Options::ENABLE_TASKLISTS);
            options.insert(Options::ENABLE_FOOTNOTES);
        }
        if self.frontmatter.contains(&FrontmatterFormat::Yaml) {
            options.insert(Options::ENABLE_YAML_STYLE_METADATA_BLOCKS);
        }
        if self.frontmatter.contains(&FrontmatterFormat::Toml) {
            options.insert(Options::ENABLE_PLUSES_DELIMITED_METADATA_BLOCKS);
        }
        options
    }
}

/// Parses `source` into a syntax tree.
///
/// # Example
///
/// ```
/// use preview_core::pipeline::{parse, ParseOptions};
///
/// let root = parse("# Title", &ParseOptions::default()).unwrap();
/// assert_eq!(root.children[0].heading_rank(), Some(1));
/// ```
pub fn parse(source: &str, options: &ParseOptions) -> Result<Root, PipelineError> {
    let pulldown_options = options.to_pulldown_options();
    let (source, containers) = if options.directives {
        extract_containers(source, pulldown_options)
    } else {
        (std::borrow::Cow::Borrowed(source), Vec::new())
    };

    let parser = Parser::new_ext(&source, pulldown_options);
    let mut builder = TreeBuilder::new(containers);
    for event in parser {
        builder.event(event)?;
    }
    Ok(builder.finish())
}

#[derive(Default)]
struct TableState {
    alignments: Vec<Alignment>,
    in_head: bool,
    body_open: bool,
    cell_index: usize,
}

struct TreeBuilder {
    stack: Vec<Element>,
    root: Vec<Node>,
    /// Stack depths at which directive containers were opened.
    open_containers: Vec<usize>,
    containers: Vec<ContainerSpec>,
    table: TableState,
    metadata: Option<(FrontmatterFormat, String)>,
    /// Markup of the HTML block being read.
    html_block: Option<String>,
    frontmatter: Option<Frontmatter>,
    footnote_numbers: Vec<String>,
    /// Nesting of images; inline markup inside an image only contributes alt text.
    image_depth: usize,
}

impl TreeBuilder {
    fn new(containers: Vec<ContainerSpec>) -> Self {
        Self {
            stack: Vec::new(),
            root: Vec::new(),
            open_containers: Vec::new(),
            containers,
            table: TableState::default(),
            metadata: None,
            html_block: None,
            frontmatter: None,
            footnote_numbers: Vec::new(),
            image_depth: 0,
        }
    }

    fn push_node(&mut self, node: Node) {
        let children = match self.stack.last_mut() {
            Some(parent) => &mut parent.children,
            None => &mut self.root,
        };
        // Adjacent text is merged so that text transforms see whole runs.
        if let (Node::Text(text), Some(Node::Text(last))) = (&node, children.last_mut()) {
            last.push_str(text);
            return;
        }
        children.push(node);
    }

    fn push_text(&mut self, text: &str) {
        if let Some(image) = self.stack.last_mut().filter(|el| el.is("img")) {
            let alt = format!("{}{text}", image.properties.get("alt").unwrap_or_default());
            image.properties.set("alt", alt);
            return;
        }
        self.push_node(Node::text(text));
    }

    fn open(&mut self, element: Element) {
        self.stack.push(element);
    }

    fn close(&mut self) {
        if let Some(element) = self.stack.pop() {
            self.push_node(Node::Element(element));
        }
    }

    fn footnote_number(&mut self, label: &str) -> usize {
        match self.footnote_numbers.iter().position(|l| l == label) {
            Some(idx) => idx + 1,
            None => {
                self.footnote_numbers.push(label.to_string());
                self.footnote_numbers.len()
            }
        }
    }

    fn event(&mut self, event: Event<'_>) -> Result<(), PipelineError> {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag)?,
            Event::Text(text) => {
                if let Some((_, raw)) = self.metadata.as_mut() {
                    raw.push_str(&text);
                } else {
                    self.push_text(&text);
                }
            }
            Event::Code(code) if self.image_depth > 0 => self.push_text(&code),
            Event::Code(code) => {
                self.push_node(Element::new("code").with_text(code.to_string()).into());
            }
            Event::Html(html) => match self.html_block.as_mut() {
                Some(block) => block.push_str(&html),
                None => self.push_node(Node::Raw(html.to_string())),
            },
            Event::InlineHtml(html) => self.push_node(Node::Raw(html.to_string())),
            Event::FootnoteReference(label) => {
                let number = self.footnote_number(&label);
                let link = Element::new("a")
                    .with_attribute("href", format!("#{label}"))
                    .with_text(number.to_string());
                self.push_node(
                    Element::new("sup")
                        .with_class("footnote-reference")
                        .with_child(link)
                        .into(),
                );
            }
            Event::SoftBreak => self.push_text("\n"),
            Event::HardBreak => self.push_node(Element::new("br").into()),
            Event::Rule => self.push_node(Element::new("hr").into()),
            Event::TaskListMarker(checked) => {
                let mut input = Element::new("input")
                    .with_attribute("type", "checkbox")
                    .with_attribute("disabled", "");
                if checked {
                    input.properties.set("checked", "");
                }
                if let Some(item) = self.stack.last_mut().filter(|el| el.is("li")) {
                    item.properties.add_class("task-list-item");
                }
                self.push_node(input.into());
            }
        }
        Ok(())
    }

    /// Ends an HTML block. A block made of a single container marker opens
    /// or closes a directive container, anything else passes through.
    fn finish_html_block(&mut self, html: String) {
        let trimmed = html.trim();

        if !self.containers.is_empty() {
            if let Some(idx) = trimmed
                .strip_prefix(CONTAINER_OPEN_PREFIX)
                .and_then(|rest| rest.strip_suffix("-->"))
                .and_then(|idx| idx.parse::<usize>().ok())
            {
                if let Some(spec) = self.containers.get(idx) {
                    let element = container_element(&spec.name, spec.title.as_deref());
                    self.open_containers.push(self.stack.len());
                    self.open(element);
                    return;
                }
            }

            if trimmed == CONTAINER_CLOSE {
                if let Some(depth) = self.open_containers.pop() {
                    while self.stack.len() > depth {
                        self.close();
                    }
                }
                return;
            }
        }

        self.push_node(Node::Raw(html));
    }

    fn start(&mut self, tag: Tag<'_>) {
        if self.image_depth > 0 {
            if matches!(tag, Tag::Image { .. }) {
                self.image_depth += 1;
            }
            return;
        }

        match tag {
            Tag::Paragraph => self.open(Element::new("p")),
            Tag::Heading {
                level,
                id,
                classes,
                attrs,
            } => {
                let mut heading = Element::new(heading_tag(level));
                if let Some(id) = id {
                    heading.properties.set("id", id.to_string());
                }
                for class in classes {
                    heading.properties.add_class(class.to_string());
                }
                for (name, value) in attrs {
                    heading
                        .properties
                        .set(name.to_string(), value.map(|v| v.to_string()).unwrap_or_default());
                }
                self.open(heading);
            }
            Tag::BlockQuote => self.open(Element::new("blockquote")),
            Tag::CodeBlock(kind) => {
                let mut code = Element::new("code");
                if let CodeBlockKind::Fenced(info) = kind {
                    if let Some(lang) = info.split_whitespace().next() {
                        code.properties.add_class(format!("language-{lang}"));
                    }
                }
                self.open(Element::new("pre"));
                self.open(code);
            }
            Tag::HtmlBlock => self.html_block = Some(String::new()),
            Tag::List(Some(start)) => {
                let mut list = Element::new("ol");
                if start != 1 {
                    list.properties.set("start", start.to_string());
                }
                self.open(list);
            }
            Tag::List(None) => self.open(Element::new("ul")),
            Tag::Item => self.open(Element::new("li")),
            Tag::FootnoteDefinition(label) => {
                let number = self.footnote_number(&label);
                let definition = Element::new("div")
                    .with_class("footnote-definition")
                    .with_attribute("id", label.to_string())
                    .with_child(
                        Element::new("sup")
                            .with_class("footnote-definition-label")
                            .with_text(number.to_string()),
                    );
                self.open(definition);
            }
            Tag::Table(alignments) => {
                self.table = TableState {
                    alignments,
                    ..Default::default()
                };
                self.open(Element::new("table"));
            }
            Tag::TableHead => {
                self.table.in_head = true;
                self.table.cell_index = 0;
                self.open(Element::new("thead"));
                self.open(Element::new("tr"));
            }
            Tag::TableRow => {
                if !self.table.body_open {
                    self.table.body_open = true;
                    self.open(Element::new("tbody"));
                }
                self.table.cell_index = 0;
                self.open(Element::new("tr"));
            }
            Tag::TableCell => {
                let tag = if self.table.in_head { "th" } else { "td" };
                let mut cell = Element::new(tag);
                let align = match self.table.alignments.get(self.table.cell_index) {
                    Some(Alignment::Left) => Some("left"),
                    Some(Alignment::Center) => Some("center"),
                    Some(Alignment::Right) => Some("right"),
                    Some(Alignment::None) | None => None,
                };
                if let Some(align) = align {
                    cell.properties.set("style", format!("text-align: {align}"));
                }
                self.open(cell);
            }
            Tag::Emphasis => self.open(Element::new("em")),
            Tag::Strong => self.open(Element::new("strong")),
            Tag::Strikethrough => self.open(Element::new("del")),
            Tag::Link {
                dest_url, title, ..
            } => {
                let mut link = Element::new("a").with_attribute("href", dest_url.to_string());
                if !title.is_empty() {
                    link.properties.set("title", title.to_string());
                }
                self.open(link);
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                let mut image = Element::new("img")
                    .with_attribute("src", dest_url.to_string())
                    .with_attribute("alt", "");
                if !title.is_empty() {
                    image.properties.set("title", title.to_string());
                }
                self.image_depth = 1;
                self.open(image);
            }
            Tag::MetadataBlock(kind) => {
                let format = match kind {
                    MetadataBlockKind::YamlStyle => FrontmatterFormat::Yaml,
                    MetadataBlockKind::PlusesStyle => FrontmatterFormat::Toml,
                };
                self.metadata = Some((format, String::new()));
            }
        }
    }

    fn end(&mut self, tag: TagEnd) -> Result<(), PipelineError> {
        if self.image_depth > 0 {
            if matches!(tag, TagEnd::Image) {
                self.image_depth -= 1;
                if self.image_depth == 0 {
                    self.close();
                }
            }
            return Ok(());
        }

        match tag {
            TagEnd::HtmlBlock => {
                if let Some(html) = self.html_block.take() {
                    self.finish_html_block(html);
                }
            }
            TagEnd::CodeBlock => {
                self.close();
                self.close();
            }
            TagEnd::TableHead => {
                self.table.in_head = false;
                self.close();
                self.close();
            }
            TagEnd::TableCell => {
                self.table.cell_index += 1;
                self.close();
            }
            TagEnd::Table => {
                if self.table.body_open {
                    self.close();
                }
                self.table = TableState::default();
                self.close();
            }
            TagEnd::MetadataBlock(_) => {
                if let Some((format, raw)) = self.metadata.take() {
                    self.frontmatter = Some(Frontmatter::parse(format, &raw)?);
                }
            }
            _ => self.close(),
        }
        Ok(())
    }

    fn finish(mut self) -> Root {
        // Unclosed directive containers end with the document.
        while !self.stack.is_empty() {
            self.close();
        }
        Root {
            children: self.root,
            frontmatter: self.frontmatter,
        }
    }
}

fn heading_tag(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => "h1",
        HeadingLevel::H2 => "h2",
        HeadingLevel::H3 => "h3",
        HeadingLevel::H4 => "h4",
        HeadingLevel::H5 => "h5",
        HeadingLevel::H6 => "h6",
    }
}
