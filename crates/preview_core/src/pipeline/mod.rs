//! Markdown to HTML transform pipeline.
//!
//! A [`Pipeline`] is an ordered list of stages built once per render:
//!
//! 1. `parse` - CommonMark + GFM into an HTML-shaped [`Root`], with frontmatter
//!    and `:::` directive containers recognized on the way
//! 2. `admonitions` - GitHub callouts into directive containers
//! 3. `directives` - `::leaf[...]` and `:text[...]` directives
//! 4. `flexible-paragraphs` - `~` paragraph classes and alignment
//! 5. `emoji` - accessible emoji spans
//! 6. `ellipsis` - `...` into `…` outside of code
//! 7. `heading-ids` - GitHub-style heading slugs
//! 8. `toc` - table of contents under a "Contents" heading
//! 9. `sectionize` - `<section>` wrapping per heading
//! 10. `language-icons` - language badges on code blocks
//! 11. `copy-buttons` - optional copy button wrappers
//! 12. `stringify` - HTML serialization
//!
//! Every stage after `parse` sees the same tree type, so stages that must not
//! touch code (emoji, ellipsis) rely on [`Root::rewrite_text`] skipping
//! code-like elements.

mod copy_buttons;
mod directives;
mod emoji;
mod flexible;
mod frontmatter;
mod language_icons;
mod parse;
mod sectionize;
mod stringify;
mod textr;
mod toc;

pub use copy_buttons::CopyButtons;
pub use directives::{detect_admonition, Admonitions, AdmonitionKind, InlineDirectives};
pub use emoji::AccessibleEmoji;
pub use flexible::{FlexibleParagraphs, ParagraphAlignment};
pub use frontmatter::{Frontmatter, FrontmatterFormat};
pub use language_icons::LanguageIcons;
pub use parse::{parse, ParseOptions};
pub use sectionize::Sectionize;
pub use stringify::to_html_string;
pub use textr::Ellipsis;
pub use toc::{slugify, HeadingIds, Slugger, TableOfContents};

use crate::tree::Root;
use async_trait::async_trait;

/// Error raised by a pipeline stage; aborts the render.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The frontmatter block could not be parsed.
    #[error("invalid {format} frontmatter: {message}")]
    Frontmatter {
        format: FrontmatterFormat,
        message: String,
    },

    /// A transform stage failed.
    #[error("stage `{stage}` failed: {message}")]
    Stage {
        stage: &'static str,
        message: String,
    },
}

/// One step of the pipeline, consuming and producing the syntax tree.
#[async_trait]
pub trait Transform: Send + Sync {
    /// Stage name used in logs and errors.
    fn name(&self) -> &'static str;

    async fn transform(&self, tree: &mut Root) -> Result<(), PipelineError>;
}

/// Configuration of the assembled pipeline.
///
/// [`PipelineConfig::default`] is the configuration used for previews; the
/// fields exist so that tests and the CLI can switch individual stages.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// GFM tables, strikethrough, task lists and footnotes.
    pub gfm: bool,
    /// Recognized frontmatter formats.
    pub frontmatter: Vec<FrontmatterFormat>,
    /// `:::` containers and GitHub callouts as directive containers.
    pub admonitions: bool,
    /// `::name[label]` leaf and `:name[label]` text directives.
    pub inline_directives: bool,
    pub flexible_paragraphs: bool,
    pub accessible_emoji: bool,
    /// Replace `...` with `…` in prose.
    pub ellipsis: bool,
    pub table_of_contents: bool,
    /// Deepest heading rank listed in the table of contents.
    pub toc_max_depth: u8,
    pub sectionize: bool,
    pub language_icons: bool,
    pub copy_buttons: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            gfm: true,
            frontmatter: vec![FrontmatterFormat::Yaml, FrontmatterFormat::Toml],
            admonitions: true,
            inline_directives: true,
            flexible_paragraphs: true,
            accessible_emoji: true,
            ellipsis: true,
            table_of_contents: true,
            toc_max_depth: 6,
            sectionize: true,
            language_icons: true,
            copy_buttons: false,
        }
    }
}

/// Output of a pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDocument {
    pub html: String,
    pub frontmatter: Option<Frontmatter>,
}

/// The assembled transform chain.
pub struct Pipeline {
    parse_options: ParseOptions,
    stages: Vec<Box<dyn Transform>>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("parse_options", &self.parse_options)
            .field("stages", &self.stage_names())
            .finish()
    }
}

impl Pipeline {
    /// Starts an empty pipeline: parse and stringify only.
    pub fn builder(parse_options: ParseOptions) -> PipelineBuilder {
        PipelineBuilder {
            parse_options,
            stages: Vec::new(),
        }
    }

    /// Assembles the fixed stage order for the given configuration.
    pub fn assemble(config: &PipelineConfig) -> Self {
        let parse_options = ParseOptions {
            gfm: config.gfm,
            frontmatter: config.frontmatter.clone(),
            directives: config.admonitions,
        };

        let mut builder = Self::builder(parse_options);
        if config.admonitions {
            builder = builder.stage(Admonitions);
        }
        if config.inline_directives {
            builder = builder.stage(InlineDirectives);
        }
        if config.flexible_paragraphs {
            builder = builder.stage(FlexibleParagraphs);
        }
        if config.accessible_emoji {
            builder = builder.stage(AccessibleEmoji);
        }
        if config.ellipsis {
            builder = builder.stage(Ellipsis);
        }
        builder = builder.stage(HeadingIds);
        if config.table_of_contents {
            builder = builder.stage(TableOfContents::new(config.toc_max_depth));
        }
        if config.sectionize {
            builder = builder.stage(Sectionize);
        }
        if config.language_icons {
            builder = builder.stage(LanguageIcons);
        }
        if config.copy_buttons {
            builder = builder.stage(CopyButtons);
        }
        builder.build()
    }

    /// Names of all stages in execution order, including parse and stringify.
    pub fn stage_names(&self) -> Vec<&'static str> {
        std::iter::once("parse")
            .chain(self.stages.iter().map(|stage| stage.name()))
            .chain(std::iter::once("stringify"))
            .collect()
    }

    /// Runs every stage over `source` and serializes the result.
    ///
    /// Yields to the runtime between stages. The first failing stage aborts
    /// the run.
    pub async fn process(&self, source: &str) -> Result<RenderedDocument, PipelineError> {
        let mut tree = parse(source, &self.parse_options)?;
        tracing::trace!(nodes = tree.children.len(), "Parsed markdown source");

        for stage in &self.stages {
            tokio::task::yield_now().await;
            tracing::trace!(stage = stage.name(), "Running pipeline stage");
            stage.transform(&mut tree).await?;
        }

        tokio::task::yield_now().await;
        let html = to_html_string(&tree.children);

        Ok(RenderedDocument {
            html,
            frontmatter: tree.frontmatter,
        })
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::assemble(&PipelineConfig::default())
    }
}

pub struct PipelineBuilder {
    parse_options: ParseOptions,
    stages: Vec<Box<dyn Transform>>,
}

impl PipelineBuilder {
    /// Appends a stage; stages run in the order they are added.
    pub fn stage(mut self, stage: impl Transform + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn build(self) -> Pipeline {
        Pipeline {
            parse_options: self.parse_options,
            stages: self.stages,
        }
    }
}
