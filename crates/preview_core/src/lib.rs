//! Core library for rendering raw markdown pages as styled previews.
//!
//! A page showing a raw `.md` file goes through a single render pass:
//! detection, the transform pipeline, and the replacement of the document with
//! a shell holding the rendered HTML.
//!
//! # Modules
//!
//! - [`detector`] - Decides whether a page is a markdown file worth rendering
//! - [`tree`] - HTML-shaped syntax tree shared by the transform stages
//! - [`pipeline`] - Markdown to HTML transform stages and their assembly
//! - [`icons`] - Language icon table used for code block badges
//! - [`shell`] - Replacement document shell and external resources
//! - [`host`] - The browsing context abstraction and an in-memory page
//! - [`replacer`] - The render sequence state machine
//! - [`ready`] - Page-ready gate firing the render sequence once

pub mod detector;
pub mod host;
pub mod icons;
pub mod pipeline;
pub mod ready;
pub mod replacer;
pub mod shell;
pub mod tree;

pub use detector::{detect, should_render, SourceDocument};
pub use host::{BannerId, DocumentHost, HostError, StaticPage};
pub use icons::{icon_for_language, DEFAULT_LANGUAGE_ICON, LANGUAGE_ICON_TABLE};
pub use pipeline::{Pipeline, PipelineConfig, PipelineError, RenderedDocument, Transform};
pub use ready::{PageLoad, ReadyState};
pub use replacer::{RenderError, RenderOutcome, RenderState, Replacer, ReplacerOptions};
pub use shell::{document_title, DocumentShell, ExternalResource, Resources};
