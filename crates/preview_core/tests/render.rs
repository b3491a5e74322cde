use async_trait::async_trait;
use parking_lot::Mutex;
use preview_core::pipeline::ParseOptions;
use preview_core::tree::Root;
use preview_core::{
    PageLoad, Pipeline, PipelineError, ReadyState, RenderError, RenderState, Replacer,
    ReplacerOptions, StaticPage, Transform,
};
use std::sync::Arc;
use std::time::Duration;

fn replacer(path: &str, source: &str) -> Replacer<StaticPage> {
    let page = StaticPage::new(path, Some(source.to_string())).with_extension_base("/ext");
    Replacer::new(Arc::new(Mutex::new(page)), ReplacerOptions::default())
}

async fn render(source: &str) -> String {
    Pipeline::default().process(source).await.unwrap().html
}

#[tokio::test]
async fn known_language_gets_icon() {
    let html = render("```python\nprint('hi')\n```\n").await;
    assert!(html.contains(r#"<pre class="has-language" data-language="python">"#));
    assert!(html.contains(
        r#"<div class="language-icon"><i class="fab fa-python" title="PYTHON"></i></div>"#
    ));
    assert!(html.contains(r#"<code class="language-python">print('hi')"#));
}

#[tokio::test]
async fn unknown_language_falls_back_to_default_icon() {
    let html = render("```brainfuck\n+++.\n```\n").await;
    assert!(html.contains(r#"data-language="brainfuck""#));
    assert!(html.contains(r#"<i class="fas fa-code" title="BRAINFUCK"></i>"#));
}

#[tokio::test]
async fn ellipsis_only_in_prose() {
    let html = render("To be continued...\n\n```\nfn main() { ... }\n```\n").await;
    assert!(html.contains("To be continued…"));
    assert!(html.contains("fn main() { ... }"));
}

#[tokio::test]
async fn full_document() {
    let source = "\
---
title: Notes
---
# Notes

## Contents

## Setup :rocket:

> [!TIP]
> Use the *latest* release.

:::details More
Hidden text
:::
";
    let rendered = Pipeline::default().process(source).await.unwrap();
    let html = rendered.html;

    assert_eq!(
        rendered.frontmatter.unwrap().get_str("title"),
        Some("Notes")
    );
    assert!(!html.contains("title: Notes"));
    assert!(html.contains(r##"<li><a href="#setup">Setup 🚀</a></li>"##));
    assert!(html.contains(r#"<span role="img" aria-label="rocket">🚀</span>"#));
    assert!(html.contains("directive-tip"));
    assert!(html.contains("fa-lightbulb"));
    assert!(html.contains("directive-details"));
    assert!(html.starts_with("<section>"));
}

#[tokio::test]
async fn non_markdown_path_leaves_page_untouched() {
    let replacer = replacer("/notes.txt", "# Title");
    let before = replacer.host().lock().to_html();

    let outcome = replacer.run().await;

    assert_eq!(outcome.state, RenderState::Init);
    assert!(outcome.error.is_none());
    assert_eq!(replacer.host().lock().to_html(), before);
}

#[tokio::test]
async fn empty_preformatted_text_is_not_rendered() {
    let replacer = replacer("/notes.md", "");
    let outcome = replacer.run().await;
    assert_eq!(outcome.trail, vec![RenderState::Init]);
    assert!(!replacer.host().lock().is_replaced());
}

#[tokio::test]
async fn rendered_document_replaces_page() {
    let replacer = replacer("/docs/README.md", "# Readme\n\n```rust\nfn main() {}\n```\n");
    let outcome = replacer.run().await;
    assert_eq!(outcome.state, RenderState::Visible);

    let html = replacer.host().lock().to_html();
    assert!(html.contains("<title>README.md</title>"));
    assert!(html.contains(r#"<div id="markdown-content-container">"#));
    assert!(html.contains(r#"data-language="rust""#));
    assert!(html.contains(r#"<link rel="stylesheet" href="/ext/style.css">"#));
    assert!(html.contains("mermaid.min.js"));
    assert!(html.contains("<body>\n"));
}

#[tokio::test(start_paused = true)]
async fn malformed_frontmatter_shows_transient_banner() {
    let replacer = replacer("/broken.md", "---\ntitle: [unclosed\n---\n# Broken\n");
    let started = tokio::time::Instant::now();

    let outcome = replacer.run().await;

    assert_eq!(
        outcome.trail,
        vec![RenderState::Init, RenderState::Hidden, RenderState::Error]
    );
    assert!(matches!(
        outcome.error,
        Some(RenderError::Pipeline(PipelineError::Frontmatter { .. }))
    ));
    {
        let page = replacer.host().lock();
        assert!(page.is_body_visible());
        assert!(!page.is_replaced());
        let banners = page.banners();
        assert_eq!(banners.len(), 1);
        assert!(banners[0].starts_with("Markdown rendering failed: invalid yaml frontmatter"));
    }

    outcome.banner_dismissal.unwrap().await.unwrap();
    assert!(started.elapsed() <= Duration::from_secs(5));
    assert!(replacer.host().lock().banners().is_empty());
}

struct Stall;

#[async_trait]
impl Transform for Stall {
    fn name(&self) -> &'static str {
        "stall"
    }

    async fn transform(&self, _tree: &mut Root) -> Result<(), PipelineError> {
        std::future::pending().await
    }
}

#[tokio::test(start_paused = true)]
async fn stalled_pipeline_times_out() {
    let page = StaticPage::new("/slow.md", Some("# Slow".to_string()));
    let options = ReplacerOptions {
        pipeline_timeout: Some(Duration::from_secs(1)),
        ..Default::default()
    };
    let replacer = Replacer::new(Arc::new(Mutex::new(page)), options);
    let pipeline = Pipeline::builder(ParseOptions::default()).stage(Stall).build();

    let outcome = replacer.run_with(pipeline).await;

    assert_eq!(outcome.state, RenderState::Error);
    assert!(matches!(outcome.error, Some(RenderError::Timeout(_))));
    let page = replacer.host().lock();
    assert!(page.is_body_visible());
    assert!(page.banners()[0].contains("did not finish within"));
}

#[tokio::test]
async fn ready_listener_fires_once() {
    let page = PageLoad::new(ReadyState::Loading);
    let replacer = replacer("/once.md", "# Once");

    let (first, second, _) = tokio::join!(
        replacer.run_when_ready(&page),
        replacer.run_when_ready(&page),
        async { page.advance(ReadyState::Interactive) }
    );

    let outcomes: Vec<_> = first.into_iter().chain(second).collect();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].state, RenderState::Visible);
    assert!(replacer.run_when_ready(&page).await.is_none());
}
