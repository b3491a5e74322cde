//! Swaps the native rendering of a markdown file for the rendered preview.
//!
//! The render sequence is a small state machine:
//!
//! ```text
//! Init -> Hidden -> Suppressed -> Replaced -> Visible
//!            \           \            \
//!             +-----------+------------+--> Error
//! ```
//!
//! A negative detection stays in `Init` without touching the page. Any failure
//! after the body was hidden ends in `Error`: the body is revealed again and a
//! diagnostic banner is shown, then dismissed after [`ReplacerOptions::banner_ttl`].

use crate::detector::{detect, SourceDocument};
use crate::host::{DocumentHost, HostError};
use crate::pipeline::{Pipeline, PipelineConfig, PipelineError};
use crate::ready::PageLoad;
use crate::shell::{document_title, DocumentShell, Resources};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Prefix of the diagnostic banner shown on failure.
pub const BANNER_PREFIX: &str = "Markdown rendering failed";

pub const DEFAULT_PIPELINE_TIMEOUT: Duration = Duration::from_secs(10);

pub const DEFAULT_BANNER_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    Init,
    Hidden,
    Suppressed,
    Replaced,
    Visible,
    Error,
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Host(#[from] HostError),

    #[error("pipeline did not finish within {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Clone)]
pub struct ReplacerOptions {
    pub pipeline: PipelineConfig,
    pub resources: Resources,
    /// Upper bound for the pipeline run, `None` waits forever.
    ///
    /// Checked between stages: a stage that is already running finishes first.
    pub pipeline_timeout: Option<Duration>,
    /// How long the failure banner stays on the page.
    pub banner_ttl: Duration,
}

impl Default for ReplacerOptions {
    fn default() -> Self {
        Self {
            pipeline: PipelineConfig::default(),
            resources: Resources::default(),
            pipeline_timeout: Some(DEFAULT_PIPELINE_TIMEOUT),
            banner_ttl: DEFAULT_BANNER_TTL,
        }
    }
}

/// Result of one render sequence.
#[derive(Debug)]
pub struct RenderOutcome {
    /// Terminal state.
    pub state: RenderState,
    /// Every state visited, in order.
    pub trail: Vec<RenderState>,
    pub error: Option<RenderError>,
    /// Task removing the failure banner once its time is up.
    pub banner_dismissal: Option<JoinHandle<()>>,
}

impl RenderOutcome {
    fn new(trail: Vec<RenderState>) -> Self {
        Self {
            state: trail.last().copied().unwrap_or(RenderState::Init),
            trail,
            error: None,
            banner_dismissal: None,
        }
    }

    pub fn is_rendered(&self) -> bool {
        self.state == RenderState::Visible
    }
}

pub struct Replacer<H> {
    host: Arc<Mutex<H>>,
    options: ReplacerOptions,
}

impl<H: DocumentHost> Replacer<H> {
    pub fn new(host: Arc<Mutex<H>>, options: ReplacerOptions) -> Self {
        Self { host, options }
    }

    pub fn host(&self) -> &Arc<Mutex<H>> {
        &self.host
    }

    /// Runs the render sequence once `page` is ready; `None` if the ready
    /// listener already fired for this page load.
    pub async fn run_when_ready(&self, page: &PageLoad) -> Option<RenderOutcome> {
        page.on_ready(|| self.run()).await
    }

    /// Runs the render sequence to a terminal state.
    pub async fn run(&self) -> RenderOutcome {
        self.run_with(Pipeline::assemble(&self.options.pipeline)).await
    }

    /// Like [`Replacer::run`], with a pipeline assembled by the caller.
    pub async fn run_with(&self, pipeline: Pipeline) -> RenderOutcome {
        let mut trail = vec![RenderState::Init];

        let source = {
            let host = self.host.lock();
            detect(&host.location_path(), host.preformatted_text())
        };

        let Some(source) = source else {
            return RenderOutcome::new(trail);
        };

        match self.replace(&pipeline, &source, &mut trail).await {
            Ok(()) => {
                tracing::debug!(path = %source.path, "Markdown preview rendered");
                RenderOutcome::new(trail)
            }
            Err(err) => {
                tracing::error!(path = %source.path, state = ?trail.last(), ?err, "Markdown rendering failed");
                trail.push(RenderState::Error);
                let banner_dismissal = self.recover(&err);
                RenderOutcome {
                    error: Some(err),
                    banner_dismissal,
                    ..RenderOutcome::new(trail)
                }
            }
        }
    }

    async fn replace(
        &self,
        pipeline: &Pipeline,
        source: &SourceDocument,
        trail: &mut Vec<RenderState>,
    ) -> Result<(), RenderError> {
        self.host.lock().set_body_visible(false)?;
        transition(trail, RenderState::Hidden);

        let rendered = match self.options.pipeline_timeout {
            Some(limit) => tokio::time::timeout(limit, pipeline.process(&source.text))
                .await
                .map_err(|_| RenderError::Timeout(limit))??,
            None => pipeline.process(&source.text).await?,
        };

        let mut host = self.host.lock();

        host.stop_loading()?;
        transition(trail, RenderState::Suppressed);

        let title = document_title(host.title().as_deref(), &source.path);
        let shell = DocumentShell::new(&self.options.resources, &title, &rendered.html);
        host.replace_document(&shell)?;
        transition(trail, RenderState::Replaced);

        if let Some(name) = &self.options.resources.extension_stylesheet {
            if let Err(err) = host
                .resolve_extension_url(name)
                .and_then(|href| host.append_stylesheet(&href))
            {
                tracing::warn!(?err, "Failed to load extension stylesheet");
            }
        }

        host.set_body_visible(true)?;
        transition(trail, RenderState::Visible);

        Ok(())
    }

    /// Reveals the body and shows a banner describing `err`.
    fn recover(&self, err: &RenderError) -> Option<JoinHandle<()>> {
        let mut host = self.host.lock();

        if let Err(e) = host.set_body_visible(true) {
            tracing::error!(?e, "Failed to reveal the document body");
        }

        let banner = match host.show_banner(&format!("{BANNER_PREFIX}: {err}")) {
            Ok(banner) => banner,
            Err(e) => {
                tracing::error!(?e, "Failed to show the error banner");
                return None;
            }
        };

        let host = self.host.clone();
        let ttl = self.options.banner_ttl;
        Some(tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            host.lock().dismiss_banner(banner);
        }))
    }
}

fn transition(trail: &mut Vec<RenderState>, next: RenderState) {
    tracing::debug!(from = ?trail.last(), to = ?next, "Render state transition");
    trail.push(next);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{BannerId, StaticPage};

    fn replacer(page: StaticPage) -> Replacer<StaticPage> {
        Replacer::new(Arc::new(Mutex::new(page)), ReplacerOptions::default())
    }

    #[tokio::test]
    async fn test_happy_path() {
        let replacer = replacer(
            StaticPage::new("/docs/Guide.md", Some("# Guide\n\nHello".into()))
                .with_extension_base("/ext"),
        );
        let outcome = replacer.run().await;

        assert_eq!(
            outcome.trail,
            vec![
                RenderState::Init,
                RenderState::Hidden,
                RenderState::Suppressed,
                RenderState::Replaced,
                RenderState::Visible
            ]
        );
        assert!(outcome.is_rendered());

        let page = replacer.host().lock();
        assert!(page.is_body_visible());
        assert!(!page.is_loading());
        assert_eq!(page.stylesheets(), ["/ext/style.css"]);
        let shell = page.shell().unwrap();
        assert!(shell.head.contains("<title>Guide.md</title>"));
        assert!(shell.body.contains("Hello"));
    }

    #[tokio::test]
    async fn test_not_markdown_is_noop() {
        let replacer = replacer(StaticPage::new("/index.html", Some("# Hi".into())));
        let outcome = replacer.run().await;
        assert_eq!(outcome.state, RenderState::Init);
        assert_eq!(outcome.trail, vec![RenderState::Init]);

        let page = replacer.host().lock();
        assert!(!page.is_replaced());
        assert!(page.is_loading());
        assert!(page.banners().is_empty());
    }

    #[tokio::test]
    async fn test_missing_stylesheet_is_not_fatal() {
        let replacer = replacer(StaticPage::new("/a.md", Some("text".into())));
        let outcome = replacer.run().await;
        assert_eq!(outcome.state, RenderState::Visible);
        assert!(replacer.host().lock().stylesheets().is_empty());
    }

    struct DetachedHost(StaticPage);

    impl DocumentHost for DetachedHost {
        fn location_path(&self) -> String {
            self.0.location_path()
        }
        fn title(&self) -> Option<String> {
            self.0.title()
        }
        fn preformatted_text(&self) -> Option<String> {
            self.0.preformatted_text()
        }
        fn set_body_visible(&mut self, visible: bool) -> Result<(), HostError> {
            self.0.set_body_visible(visible)
        }
        fn stop_loading(&mut self) -> Result<(), HostError> {
            self.0.stop_loading()
        }
        fn replace_document(&mut self, _shell: &DocumentShell) -> Result<(), HostError> {
            Err(HostError::Operation {
                operation: "replace document",
                message: "detached".to_string(),
            })
        }
        fn resolve_extension_url(&self, name: &str) -> Result<String, HostError> {
            self.0.resolve_extension_url(name)
        }
        fn append_stylesheet(&mut self, href: &str) -> Result<(), HostError> {
            self.0.append_stylesheet(href)
        }
        fn show_banner(&mut self, message: &str) -> Result<BannerId, HostError> {
            self.0.show_banner(message)
        }
        fn dismiss_banner(&mut self, id: BannerId) -> bool {
            self.0.dismiss_banner(id)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_host_failure_recovers() {
        let host = DetachedHost(StaticPage::new("/a.md", Some("# A".into())));
        let replacer = Replacer::new(Arc::new(Mutex::new(host)), ReplacerOptions::default());
        let outcome = replacer.run().await;

        assert_eq!(outcome.state, RenderState::Error);
        assert_eq!(
            outcome.trail,
            vec![
                RenderState::Init,
                RenderState::Hidden,
                RenderState::Suppressed,
                RenderState::Error
            ]
        );
        assert!(matches!(outcome.error, Some(RenderError::Host(_))));
        {
            let host = replacer.host().lock();
            assert!(host.0.is_body_visible());
            assert_eq!(
                host.0.banners(),
                vec!["Markdown rendering failed: replace document failed: detached"]
            );
        }

        outcome.banner_dismissal.unwrap().await.unwrap();
        assert!(replacer.host().lock().0.banners().is_empty());
    }
}
