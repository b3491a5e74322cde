use anyhow::{Context, Result};
use clap::Parser;
use parking_lot::Mutex;
use preview_config::Config;
use preview_core::replacer::BANNER_PREFIX;
use preview_core::{PageLoad, ReadyState, RenderState, Replacer, StaticPage};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

/// Renders a markdown file as if it had been opened in a browser.
#[derive(Parser, Debug, Clone)]
pub struct Render {
    /// Markdown file to render.
    pub file: PathBuf,

    /// Write the document to this file instead of stdout.
    #[clap(long, short)]
    pub output: Option<PathBuf>,

    /// Title of the original page, defaults to the file name.
    #[clap(long)]
    pub title: Option<String>,

    /// Directory the extension stylesheet is resolved against.
    #[clap(long)]
    pub extension_base: Option<String>,

    /// Wrap code blocks with a copy button.
    #[clap(long)]
    pub copy_buttons: bool,
}

impl Render {
    fn page(&self, text: String, config: &Config) -> StaticPage {
        let path = self.file.to_string_lossy().replace('\\', "/");

        let mut page = StaticPage::new(path, Some(text));
        if let Some(title) = &self.title {
            page = page.with_title(title.as_str());
        }
        if let Some(base) = self
            .extension_base
            .as_ref()
            .or(config.resources.extension_base.as_ref())
        {
            page = page.with_extension_base(base.as_str());
        }
        page
    }

    pub async fn run(&self, config: &Config) -> Result<ExitCode> {
        let text = tokio::fs::read_to_string(&self.file)
            .await
            .with_context(|| format!("failed to read {}", self.file.display()))?;

        let mut options = config.replacer_options();
        options.pipeline.copy_buttons |= self.copy_buttons;

        let host = Arc::new(Mutex::new(self.page(text, config)));
        let replacer = Replacer::new(host.clone(), options);

        // A local file has finished loading by the time it is read.
        let page_load = PageLoad::new(ReadyState::Interactive);
        let Some(outcome) = replacer.run_when_ready(&page_load).await else {
            return Ok(ExitCode::FAILURE);
        };

        tracing::debug!(trail = ?outcome.trail, "Render sequence finished");

        if let Some(err) = &outcome.error {
            eprintln!("{BANNER_PREFIX}: {err}");
            return Ok(ExitCode::FAILURE);
        }

        if outcome.state != RenderState::Visible {
            eprintln!("{} is not a markdown document", self.file.display());
            return Ok(ExitCode::FAILURE);
        }

        let html = host.lock().to_html();
        match &self.output {
            Some(output) => tokio::fs::write(output, html)
                .await
                .with_context(|| format!("failed to write {}", output.display()))?,
            None => print!("{html}"),
        }

        Ok(ExitCode::SUCCESS)
    }
}
