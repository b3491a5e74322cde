use anyhow::Result;
use clap::Parser;
use preview_core::detector::{is_markdown_path, should_render};
use std::path::PathBuf;
use std::process::ExitCode;

/// Reports whether a file would be rendered; exits with 1 when it would not.
#[derive(Parser, Debug, Clone)]
pub struct Detect {
    pub path: PathBuf,
}

impl Detect {
    pub async fn run(&self) -> Result<ExitCode> {
        let path = self.path.to_string_lossy().replace('\\', "/");

        if !is_markdown_path(&path) {
            println!("{path}: not a markdown file");
            return Ok(ExitCode::FAILURE);
        }

        let text = tokio::fs::read_to_string(&self.path).await.ok();
        if should_render(&path, text.as_deref()) {
            println!("{path}: markdown");
            Ok(ExitCode::SUCCESS)
        } else {
            println!("{path}: no markdown content");
            Ok(ExitCode::FAILURE)
        }
    }
}
