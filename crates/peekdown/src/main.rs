mod command;
mod logging;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Render a markdown file into a standalone preview document.
    #[clap(name = "render")]
    Render(command::render::Render),
    /// Check whether a file would be rendered as a preview.
    #[clap(name = "detect")]
    Detect(command::detect::Detect),
    /// List the code block language icons.
    #[clap(name = "languages")]
    Languages(command::languages::Languages),
}

#[derive(Parser, Debug)]
#[clap(name = "peekdown", version)]
pub struct Peekdown {
    /// Enable the logging system.
    #[clap(long, global = true)]
    pub log: Option<PathBuf>,

    /// Specify the path of the config file.
    #[clap(long, global = true)]
    pub config_file: Option<PathBuf>,

    #[clap(subcommand)]
    pub cmd: Cmd,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let peekdown = Peekdown::parse();

    let (config, config_err) = preview_config::load_config(peekdown.config_file.as_deref());

    let _guard = logging::init(peekdown.log.clone(), &config.log)?;

    if let Some(err) = config_err {
        tracing::error!(%err, "Invalid config file, falling back to the default config");
    }

    match peekdown.cmd {
        Cmd::Render(render) => render.run(&config).await,
        Cmd::Detect(detect) => detect.run().await,
        Cmd::Languages(languages) => {
            languages.run();
            Ok(ExitCode::SUCCESS)
        }
    }
}
