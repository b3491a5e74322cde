use directories::ProjectDirs;
use preview_core::pipeline::PipelineConfig;
use preview_core::replacer::{ReplacerOptions, DEFAULT_BANNER_TTL, DEFAULT_PIPELINE_TIMEOUT};
use preview_core::shell::Resources;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Project directories of peekdown, `None` if no home directory is known.
pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "peekdown", "Peekdown")
}

/// Default location of the config file.
///
/// Linux: ~/.config/peekdown/config.toml
/// macOS: ~/Library/Application\ Support/org.peekdown.Peekdown/config.toml
/// Windows: ~\AppData\Roaming\peekdown\Peekdown\config\config.toml
pub fn default_config_file() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Loads the config from `specified_config_file` or the default location.
///
/// A missing file yields the default config. A malformed file also yields the
/// default config, and the parse error is returned alongside.
pub fn load_config(specified_config_file: Option<&Path>) -> (Config, Option<toml::de::Error>) {
    let Some(config_file) = specified_config_file
        .map(Path::to_path_buf)
        .or_else(default_config_file)
    else {
        return (Config::default(), None);
    };

    let contents = match std::fs::read_to_string(&config_file) {
        Ok(contents) => contents,
        Err(err) => {
            tracing::debug!(path = %config_file.display(), %err, "Config file not loaded");
            return (Config::default(), None);
        }
    };

    match toml::from_str(&contents) {
        Ok(config) => (config, None),
        Err(err) => (Config::default(), Some(err)),
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct LogConfig {
    /// Specify the log file path.
    pub log_file: Option<String>,

    /// Specify the max log level.
    pub max_level: String,

    /// Specify the log target to enable more detailed logging.
    ///
    /// ```toml
    /// [log]
    /// log-target = "preview_core::replacer=trace"
    /// ```
    pub log_target: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_file: None,
            max_level: "debug".into(),
            log_target: "".into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Abort the render when the pipeline takes longer than this, 0 disables the limit.
    pub pipeline_timeout_ms: u64,

    /// How long the failure banner stays visible.
    pub banner_ttl_ms: u64,

    /// Whether to wrap code blocks with a copy button.
    pub copy_buttons: bool,

    /// Deepest heading level listed in the generated table of contents.
    pub toc_max_depth: u8,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            pipeline_timeout_ms: DEFAULT_PIPELINE_TIMEOUT.as_millis() as u64,
            banner_ttl_ms: DEFAULT_BANNER_TTL.as_millis() as u64,
            copy_buttons: false,
            toc_max_depth: 6,
        }
    }
}

impl RenderConfig {
    pub fn pipeline_timeout(&self) -> Option<Duration> {
        (self.pipeline_timeout_ms > 0).then(|| Duration::from_millis(self.pipeline_timeout_ms))
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            copy_buttons: self.copy_buttons,
            toc_max_depth: self.toc_max_depth,
            ..Default::default()
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Config {
    /// Log configuration.
    pub log: LogConfig,

    /// Render configuration.
    pub render: RenderConfig,

    /// External resources referenced by the rendered document.
    pub resources: Resources,
}

impl Config {
    pub fn replacer_options(&self) -> ReplacerOptions {
        ReplacerOptions {
            pipeline: self.render.pipeline_config(),
            resources: self.resources.clone(),
            pipeline_timeout: self.render.pipeline_timeout(),
            banner_ttl: Duration::from_millis(self.render.banner_ttl_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use preview_core::shell::ExternalResource;

    #[test]
    fn test_load_config() {
        let toml_content = r#"
          [log]
          max-level = "trace"
          log-file = "/tmp/peekdown.log"

          [render]
          pipeline-timeout-ms = 0
          copy-buttons = true

          [resources]
          extension-stylesheet = "preview.css"

          [[resources.stylesheets]]
          href = "https://example.com/theme.css"
          integrity = "sha384-abc"
"#;
        let user_config: Config =
            toml::from_str(toml_content).expect("Failed to deserialize config");

        assert_eq!(
            user_config,
            Config {
                log: LogConfig {
                    log_file: Some("/tmp/peekdown.log".to_string()),
                    max_level: "trace".to_string(),
                    ..Default::default()
                },
                render: RenderConfig {
                    pipeline_timeout_ms: 0,
                    copy_buttons: true,
                    ..Default::default()
                },
                resources: Resources {
                    stylesheets: vec![ExternalResource {
                        href: "https://example.com/theme.css".to_string(),
                        integrity: Some("sha384-abc".to_string()),
                        crossorigin: None,
                        referrerpolicy: None,
                    }],
                    extension_stylesheet: Some("preview.css".to_string()),
                    ..Default::default()
                },
            }
        );

        let options = user_config.replacer_options();
        assert!(options.pipeline_timeout.is_none());
        assert!(options.pipeline.copy_buttons);
        assert_eq!(options.banner_ttl, Duration::from_secs(5));
    }

    #[test]
    fn test_default_timeout() {
        assert_eq!(
            RenderConfig::default().pipeline_timeout(),
            Some(Duration::from_secs(10))
        );
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = toml::from_str::<Config>("[render]\nunknown = 1").unwrap_err();
        assert!(err.to_string().contains("unknown"));
    }

    #[test]
    fn test_malformed_file_falls_back_to_default() {
        let path = std::env::temp_dir().join(format!(
            "peekdown-config-test-{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "[log\nmax-level = 1").unwrap();

        let (config, maybe_error) = load_config(Some(&path));
        std::fs::remove_file(&path).ok();

        assert_eq!(config, Config::default());
        assert!(maybe_error.is_some());
    }

    #[test]
    fn test_missing_file_is_default() {
        let (config, maybe_error) = load_config(Some(Path::new("/nonexistent/peekdown.toml")));
        assert_eq!(config, Config::default());
        assert!(maybe_error.is_none());
    }
}
