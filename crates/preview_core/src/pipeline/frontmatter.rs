//! Frontmatter blocks at the very start of a document.

use super::PipelineError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Structured format of a frontmatter block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrontmatterFormat {
    /// Delimited by `---` lines.
    Yaml,
    /// Delimited by `+++` lines.
    Toml,
}

impl fmt::Display for FrontmatterFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yaml => f.write_str("yaml"),
            Self::Toml => f.write_str("toml"),
        }
    }
}

/// Parsed frontmatter; excluded from the rendered body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frontmatter {
    pub format: FrontmatterFormat,
    pub data: serde_json::Value,
}

impl Frontmatter {
    pub fn parse(format: FrontmatterFormat, raw: &str) -> Result<Self, PipelineError> {
        let invalid = |message: String| PipelineError::Frontmatter { format, message };

        let data = match format {
            FrontmatterFormat::Yaml => {
                let value: serde_yaml::Value =
                    serde_yaml::from_str(raw).map_err(|e| invalid(e.to_string()))?;
                serde_json::to_value(value).map_err(|e| invalid(e.to_string()))?
            }
            FrontmatterFormat::Toml => {
                let table: toml::Table = toml::from_str(raw).map_err(|e| invalid(e.to_string()))?;
                serde_json::to_value(table).map_err(|e| invalid(e.to_string()))?
            }
        };

        Ok(Self { format, data })
    }

    /// String value of a top-level key, if any.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(serde_json::Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml() {
        let fm = Frontmatter::parse(FrontmatterFormat::Yaml, "title: Hello\ntags: [a, b]").unwrap();
        assert_eq!(fm.get_str("title"), Some("Hello"));
        assert_eq!(fm.data["tags"][1], "b");
    }

    #[test]
    fn test_parse_toml() {
        let fm = Frontmatter::parse(FrontmatterFormat::Toml, "title = \"Hello\"\ndraft = true").unwrap();
        assert_eq!(fm.get_str("title"), Some("Hello"));
        assert_eq!(fm.data["draft"], true);
    }

    #[test]
    fn test_malformed_yaml() {
        let err = Frontmatter::parse(FrontmatterFormat::Yaml, "title: [unclosed").unwrap_err();
        assert!(err.to_string().starts_with("invalid yaml frontmatter"));
    }

    #[test]
    fn test_malformed_toml() {
        let err = Frontmatter::parse(FrontmatterFormat::Toml, "title = ").unwrap_err();
        assert!(err.to_string().starts_with("invalid toml frontmatter"));
    }
}
