//! Decides whether the current page is a raw markdown file worth rendering.

/// File extensions treated as markdown, lowercase.
pub const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];

/// Raw markdown read from the page, alive for a single render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// Location path the text was loaded from.
    pub path: String,
    /// Text content of the page's preformatted element.
    pub text: String,
}

/// Returns `true` if the final segment of `path` carries a markdown extension.
///
/// Matching is case-insensitive. Query strings and fragments are not part of a
/// location path and are not stripped.
///
/// # Examples
///
/// ```
/// use preview_core::detector::is_markdown_path;
///
/// assert!(is_markdown_path("/docs/README.md"));
/// assert!(is_markdown_path("/notes/todo.MARKDOWN"));
/// assert!(!is_markdown_path("/index.html"));
/// assert!(!is_markdown_path("/docs/md"));
/// ```
pub fn is_markdown_path(path: &str) -> bool {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    match file_name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => {
            let ext = ext.to_ascii_lowercase();
            MARKDOWN_EXTENSIONS.iter().any(|e| *e == ext)
        }
        _ => false,
    }
}

/// Fails closed: both a markdown path and non-empty preformatted content are required.
pub fn detect(path: &str, preformatted: Option<String>) -> Option<SourceDocument> {
    if !is_markdown_path(path) {
        tracing::debug!(path, "Not a markdown file");
        return None;
    }

    match preformatted {
        Some(text) if !text.is_empty() => Some(SourceDocument {
            path: path.to_string(),
            text,
        }),
        _ => {
            tracing::debug!(path, "No markdown content found");
            None
        }
    }
}

pub fn should_render(path: &str, preformatted: Option<&str>) -> bool {
    detect(path, preformatted.map(str::to_string)).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_extensions() {
        assert!(is_markdown_path("README.md"));
        assert!(is_markdown_path("/a/b/c.markdown"));
        assert!(is_markdown_path("/a/b/c.Md"));
        assert!(is_markdown_path("/a.b/c.md"));
    }

    #[test]
    fn test_non_markdown_paths() {
        assert!(!is_markdown_path(""));
        assert!(!is_markdown_path("/"));
        assert!(!is_markdown_path("/readme.txt"));
        assert!(!is_markdown_path("/dir.md/readme"));
        assert!(!is_markdown_path("/readme.md.html"));
        assert!(!is_markdown_path("/readme."));
    }

    #[test]
    fn test_requires_content() {
        assert!(!should_render("/a.md", None));
        assert!(!should_render("/a.md", Some("")));
        assert!(should_render("/a.md", Some("# Hi")));
        assert!(should_render("/a.md", Some("  ")));
    }

    #[test]
    fn test_wrong_extension_with_content() {
        assert!(!should_render("/a.txt", Some("# Hi")));
    }

    #[test]
    fn test_detect_returns_source() {
        let source = detect("/x/y.md", Some("text".into())).unwrap();
        assert_eq!(source.path, "/x/y.md");
        assert_eq!(source.text, "text");
    }
}
