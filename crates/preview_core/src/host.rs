//! The browsing context a preview is rendered into.

use crate::shell::DocumentShell;
use crate::tree::{Element, Node};
use crate::pipeline::to_html_string;

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// An extension resource could not be located.
    #[error("extension resource `{name}` is unavailable: {reason}")]
    ResourceUnavailable { name: String, reason: String },

    /// The host refused a document operation.
    #[error("{operation} failed: {message}")]
    Operation {
        operation: &'static str,
        message: String,
    },
}

/// Handle of a banner shown by [`DocumentHost::show_banner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BannerId(u64);

/// Operations the document replacer performs on the page.
///
/// Implementations own the page state; the replacer only ever calls these
/// methods while holding the host lock and never across an await point.
pub trait DocumentHost: Send + 'static {
    /// Path of the page location, used for detection and the title fallback.
    fn location_path(&self) -> String;

    /// Original document title, if any.
    fn title(&self) -> Option<String>;

    /// Text of the page's preformatted element, if the page has one.
    fn preformatted_text(&self) -> Option<String>;

    fn set_body_visible(&mut self, visible: bool) -> Result<(), HostError>;

    /// Halts any further native loading of the original document.
    fn stop_loading(&mut self) -> Result<(), HostError>;

    /// Replaces the whole document structure with `shell`.
    fn replace_document(&mut self, shell: &DocumentShell) -> Result<(), HostError>;

    /// Resolves a resource bundled with the extension to a loadable URL.
    fn resolve_extension_url(&self, name: &str) -> Result<String, HostError>;

    /// Appends a stylesheet link to the document head.
    fn append_stylesheet(&mut self, href: &str) -> Result<(), HostError>;

    /// Appends a diagnostic banner to the body.
    fn show_banner(&mut self, message: &str) -> Result<BannerId, HostError>;

    /// Removes a banner, returns `false` if it was already gone.
    fn dismiss_banner(&mut self, id: BannerId) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Content {
    /// Native rendering of the raw file.
    Original { preformatted: Option<String> },
    Replaced(DocumentShell),
}

/// In-memory page, a local file opened in a browsing context.
#[derive(Debug, Clone)]
pub struct StaticPage {
    path: String,
    title: Option<String>,
    content: Content,
    body_visible: bool,
    loading: bool,
    extension_base: Option<String>,
    stylesheets: Vec<String>,
    banners: Vec<(BannerId, String)>,
    next_banner: u64,
}

impl StaticPage {
    pub fn new(path: impl Into<String>, preformatted: Option<String>) -> Self {
        Self {
            path: path.into(),
            title: None,
            content: Content::Original { preformatted },
            body_visible: true,
            loading: true,
            extension_base: None,
            stylesheets: Vec::new(),
            banners: Vec::new(),
            next_banner: 0,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Directory or URL extension resources are resolved against. Without a
    /// base, extension resources are unavailable.
    pub fn with_extension_base(mut self, base: impl Into<String>) -> Self {
        self.extension_base = Some(base.into());
        self
    }

    pub fn is_body_visible(&self) -> bool {
        self.body_visible
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_replaced(&self) -> bool {
        matches!(self.content, Content::Replaced(_))
    }

    pub fn shell(&self) -> Option<&DocumentShell> {
        match &self.content {
            Content::Replaced(shell) => Some(shell),
            Content::Original { .. } => None,
        }
    }

    /// Stylesheets appended after the document was built.
    pub fn stylesheets(&self) -> &[String] {
        &self.stylesheets
    }

    /// Messages of the banners currently shown.
    pub fn banners(&self) -> Vec<&str> {
        self.banners.iter().map(|(_, msg)| msg.as_str()).collect()
    }

    /// Serializes the current page state.
    pub fn to_html(&self) -> String {
        let mut head = String::new();
        let mut body = String::new();

        match &self.content {
            Content::Original { preformatted } => {
                if let Some(title) = &self.title {
                    head.push_str(&to_html_string(&[Element::new("title")
                        .with_text(title.as_str())
                        .into()]));
                    head.push('\n');
                }
                if let Some(text) = preformatted {
                    body.push_str(&to_html_string(&[Element::new("pre")
                        .with_text(text.as_str())
                        .into()]));
                }
            }
            Content::Replaced(shell) => {
                head.push_str(&shell.head);
                body.push_str(&shell.body);
            }
        }

        for href in &self.stylesheets {
            let link = Element::new("link")
                .with_attribute("rel", "stylesheet")
                .with_attribute("href", href.as_str());
            head.push_str(&to_html_string(&[link.into()]));
            head.push('\n');
        }

        for (_, message) in &self.banners {
            body.push_str(&to_html_string(&[banner_element(message).into()]));
        }

        let body_open = if self.body_visible {
            "<body>"
        } else {
            "<body style=\"display: none\">"
        };

        format!("<!DOCTYPE html>\n<html>\n<head>\n{head}</head>\n{body_open}\n{body}</body>\n</html>\n")
    }
}

fn banner_element(message: &str) -> Element {
    Element::new("div")
        .with_class("render-error-banner")
        .with_attribute("role", "alert")
        .with_attribute(
            "style",
            "position: fixed; top: 10px; right: 10px; background: #000000; color: white; \
             padding: 10px; border-radius: 4px; z-index: 10000; font-family: monospace;",
        )
        .with_child(Node::text(message))
}

impl DocumentHost for StaticPage {
    fn location_path(&self) -> String {
        self.path.clone()
    }

    fn title(&self) -> Option<String> {
        self.title.clone()
    }

    fn preformatted_text(&self) -> Option<String> {
        match &self.content {
            Content::Original { preformatted } => preformatted.clone(),
            Content::Replaced(_) => None,
        }
    }

    fn set_body_visible(&mut self, visible: bool) -> Result<(), HostError> {
        self.body_visible = visible;
        Ok(())
    }

    fn stop_loading(&mut self) -> Result<(), HostError> {
        self.loading = false;
        Ok(())
    }

    fn replace_document(&mut self, shell: &DocumentShell) -> Result<(), HostError> {
        self.content = Content::Replaced(shell.clone());
        self.stylesheets.clear();
        self.banners.clear();
        Ok(())
    }

    fn resolve_extension_url(&self, name: &str) -> Result<String, HostError> {
        match &self.extension_base {
            Some(base) => Ok(format!("{}/{name}", base.trim_end_matches('/'))),
            None => Err(HostError::ResourceUnavailable {
                name: name.to_string(),
                reason: "no extension base configured".to_string(),
            }),
        }
    }

    fn append_stylesheet(&mut self, href: &str) -> Result<(), HostError> {
        if !self.is_replaced() {
            return Err(HostError::Operation {
                operation: "append stylesheet",
                message: "document has not been replaced".to_string(),
            });
        }
        self.stylesheets.push(href.to_string());
        Ok(())
    }

    fn show_banner(&mut self, message: &str) -> Result<BannerId, HostError> {
        let id = BannerId(self.next_banner);
        self.next_banner += 1;
        self.banners.push((id, message.to_string()));
        Ok(id)
    }

    fn dismiss_banner(&mut self, id: BannerId) -> bool {
        let before = self.banners.len();
        self.banners.retain(|(banner, _)| *banner != id);
        self.banners.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::Resources;

    #[test]
    fn test_original_page() {
        let page = StaticPage::new("/a.md", Some("# <Hi>".into())).with_title("A");
        let html = page.to_html();
        assert!(html.contains("<title>A</title>"));
        assert!(html.contains("<pre># &lt;Hi&gt;</pre>"));
        assert!(page.is_loading());
    }

    #[test]
    fn test_replace_and_stylesheet() {
        let mut page = StaticPage::new("/a.md", Some("x".into())).with_extension_base("ext/");
        assert!(page.append_stylesheet("early.css").is_err());

        let shell = DocumentShell::new(&Resources::default(), "t", "<p>x</p>");
        page.replace_document(&shell).unwrap();
        let href = page.resolve_extension_url("style.css").unwrap();
        assert_eq!(href, "ext/style.css");
        page.append_stylesheet(&href).unwrap();

        assert!(page.preformatted_text().is_none());
        assert!(page.to_html().contains("<link rel=\"stylesheet\" href=\"ext/style.css\">"));
    }

    #[test]
    fn test_unresolved_extension_resource() {
        let page = StaticPage::new("/a.md", None);
        let err = page.resolve_extension_url("style.css").unwrap_err();
        assert!(matches!(err, HostError::ResourceUnavailable { .. }));
    }

    #[test]
    fn test_banners() {
        let mut page = StaticPage::new("/a.md", None);
        let first = page.show_banner("one").unwrap();
        let _second = page.show_banner("two").unwrap();
        assert!(page.to_html().contains("role=\"alert\""));
        assert!(page.dismiss_banner(first));
        assert!(!page.dismiss_banner(first));
        assert_eq!(page.banners(), vec!["two"]);
    }

    #[test]
    fn test_hidden_body() {
        let mut page = StaticPage::new("/a.md", None);
        page.set_body_visible(false).unwrap();
        assert!(page.to_html().contains("<body style=\"display: none\">"));
    }
}
