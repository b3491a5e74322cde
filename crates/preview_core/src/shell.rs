//! The document shell that replaces the original page.
//!
//! The head and body are built from the embedded templates in `assets/`:
//!
//! - `{{favicon}}`, `{{stylesheets}}` and `{{title}}` in `head.html`
//! - `{{content}}` and `{{diagram_script}}` in `body.html`

use crate::pipeline::to_html_string;
use crate::tree::{Element, Node};
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};

/// Head template.
pub const HEAD_TEMPLATE: &str = include_str!("../assets/head.html");

/// Body template.
pub const BODY_TEMPLATE: &str = include_str!("../assets/body.html");

/// Title used when neither the page nor its path provide one.
pub const FALLBACK_TITLE: &str = "Markdown Preview";

/// Id of the element holding the rendered markdown.
pub const CONTENT_CONTAINER_ID: &str = "markdown-content-container";

const DEFAULT_FAVICON: &str = "data:image/svg+xml,%3Csvg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 16 16'%3E%3Crect width='16' height='16' rx='3' fill='%23333'/%3E%3Cpath d='M3 12V4h2l1.5 2L8 4h2v8H8V7L6.5 9 5 7v5z' fill='%23fff'/%3E%3C/svg%3E";

/// A stylesheet or script loaded from outside the extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ExternalResource {
    pub href: String,
    /// Subresource integrity hash.
    pub integrity: Option<String>,
    pub crossorigin: Option<String>,
    pub referrerpolicy: Option<String>,
}

impl ExternalResource {
    /// A CDN resource pinned by its integrity hash.
    pub fn pinned(href: impl Into<String>, integrity: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            integrity: Some(integrity.into()),
            crossorigin: Some("anonymous".to_string()),
            referrerpolicy: Some("no-referrer".to_string()),
        }
    }

    fn with_security_attributes(&self, mut element: Element) -> Element {
        if let Some(integrity) = &self.integrity {
            element.properties.set("integrity", integrity.as_str());
        }
        if let Some(crossorigin) = &self.crossorigin {
            element.properties.set("crossorigin", crossorigin.as_str());
        }
        if let Some(referrerpolicy) = &self.referrerpolicy {
            element.properties.set("referrerpolicy", referrerpolicy.as_str());
        }
        element
    }

    pub fn stylesheet_link(&self) -> Element {
        let link = Element::new("link")
            .with_attribute("rel", "stylesheet")
            .with_attribute("href", self.href.as_str());
        self.with_security_attributes(link)
    }

    pub fn script(&self) -> Element {
        let script = Element::new("script").with_attribute("src", self.href.as_str());
        self.with_security_attributes(script)
    }
}

/// External resources referenced by the document shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Resources {
    /// Icon URL, usually a `data:` URI.
    pub favicon: String,
    /// Stylesheets placed in the head, in order.
    pub stylesheets: Vec<ExternalResource>,
    /// Diagram rendering script placed at the end of the body.
    pub diagram_script: Option<ExternalResource>,
    /// Extension-provided stylesheet, resolved by the document host.
    pub extension_stylesheet: Option<String>,
    /// Base the document host resolves extension resources against.
    pub extension_base: Option<String>,
}

impl Default for Resources {
    fn default() -> Self {
        Self {
            favicon: DEFAULT_FAVICON.to_string(),
            stylesheets: vec![ExternalResource::pinned(
                "https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.7.2/css/all.min.css",
                "sha512-Evv84Mr4kqVGRNSgIGL/F/aIDqQb7xQ2vcrdIwxfjThSH8CSR7PBEakCr51Ck+w+/U6swU2Im1vVX0SVk9ABhg==",
            )],
            diagram_script: Some(ExternalResource::pinned(
                "https://cdnjs.cloudflare.com/ajax/libs/mermaid/11.5.0/mermaid.min.js",
                "sha512-3EZqKCkk3nMLmbrI7mfry81KH7dkzy/BoDfQrodwLQnS/RbsVlERdYP6J0oiJegRUxSOmx7Y35WNbVKSw7mipw==",
            )),
            extension_stylesheet: Some("style.css".to_string()),
            extension_base: None,
        }
    }
}

/// Head and body markup of the replacement document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentShell {
    pub head: String,
    pub body: String,
}

impl DocumentShell {
    pub fn new(resources: &Resources, title: &str, rendered_html: &str) -> Self {
        let favicon = to_html_string(&[Node::text(resources.favicon.as_str())]);
        let stylesheets = resources
            .stylesheets
            .iter()
            .map(|resource| to_html_string(&[resource.stylesheet_link().into()]))
            .collect::<Vec<_>>()
            .join("\n");
        let title = to_html_string(&[Node::text(title)]);

        let head = HEAD_TEMPLATE
            .replace("{{favicon}}", &favicon.replace('"', "&quot;"))
            .replace("{{stylesheets}}", &stylesheets)
            .replace("{{title}}", &title);

        let diagram_script = resources
            .diagram_script
            .as_ref()
            .map(|script| to_html_string(&[script.script().into()]))
            .unwrap_or_default();

        let body = BODY_TEMPLATE
            .replace("{{diagram_script}}", &diagram_script)
            .replace("{{content}}", rendered_html);

        Self { head, body }
    }

    /// Complete HTML document.
    pub fn to_html(&self) -> String {
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n{}</head>\n<body>\n{}</body>\n</html>\n",
            self.head, self.body
        )
    }
}

/// Title of the replacement document.
///
/// Uses the original title when it is not blank, otherwise the percent-decoded
/// final segment of `path`, otherwise [`FALLBACK_TITLE`].
pub fn document_title(original_title: Option<&str>, path: &str) -> String {
    if let Some(title) = original_title.map(str::trim).filter(|t| !t.is_empty()) {
        return title.to_string();
    }

    let segment = path.rsplit('/').next().unwrap_or_default();
    let decoded = percent_decode_str(segment).decode_utf8_lossy();
    if decoded.trim().is_empty() {
        FALLBACK_TITLE.to_string()
    } else {
        decoded.into_owned()
    }
}
