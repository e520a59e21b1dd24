//! Single URL reader.
//!
//! Fetches one page and converts HTML payloads to markdown; non-HTML
//! payloads are kept verbatim.

use std::sync::Arc;

use async_trait::async_trait;
use sci_domain::entities::{Document, DocumentMetadata};
use sci_domain::error::{Error, Result};
use sci_domain::ports::providers::DocumentReader;
use sci_domain::registry::reader::{ReaderConfig, ReaderEntry, READER_PROVIDERS};

/// Reads one document from a URL.
pub struct UrlReader {
    client: reqwest::Client,
    url: String,
}

impl UrlReader {
    /// Create a reader for the given URL.
    #[must_use]
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }
}

/// Fetch a page verbatim and return `(body, was_html)`.
pub(crate) async fn fetch_raw(client: &reqwest::Client, url: &str) -> Result<(String, bool)> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| Error::read_with_source(format!("Failed to fetch {url}"), e))?;

    if !response.status().is_success() {
        return Err(Error::read(format!(
            "Fetching {url} returned {}",
            response.status()
        )));
    }

    let is_html = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("text/html"));

    let body = response
        .text()
        .await
        .map_err(|e| Error::read_with_source(format!("Failed to read body of {url}"), e))?;

    Ok((body, is_html))
}

/// Convert an HTML page to markdown, keeping the source when conversion
/// fails.
pub(crate) fn html_to_markdown(html: String) -> String {
    htmd::HtmlToMarkdown::builder()
        .skip_tags(vec!["script", "style", "img", "video", "audio", "embed"])
        .build()
        .convert(&html)
        .unwrap_or(html)
}

/// Fetch a page and convert HTML payloads to markdown.
pub(crate) async fn fetch_page(client: &reqwest::Client, url: &str) -> Result<(String, bool)> {
    let (body, is_html) = fetch_raw(client, url).await?;
    if is_html {
        Ok((html_to_markdown(body), true))
    } else {
        Ok((body, false))
    }
}

#[async_trait]
impl DocumentReader for UrlReader {
    async fn load(&self) -> Result<Vec<Document>> {
        let (text, _) = fetch_page(&self.client, &self.url).await?;
        Ok(vec![Document::new(
            self.url.clone(),
            text,
            DocumentMetadata {
                file_name: self
                    .url
                    .rsplit('/')
                    .next()
                    .unwrap_or_default()
                    .to_owned(),
                path: self.url.clone(),
                role: None,
                timestamp: None,
                source: Some("url".to_owned()),
            },
        )])
    }

    fn reader_name(&self) -> &str {
        "url"
    }
}

fn url_factory(config: &ReaderConfig) -> std::result::Result<Arc<dyn DocumentReader>, String> {
    Ok(Arc::new(UrlReader::new(config.source.clone())))
}

#[linkme::distributed_slice(READER_PROVIDERS)]
static URL_READER: ReaderEntry = ReaderEntry {
    name: "url",
    description: "Single URL fetcher with HTML-to-markdown conversion",
    build: url_factory,
};
