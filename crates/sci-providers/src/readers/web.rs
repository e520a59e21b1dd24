//! Breadth-first site crawler.
//!
//! Crawls same-host pages up to a configured depth, converting each to
//! markdown. Page fetch failures are logged and skipped; the crawl itself
//! only fails when the start URL is unreachable.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use sci_domain::entities::{Document, DocumentMetadata};
use sci_domain::error::{Error, Result};
use sci_domain::ports::providers::DocumentReader;
use sci_domain::registry::reader::{ReaderConfig, ReaderEntry, READER_PROVIDERS};
use tracing::warn;
use url::Url;

use super::url::{fetch_raw, html_to_markdown};

/// Upper bound on pages per crawl.
const MAX_PAGES: usize = 50;

/// Breadth-first crawler rooted at one URL.
pub struct WebCrawlReader {
    client: reqwest::Client,
    start_url: String,
    max_depth: usize,
}

impl WebCrawlReader {
    /// Create a crawler for the given start URL and depth.
    #[must_use]
    pub fn new(start_url: String, max_depth: usize) -> Self {
        Self {
            client: reqwest::Client::new(),
            start_url,
            max_depth,
        }
    }

    /// Absolute same-host links found in a page body.
    fn extract_links(base: &Url, body: &str) -> Vec<Url> {
        // Anchors only; fragments and external hosts are dropped below.
        let href = Regex::new(r##"href="([^"#]+)""##).ok();
        let Some(href) = href else {
            return Vec::new();
        };

        href.captures_iter(body)
            .filter_map(|c| base.join(&c[1]).ok())
            .filter(|link| link.host_str() == base.host_str())
            .collect()
    }
}

#[async_trait]
impl DocumentReader for WebCrawlReader {
    async fn load(&self) -> Result<Vec<Document>> {
        let start = Url::parse(&self.start_url)
            .map_err(|e| Error::read_with_source(format!("Invalid URL '{}'", self.start_url), e))?;

        let mut documents = Vec::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<(Url, usize)> = VecDeque::from([(start, 0)]);

        while let Some((url, depth)) = queue.pop_front() {
            if documents.len() >= MAX_PAGES {
                break;
            }
            if !visited.insert(url.to_string()) {
                continue;
            }

            let (body, was_html) = match fetch_raw(&self.client, url.as_str()).await {
                Ok(page) => page,
                Err(e) if documents.is_empty() && depth == 0 => return Err(e),
                Err(e) => {
                    warn!(url = %url, error = %e, "Skipping unreachable page");
                    continue;
                }
            };

            // Links must come from the raw HTML; conversion strips anchors.
            if was_html && depth < self.max_depth {
                for link in Self::extract_links(&url, &body) {
                    queue.push_back((link, depth + 1));
                }
            }

            let text = if was_html {
                html_to_markdown(body)
            } else {
                body
            };

            documents.push(Document::new(
                url.to_string(),
                text,
                DocumentMetadata {
                    file_name: url.path().rsplit('/').next().unwrap_or_default().to_owned(),
                    path: url.to_string(),
                    role: None,
                    timestamp: None,
                    source: Some("web".to_owned()),
                },
            ));
        }

        Ok(documents)
    }

    fn reader_name(&self) -> &str {
        "web"
    }
}

fn web_factory(config: &ReaderConfig) -> std::result::Result<Arc<dyn DocumentReader>, String> {
    Ok(Arc::new(WebCrawlReader::new(
        config.source.clone(),
        config.crawl_depth,
    )))
}

#[linkme::distributed_slice(READER_PROVIDERS)]
static WEB_READER: ReaderEntry = ReaderEntry {
    name: "web",
    description: "Breadth-first same-host crawler",
    build: web_factory,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn links_are_resolved_and_host_filtered() {
        let base = Url::parse("https://docs.example.com/guide/").expect("url");
        let body = r##"<a href="intro.html">intro</a>
                       <a href="/api/index.html">api</a>
                       <a href="https://other.com/x">external</a>
                       <a href="#section">fragment</a>"##;

        let links = WebCrawlReader::extract_links(&base, body);
        let strings: Vec<String> = links.iter().map(std::string::ToString::to_string).collect();
        assert!(strings.contains(&"https://docs.example.com/guide/intro.html".to_owned()));
        assert!(strings.contains(&"https://docs.example.com/api/index.html".to_owned()));
        assert_eq!(strings.len(), 2);
    }
}
