//! Publisher page extraction, the primary tier.
//!
//! Fetches a record's Scopus-style article page and pulls the abstract and
//! keyword fields out of the HTML. Abstract lookup runs through an ordered
//! list of [`AbstractStrategy`] values, stopping at the first hit, so new page
//! layouts can be supported by extending the list.

use crate::error::{HarvestError, Result};
use crate::normalize::normalize;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, warn};

/// Browser-identifying User-Agent; subscription portals reject bare clients.
const USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

/// Page fetch timeout in seconds
const FETCH_TIMEOUT_SECS: u64 = 15;

/// One way of locating an abstract in a parsed document.
///
/// Strategies are tried in the order of [`ABSTRACT_STRATEGIES`]; the first one
/// producing non-empty normalized text wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbstractStrategy {
    /// `section#abstractSection` container with a nested `div.abstract`
    AbstractSection,
    /// Any bare `div.abstract` element
    AbstractDiv,
    /// `meta[name="description"]` content attribute
    MetaDescription,
}

/// Lookup order for the abstract field.
pub const ABSTRACT_STRATEGIES: &[AbstractStrategy] = &[
    AbstractStrategy::AbstractSection,
    AbstractStrategy::AbstractDiv,
    AbstractStrategy::MetaDescription,
];

impl AbstractStrategy {
    /// Attempt extraction from a parsed document.
    ///
    /// Returns normalized text, or `None` when the strategy's elements are
    /// missing or normalize to nothing.
    fn attempt(&self, document: &Html) -> Result<Option<String>> {
        let text = match self {
            AbstractStrategy::AbstractSection => {
                let section = parse_selector("section#abstractSection")?;
                let inner = parse_selector("div.abstract")?;
                document
                    .select(&section)
                    .next()
                    .and_then(|s| s.select(&inner).next())
                    .map(|e| normalize(&e.text().collect::<String>()))
            }
            AbstractStrategy::AbstractDiv => {
                let selector = parse_selector("div.abstract")?;
                document
                    .select(&selector)
                    .next()
                    .map(|e| normalize(&e.text().collect::<String>()))
            }
            AbstractStrategy::MetaDescription => {
                let selector = parse_selector(r#"meta[name="description"]"#)?;
                document
                    .select(&selector)
                    .next()
                    .and_then(|e| e.value().attr("content"))
                    .map(normalize)
            }
        };

        Ok(text.filter(|t| !t.is_empty()))
    }
}

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| HarvestError::Parse(e.to_string()))
}

/// Parse a fetched page body into `(abstract, keywords)`.
///
/// Pure over the HTML string; network failures never reach this function.
pub fn parse_page(html: &str) -> Result<(Option<String>, Option<String>)> {
    let document = Html::parse_document(html);

    let mut abstract_text = None;
    for strategy in ABSTRACT_STRATEGIES {
        if let Some(text) = strategy.attempt(&document)? {
            debug!(strategy = ?strategy, "Abstract located");
            abstract_text = Some(text);
            break;
        }
    }

    // Keywords are looked up independently of the abstract.
    let keyword_selector = parse_selector("span.keyword")?;
    let keywords = document
        .select(&keyword_selector)
        .next()
        .map(|e| normalize(&e.text().collect::<String>()))
        .filter(|t| !t.is_empty());

    Ok((abstract_text, keywords))
}

/// HTTP client for the publisher page tier.
pub struct PageExtractor {
    client: reqwest::Client,
}

impl PageExtractor {
    /// Build the page client with a browser User-Agent and bounded timeout.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()
            .map_err(|e| HarvestError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Fetch `url` and extract `(abstract, keywords)` from its HTML.
    ///
    /// Never propagates: any fetch or parse failure is logged with the URL
    /// and yields `(None, None)`.
    pub async fn extract(&self, url: &str) -> (Option<String>, Option<String>) {
        match self.fetch(url).await.and_then(|html| parse_page(&html)) {
            Ok(fields) => fields,
            Err(e) => {
                warn!(url = url, error = %e, "Page extraction failed");
                (None, None)
            }
        }
    }

    /// Fetch the page body, treating non-2xx statuses as errors.
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(HarvestError::Status {
                code: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text().await?)
    }
}
