//! CrossRef API client, the DOI fallback tier.
//!
//! When the publisher page yields no abstract, the record's DOI is resolved
//! against the CrossRef works API. CrossRef serves abstracts as JATS XML
//! fragments, so hits are normalized before use. Keywords are never available
//! through this tier.

use crate::error::{HarvestError, Result};
use crate::normalize::normalize;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// CrossRef works API base URL
const CROSSREF_API_URL: &str = "https://api.crossref.org/works";

/// Polite pool contact for the CrossRef User-Agent
const MAILTO: &str = "paperharvest@example.com";

/// DOI lookup timeout in seconds
const LOOKUP_TIMEOUT_SECS: u64 = 10;

/// CrossRef works API client
pub struct DoiClient {
    client: reqwest::Client,
}

impl DoiClient {
    /// Create a new DoiClient with a bounded timeout.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(format!("paperharvest/0.1 (mailto:{})", MAILTO))
            .timeout(Duration::from_secs(LOOKUP_TIMEOUT_SECS))
            .build()
            .map_err(|e| HarvestError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Look up a DOI and return its normalized abstract, if CrossRef has one.
    ///
    /// Missing abstracts are the common case here, so every failure mode
    /// (network, non-2xx, malformed JSON, absent field) is logged at debug
    /// level and collapses to `None`.
    pub async fn abstract_by_doi(&self, doi: &str) -> Option<String> {
        let doi = doi.trim();
        if doi.is_empty() {
            return None;
        }

        match self.do_lookup(doi).await {
            Ok(found) => found,
            Err(e) => {
                debug!(doi = doi, error = %e, "CrossRef lookup failed");
                None
            }
        }
    }

    async fn do_lookup(&self, doi: &str) -> Result<Option<String>> {
        let url = format!("{}/{}", CROSSREF_API_URL, doi);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(HarvestError::Status {
                code: status.as_u16(),
                url,
            });
        }

        let body: WorksResponse = response.json().await?;
        Ok(extract_abstract(&body))
    }
}

// === CrossRef API response types ===

#[derive(Debug, Deserialize)]
struct WorksResponse {
    message: WorksMessage,
}

#[derive(Debug, Deserialize)]
struct WorksMessage {
    #[serde(rename = "abstract", default)]
    abstract_text: Option<String>,
}

/// Pull the normalized `message.abstract` field out of a works response.
fn extract_abstract(body: &WorksResponse) -> Option<String> {
    body.message
        .abstract_text
        .as_deref()
        .map(normalize)
        .filter(|t| !t.is_empty())
}
