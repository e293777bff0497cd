//! Per-record extraction policy.
//!
//! A record is tried against two tiers in strict order: the publisher page
//! first, the CrossRef DOI lookup second. The first tier that produces an
//! abstract wins and the other is never attempted.

use crate::crossref::DoiClient;
use crate::records::PaperRecord;
use crate::scopus::PageExtractor;
use std::fmt;

/// Classification of a single record's extraction result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    /// Abstract came from the publisher page
    ScopusSuccess,
    /// Abstract came from the CrossRef DOI lookup
    DoiSuccess,
    /// Neither tier produced an abstract
    Failed,
}

impl OutcomeStatus {
    /// Whether either tier succeeded
    pub fn is_success(&self) -> bool {
        !matches!(self, OutcomeStatus::Failed)
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutcomeStatus::ScopusSuccess => write!(f, "Success - Scopus"),
            OutcomeStatus::DoiSuccess => write!(f, "Success - DOI"),
            OutcomeStatus::Failed => write!(f, "Failed"),
        }
    }
}

/// Result of processing one record. Transient; the run controller copies the
/// fields back into the record.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub abstract_text: String,
    pub keywords: String,
    pub status: OutcomeStatus,
}

/// Two-tier extractor applied to each record
pub struct PaperProcessor {
    pages: PageExtractor,
    doi: DoiClient,
}

impl PaperProcessor {
    pub fn new(pages: PageExtractor, doi: DoiClient) -> Self {
        Self { pages, doi }
    }

    /// Run the ordered fallback policy for one record.
    ///
    /// Infallible: both tiers absorb their own failures and report absence.
    pub async fn process(&self, record: &PaperRecord) -> Outcome {
        let primary = if record.link.trim().is_empty() {
            (None, None)
        } else {
            self.pages.extract(record.link.trim()).await
        };

        if let Some(outcome) = resolve_primary(primary) {
            return outcome;
        }

        let fallback = if record.doi.trim().is_empty() {
            None
        } else {
            self.doi.abstract_by_doi(record.doi.trim()).await
        };

        resolve_fallback(fallback)
    }
}

/// Tier-1 resolution: an outcome only when the page yielded an abstract.
///
/// Keywords found alongside a missing abstract are discarded with it.
fn resolve_primary(primary: (Option<String>, Option<String>)) -> Option<Outcome> {
    let (abstract_text, keywords) = primary;
    abstract_text.map(|abstract_text| Outcome {
        abstract_text,
        keywords: keywords.unwrap_or_default(),
        status: OutcomeStatus::ScopusSuccess,
    })
}

/// Tier-2 resolution: a DOI hit or the terminal failure outcome.
fn resolve_fallback(fallback: Option<String>) -> Outcome {
    match fallback {
        Some(abstract_text) => Outcome {
            abstract_text,
            keywords: String::new(),
            status: OutcomeStatus::DoiSuccess,
        },
        None => Outcome {
            abstract_text: String::new(),
            keywords: String::new(),
            status: OutcomeStatus::Failed,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_hit_short_circuits() {
        let outcome = resolve_primary((Some("From page".into()), Some("kw".into())))
            .expect("primary outcome");
        assert_eq!(outcome.status, OutcomeStatus::ScopusSuccess);
        assert_eq!(outcome.abstract_text, "From page");
        assert_eq!(outcome.keywords, "kw");
    }

    #[test]
    fn test_primary_hit_without_keywords() {
        let outcome = resolve_primary((Some("From page".into()), None)).expect("primary outcome");
        assert_eq!(outcome.keywords, "");
        assert_eq!(outcome.status, OutcomeStatus::ScopusSuccess);
    }

    #[test]
    fn test_keywords_discarded_when_abstract_missing() {
        // Keywords found on a page without an abstract never surface.
        assert!(resolve_primary((None, Some("orphan keywords".into()))).is_none());
    }

    #[test]
    fn test_fallback_hit() {
        let outcome = resolve_fallback(Some("From CrossRef".into()));
        assert_eq!(outcome.status, OutcomeStatus::DoiSuccess);
        assert_eq!(outcome.abstract_text, "From CrossRef");
        assert_eq!(outcome.keywords, "");
    }

    #[test]
    fn test_both_tiers_empty_is_failed() {
        let outcome = resolve_fallback(None);
        assert_eq!(outcome.status, OutcomeStatus::Failed);
        assert_eq!(outcome.abstract_text, "");
        assert!(!outcome.status.is_success());
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(OutcomeStatus::ScopusSuccess.to_string(), "Success - Scopus");
        assert_eq!(OutcomeStatus::DoiSuccess.to_string(), "Success - DOI");
        assert_eq!(OutcomeStatus::Failed.to_string(), "Failed");
    }
}
