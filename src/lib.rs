//! # paperharvest
//!
//! Batch abstract/keyword harvester for research paper lists.
//!
//! ## Modules
//!
//! - [`normalize`] - Text cleanup for extracted fields
//! - [`scopus`] - Publisher page extraction (primary tier)
//! - [`crossref`] - CrossRef DOI lookup (fallback tier)
//! - [`processor`] - Two-tier per-record extraction policy
//! - [`records`] - Record model, CSV input/output, checkpoint I/O
//! - [`runner`] - Batch run controller with checkpointed resume
//! - [`error`] - Custom error types

pub mod crossref;
pub mod error;
pub mod normalize;
pub mod processor;
pub mod records;
pub mod runner;
pub mod scopus;

pub use error::{HarvestError, Result};
