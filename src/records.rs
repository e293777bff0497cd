//! Paper record model and tabular I/O.
//!
//! The source list, the final output and the checkpoint all round-trip
//! through serde-derived CSV rows, so a checkpoint written by one run merges
//! cleanly into the next. The run controller owns the record collection and
//! the checkpoint file; nothing else touches either.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// One paper from the source list. `link` is the natural key; `abstract_text`
/// and `keywords` start empty and are filled in by processing.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PaperRecord {
    #[serde(rename = "Title", default)]
    pub title: String,
    #[serde(rename = "Link")]
    pub link: String,
    #[serde(rename = "DOI", default)]
    pub doi: String,
    #[serde(rename = "Abstract", default)]
    pub abstract_text: String,
    #[serde(rename = "Keywords", default)]
    pub keywords: String,
}

impl PaperRecord {
    /// A record counts as processed once its abstract is non-empty.
    pub fn has_abstract(&self) -> bool {
        !self.abstract_text.trim().is_empty()
    }
}

/// One checkpoint row: the processed subset of a record, keyed by link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointRow {
    #[serde(rename = "Link")]
    pub link: String,
    #[serde(rename = "Abstract", default)]
    pub abstract_text: String,
    #[serde(rename = "Keywords", default)]
    pub keywords: String,
}

/// Read the full record set from the source store. Failure here is fatal to
/// the run.
pub fn load_records(path: &Path) -> Result<Vec<PaperRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for row in reader.deserialize() {
        records.push(row?);
    }
    info!(path = %path.display(), count = records.len(), "Loaded records");
    Ok(records)
}

/// Write the complete record set to the output store, preserving input order.
pub fn write_records(path: &Path, records: &[PaperRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    if records.is_empty() {
        // serialize never runs, so the header has to be written by hand for
        // the file to round-trip through load_records.
        writer.write_record(["Title", "Link", "DOI", "Abstract", "Keywords"])?;
    }
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    info!(path = %path.display(), count = records.len(), "Wrote output");
    Ok(())
}

/// Read a checkpoint left by a prior run.
pub fn read_checkpoint(path: &Path) -> Result<Vec<CheckpointRow>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

/// Overwrite the checkpoint with a snapshot of every record processed so far
/// (from index 0, not just this run's work).
pub fn write_checkpoint(path: &Path, records: &[PaperRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(CheckpointRow {
            link: record.link.clone(),
            abstract_text: record.abstract_text.clone(),
            keywords: record.keywords.clone(),
        })?;
    }
    writer.flush()?;
    debug!(path = %path.display(), rows = records.len(), "Checkpoint written");
    Ok(())
}

/// Delete the checkpoint after a clean full run. Missing file is fine.
pub fn remove_checkpoint(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Left-join checkpoint rows onto the record set by link and return the
/// resume index: the count of records now carrying an abstract.
///
/// Count-based resume matches the checkpoint layout (rows are written in
/// record order), but it is positional, not identity-based: if non-empty
/// abstracts are scattered rather than contiguous, the offset can skip
/// unprocessed records or redo finished ones.
pub fn merge_checkpoint(records: &mut [PaperRecord], rows: &[CheckpointRow]) -> usize {
    let by_link: HashMap<&str, &CheckpointRow> =
        rows.iter().map(|r| (r.link.as_str(), r)).collect();

    for record in records.iter_mut() {
        if let Some(row) = by_link.get(record.link.as_str()) {
            record.abstract_text = row.abstract_text.clone();
            record.keywords = row.keywords.clone();
        }
    }

    records.iter().filter(|r| r.has_abstract()).count()
}
