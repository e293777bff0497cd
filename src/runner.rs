//! Batch run controller.
//!
//! Drives a whole run through its states: Loading -> Resuming -> Iterating ->
//! Finalizing. Owns the in-memory record collection and the checkpoint file.
//! Strictly sequential: one record, one HTTP call at a time, with a fixed
//! pause between records.

use crate::error::Result;
use crate::processor::PaperProcessor;
use crate::records::{
    load_records, merge_checkpoint, read_checkpoint, remove_checkpoint, write_checkpoint,
    write_records, CheckpointRow, PaperRecord,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, warn};

/// Fixed inter-record pause consulted by the controller between records.
///
/// An explicit policy object so tests can run with [`RateLimit::none`].
#[derive(Debug, Clone)]
pub struct RateLimit {
    delay: Duration,
}

impl RateLimit {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Zero-delay policy for tests
    pub fn none() -> Self {
        Self {
            delay: Duration::ZERO,
        }
    }

    /// Pause between records, regardless of the previous record's outcome.
    pub async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

/// Configuration for one batch run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Source record store (CSV with Link and DOI columns)
    pub input: PathBuf,
    /// Final output store
    pub output: PathBuf,
    /// Checkpoint file, overwritten periodically and removed on completion
    pub checkpoint: PathBuf,
    /// Records processed between checkpoint snapshots
    pub batch_size: usize,
    /// Inter-record pacing
    pub rate: RateLimit,
}

/// Derived end-of-run statistics
#[derive(Debug, Clone, Copy)]
pub struct RunStats {
    pub total: usize,
    pub succeeded: usize,
}

impl RunStats {
    pub fn from_records(records: &[PaperRecord]) -> Self {
        Self {
            total: records.len(),
            succeeded: records.iter().filter(|r| r.has_abstract()).count(),
        }
    }

    /// Percentage of records with a non-empty abstract
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.succeeded as f64 / self.total as f64) * 100.0
    }
}

/// Executes one full batch run
pub struct Runner {
    config: RunConfig,
    processor: PaperProcessor,
}

impl Runner {
    pub fn new(config: RunConfig, processor: PaperProcessor) -> Self {
        Self { config, processor }
    }

    /// Run to completion. Only an unreadable input or unwritable output is
    /// fatal; everything per-record is absorbed and logged.
    pub async fn run(&self) -> Result<RunStats> {
        // Loading
        let mut records = load_records(&self.config.input)?;
        let total = records.len();

        // Resuming
        let checkpoint_rows = if self.config.checkpoint.exists() {
            Some(read_checkpoint(&self.config.checkpoint)?)
        } else {
            None
        };
        let resume_index = resume_state(&mut records, checkpoint_rows.as_deref());
        if resume_index > 0 {
            info!(
                resume_index = resume_index,
                total = total,
                "Resuming from checkpoint"
            );
        }

        // Iterating
        let progress = make_progress_bar((total - resume_index) as u64);
        let mut processed_this_run = 0usize;

        for index in resume_index..total {
            let outcome = self.processor.process(&records[index]).await;
            records[index].abstract_text = outcome.abstract_text;
            records[index].keywords = outcome.keywords;

            if outcome.status.is_success() {
                info!(
                    paper = index + 1,
                    total = total,
                    status = %outcome.status,
                    "Extracted"
                );
            } else {
                warn!(paper = index + 1, total = total, "Failed");
            }

            processed_this_run += 1;
            if self.config.batch_size > 0 && processed_this_run % self.config.batch_size == 0 {
                // Snapshot covers everything processed so far, from index 0.
                match write_checkpoint(&self.config.checkpoint, &records[..=index]) {
                    Ok(()) => info!(papers = index + 1, "Checkpoint saved"),
                    Err(e) => error!(error = %e, "Checkpoint write failed"),
                }
            }

            progress.inc(1);
            self.config.rate.pause().await;
        }

        progress.finish_and_clear();

        // Finalizing
        write_records(&self.config.output, &records)?;
        let stats = RunStats::from_records(&records);

        if let Err(e) = remove_checkpoint(&self.config.checkpoint) {
            warn!(error = %e, "Failed to remove checkpoint");
        }

        Ok(stats)
    }
}

/// Apply checkpoint state to freshly loaded records and return the resume
/// index.
///
/// Every record starts empty regardless of what the input carried: only the
/// checkpoint file feeds the resume index, so a re-run without one always
/// re-fetches everything, and input rows absent from the checkpoint cannot
/// inflate the count.
fn resume_state(records: &mut [PaperRecord], checkpoint: Option<&[CheckpointRow]>) -> usize {
    for record in records.iter_mut() {
        record.abstract_text.clear();
        record.keywords.clear();
    }

    match checkpoint {
        Some(rows) => merge_checkpoint(records, rows),
        None => 0,
    }
}

fn make_progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} papers ({eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> "),
    );
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crossref::DoiClient;
    use crate::scopus::PageExtractor;
    use tempfile::{tempdir, TempDir};

    fn record_with_abstract(link: &str, abstract_text: &str) -> PaperRecord {
        PaperRecord {
            link: link.to_string(),
            abstract_text: abstract_text.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_success_rate_two_of_three() {
        let stats = RunStats {
            total: 3,
            succeeded: 2,
        };
        assert_eq!(format!("{:.2}", stats.success_rate()), "66.67");
    }

    #[test]
    fn test_success_rate_empty_run() {
        let stats = RunStats {
            total: 0,
            succeeded: 0,
        };
        assert_eq!(stats.success_rate(), 0.0);
    }

    #[test]
    fn test_stats_from_records() {
        let records = vec![
            record_with_abstract("a", "found"),
            record_with_abstract("b", ""),
            record_with_abstract("c", "   "),
        ];
        let stats = RunStats::from_records(&records);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.succeeded, 1);
    }

    #[test]
    fn test_no_checkpoint_clears_prepopulated_fields() {
        // Output left over from a previous run must not short-circuit a fresh
        // one; resume goes through the checkpoint file only.
        let mut records = vec![record_with_abstract("a", "stale abstract")];
        records[0].keywords = "stale".to_string();

        let resume = resume_state(&mut records, None);
        assert_eq!(resume, 0);
        assert_eq!(records[0].abstract_text, "");
        assert_eq!(records[0].keywords, "");
    }

    #[test]
    fn test_checkpoint_sets_resume_index() {
        let mut records = vec![
            record_with_abstract("a", ""),
            record_with_abstract("b", ""),
        ];
        let rows = vec![CheckpointRow {
            link: "a".to_string(),
            abstract_text: "done".to_string(),
            keywords: String::new(),
        }];

        let resume = resume_state(&mut records, Some(&rows));
        assert_eq!(resume, 1);
        assert_eq!(records[0].abstract_text, "done");
    }

    #[test]
    fn test_checkpoint_clears_records_it_does_not_cover() {
        // Abstracts pre-populated in the input but absent from the checkpoint
        // must not survive the merge or inflate the resume index.
        let mut records = vec![
            record_with_abstract("a", ""),
            record_with_abstract("b", "stale from input"),
        ];
        let rows = vec![CheckpointRow {
            link: "a".to_string(),
            abstract_text: "done".to_string(),
            keywords: String::new(),
        }];

        let resume = resume_state(&mut records, Some(&rows));
        assert_eq!(resume, 1);
        assert_eq!(records[1].abstract_text, "");
        assert_eq!(records[1].keywords, "");
    }

    /// Runner wired with tempdir paths and a zero delay. Records with empty
    /// link and DOI short-circuit both tiers, so no HTTP is ever issued.
    fn test_runner(dir: &TempDir, input_csv: &str) -> Runner {
        let input = dir.path().join("papers.csv");
        std::fs::write(&input, input_csv).expect("write input");

        let config = RunConfig {
            input,
            output: dir.path().join("out.csv"),
            checkpoint: dir.path().join("progress_checkpoint.csv"),
            batch_size: 1,
            rate: RateLimit::none(),
        };
        let processor = PaperProcessor::new(
            PageExtractor::new().expect("page client"),
            DoiClient::new().expect("doi client"),
        );
        Runner::new(config, processor)
    }

    #[tokio::test]
    async fn test_full_run_writes_output_and_removes_checkpoint() {
        let dir = tempdir().expect("tempdir");
        let runner = test_runner(&dir, "Title,Link,DOI\nPaper A,,\nPaper B,,\nPaper C,,\n");

        let stats = runner.run().await.expect("run");
        assert_eq!(stats.total, 3);
        assert_eq!(stats.succeeded, 0);

        // Output exists with all rows in input order; checkpoint is gone.
        let output = load_records(&dir.path().join("out.csv")).expect("reload");
        assert_eq!(output.len(), 3);
        assert_eq!(output[0].title, "Paper A");
        assert_eq!(output[2].title, "Paper C");
        assert!(!dir.path().join("progress_checkpoint.csv").exists());
    }

    #[tokio::test]
    async fn test_resumed_run_keeps_checkpointed_abstracts() {
        let dir = tempdir().expect("tempdir");
        let runner = test_runner(
            &dir,
            "Title,Link,DOI\nPaper A,https://example.org/a,\nPaper B,,\nPaper C,,\n",
        );

        // Checkpoint from an interrupted run covering the first record. The
        // resumed run starts past it, so its link is never fetched.
        std::fs::write(
            dir.path().join("progress_checkpoint.csv"),
            "Link,Abstract,Keywords\nhttps://example.org/a,Already extracted.,kw1; kw2\n",
        )
        .expect("write checkpoint");

        let stats = runner.run().await.expect("run");
        assert_eq!(stats.total, 3);
        assert_eq!(stats.succeeded, 1);

        let output = load_records(&dir.path().join("out.csv")).expect("reload");
        assert_eq!(output[0].abstract_text, "Already extracted.");
        assert_eq!(output[0].keywords, "kw1; kw2");
        assert_eq!(output[1].abstract_text, "");
        assert_eq!(output[2].abstract_text, "");
        assert!(!dir.path().join("progress_checkpoint.csv").exists());
    }

    #[tokio::test]
    async fn test_zero_delay_policy_returns_immediately() {
        let rate = RateLimit::none();
        let started = std::time::Instant::now();
        rate.pause().await;
        assert!(started.elapsed() < Duration::from_millis(50));
    }
}
