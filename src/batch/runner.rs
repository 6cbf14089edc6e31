use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, info};

use crate::config::{BatchConfig, LookupMode};
use crate::reddit::CommentLookup;
use super::input::{self, InputRow};

/// Drives a [`CommentLookup`] over every row of the input, one row at a time.
pub struct BatchRunner<L> {
    lookup: L,
    input_path: PathBuf,
    output_path: PathBuf,
    throttle: Duration,
    mode: LookupMode,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    /// Lines written to the output.
    pub written: usize,
    /// Rows whose lookup found a comment.
    pub found: usize,
    /// Rows that faulted and produced no line.
    pub failed: usize,
}

impl<L: CommentLookup> BatchRunner<L> {
    pub fn new(lookup: L, config: &BatchConfig) -> Self {
        Self {
            lookup,
            input_path: config.input_path.clone(),
            output_path: config.output_path.clone(),
            throttle: config.throttle(),
            mode: config.mode,
        }
    }

    pub async fn run(&self) -> Result<BatchSummary> {
        let rows = input::read_rows(&self.input_path)?;
        info!(
            "Loaded {} rows from {} (mode: {:?}, throttle: {:?})",
            rows.len(),
            self.input_path.display(),
            self.mode,
            self.throttle
        );

        let mut output = tokio::fs::File::create(&self.output_path)
            .await
            .with_context(|| format!("Failed to create output file {}", self.output_path.display()))?;

        let summary = self.process_rows(&rows, &mut output).await;

        info!(
            "All done! {} lines written to {} ({} with comments, {} failed)",
            summary.written,
            self.output_path.display(),
            summary.found,
            summary.failed
        );
        Ok(summary)
    }

    /// Faulting rows are logged and skipped; the batch always reaches the end.
    pub async fn process_rows<W>(&self, rows: &[InputRow], output: &mut W) -> BatchSummary
    where
        W: AsyncWrite + Unpin,
    {
        let mut summary = BatchSummary::default();

        for (idx, row) in rows.iter().enumerate() {
            let username = row.username();
            info!("Processing row {} ({})", idx + 1, username);
            if !row.extra.is_empty() {
                debug!("Row {} passthrough columns: {:?}", idx + 1, row.extra);
            }

            match self.process_row(username, output).await {
                Ok(found) => {
                    summary.written += 1;
                    if found {
                        summary.found += 1;
                    }
                }
                Err(e) => {
                    error!("Error processing {}: {:#}", username, e);
                    summary.failed += 1;
                }
            }

            if idx + 1 < rows.len() {
                tokio::time::sleep(self.throttle).await;
            }
        }

        summary
    }

    async fn process_row<W>(&self, username: &str, output: &mut W) -> Result<bool>
    where
        W: AsyncWrite + Unpin,
    {
        let (result, found) = match self.mode {
            LookupMode::Date => {
                let outcome = self.lookup.last_comment_date(username).await;
                (outcome.to_string(), outcome.is_found())
            }
            LookupMode::Details => {
                let outcome = self.lookup.last_comment_details(username).await;
                (outcome.to_string(), outcome.is_found())
            }
        };

        let line = format!("{},{}\n", username, result);
        output
            .write_all(line.as_bytes())
            .await
            .context("Failed to write output line")?;
        output.flush().await.context("Failed to flush output")?;

        Ok(found)
    }
}
