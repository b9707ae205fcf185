use std::io::{self, Write};
use std::time::Duration;

use crate::http::Transport;

use super::{
    Category, Classified, DeletionOutcome, HistoryError, RetryPolicy, Sleeper, classify,
    delete_with_retry, pages,
};

#[derive(Debug, Clone)]
pub(crate) struct CleanupOptions {
    pub(crate) filter: Option<Category>,
    pub(crate) inter_delete_delay: Duration,
    pub(crate) page_size: u32,
    pub(crate) start_cursor: Option<String>,
    pub(crate) retry: RetryPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Decision {
    Delete,
    Skip,
    Stop,
}

impl From<bool> for Decision {
    fn from(delete: bool) -> Self {
        if delete { Self::Delete } else { Self::Skip }
    }
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum CleanupError {
    #[error("failed to fetch watch history: {0}")]
    Fetch(#[from] HistoryError),
    // a page fetch failed after earlier pages were already processed
    #[error("failed to fetch watch history: {source}")]
    Aborted {
        source: HistoryError,
        partial: Box<RunSummary>,
    },
    #[error("failed to write progress: {0}")]
    Output(#[from] io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EntryReport {
    pub(crate) id: String,
    pub(crate) label: String,
    pub(crate) outcome: DeletionOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RunSummary {
    pub(crate) reports: Vec<EntryReport>,
    pub(crate) filtered: usize,
    pub(crate) pages: usize,
    pub(crate) stopped: bool,
}

impl RunSummary {
    fn count(&self, predicate: impl Fn(&DeletionOutcome) -> bool) -> usize {
        self.reports
            .iter()
            .filter(|report| predicate(&report.outcome))
            .count()
    }

    pub(crate) fn deleted(&self) -> usize {
        self.count(|outcome| *outcome == DeletionOutcome::Success)
    }

    pub(crate) fn failed(&self) -> usize {
        self.count(|outcome| matches!(outcome, DeletionOutcome::Failed(_)))
    }

    pub(crate) fn skipped(&self) -> usize {
        self.count(|outcome| *outcome == DeletionOutcome::Skipped)
    }

    pub(crate) fn describe(&self) -> String {
        format!(
            "{}: {} deleted, {} failed, {} skipped, {} filtered out across {} page(s).",
            if self.stopped { "Stopped" } else { "Done" },
            self.deleted(),
            self.failed(),
            self.skipped(),
            self.filtered,
            self.pages
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct PreviewSummary {
    pub(crate) listed: usize,
    pub(crate) filtered: usize,
    pub(crate) pages: usize,
}

impl PreviewSummary {
    pub(crate) fn describe(&self) -> String {
        format!(
            "Dry run: {} item(s) listed, {} filtered out across {} page(s). Nothing was deleted.",
            self.listed, self.filtered, self.pages
        )
    }
}

fn matches_filter(filter: Option<Category>, classified: &Classified) -> bool {
    filter.is_none_or(|wanted| wanted == classified.category)
}

/// Delete what `decide` approves. A failed page fetch returns the summary so far
/// inside `CleanupError::Aborted`; a failed delete is recorded and the run moves on.
pub(crate) fn run_cleanup<T: Transport + ?Sized>(
    transport: &T,
    sleeper: &dyn Sleeper,
    user_id: &str,
    options: &CleanupOptions,
    decide: &mut dyn FnMut(&Classified) -> Decision,
    out: &mut dyn Write,
) -> Result<RunSummary, CleanupError> {
    let mut summary = RunSummary::default();

    for page in pages(
        transport,
        user_id,
        options.page_size,
        options.start_cursor.clone(),
    ) {
        let page = match page {
            Ok(page) => page,
            Err(source) => {
                return Err(CleanupError::Aborted {
                    source,
                    partial: Box::new(summary),
                });
            }
        };
        summary.pages += 1;

        for entry in page.entries {
            let classified = classify(&entry);
            if !matches_filter(options.filter, &classified) {
                summary.filtered += 1;
                continue;
            }

            writeln!(out, "Found: {} (ID: {})", classified.label, entry.id)?;

            let outcome = match decide(&classified) {
                Decision::Stop => {
                    tracing::info!(id = %entry.id, "run stopped before deciding on entry");
                    summary.stopped = true;
                    return Ok(summary);
                }
                Decision::Skip => DeletionOutcome::Skipped,
                Decision::Delete => {
                    let result = delete_with_retry(transport, sleeper, &options.retry, &entry.id);
                    let outcome = match result {
                        Ok(()) => {
                            writeln!(out, "✅ Successfully deleted: {}", classified.label)?;
                            DeletionOutcome::Success
                        }
                        Err(err) => {
                            writeln!(out, "❌ Failed to delete: {} ({err})", classified.label)?;
                            DeletionOutcome::Failed(err.to_string())
                        }
                    };
                    sleeper.sleep(options.inter_delete_delay);
                    outcome
                }
            };

            summary.reports.push(EntryReport {
                id: entry.id,
                label: classified.label,
                outcome,
            });
        }
    }

    Ok(summary)
}

pub(crate) fn preview_history<T: Transport + ?Sized>(
    transport: &T,
    user_id: &str,
    options: &CleanupOptions,
    out: &mut dyn Write,
) -> Result<PreviewSummary, CleanupError> {
    let mut summary = PreviewSummary::default();

    for page in pages(
        transport,
        user_id,
        options.page_size,
        options.start_cursor.clone(),
    ) {
        let page = page?;
        summary.pages += 1;

        for entry in &page.entries {
            let classified = classify(entry);
            if !matches_filter(options.filter, &classified) {
                summary.filtered += 1;
                continue;
            }
            writeln!(out, "Found: {} (ID: {})", classified.label, entry.id)?;
            summary.listed += 1;
        }
    }

    Ok(summary)
}
