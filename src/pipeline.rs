//! Pipeline Orchestrator
//!
//! Drives one idempotent pass: fetch listings, skip ones already in the
//! store, classify the rest, alert on qualifying matches, and record
//! every processed listing regardless of delivery outcome.

use sqlx::SqlitePool;
use std::time::Duration;

use crate::db::queries;
use crate::models::judgment::Judgment;
use crate::services::classifier::Classifier;
use crate::services::notifier::Dispatcher;
use crate::services::source::{ListingSource, SourceError};

pub const DEFAULT_DELIVERY_THRESHOLD: i64 = 5;
pub const DEFAULT_LISTING_DELAY: Duration = Duration::from_secs(3);

/// Per-run parameters for the orchestrator.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub endpoint: String,
    pub max_listings: usize,
    pub delivery_threshold: i64,
    /// Uniform pause after each classified listing, honoring the
    /// classifier's rate limits. Skipped listings incur no delay.
    pub listing_delay: Duration,
}

/// Counters for one completed pass, logged at run end.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub fetched: usize,
    pub skipped: usize,
    pub evaluated: usize,
    pub delivered: usize,
    pub stored: usize,
}

/// Only store and source infrastructure failures abort a run; every
/// per-listing condition is absorbed.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("listing store failure: {0}")]
    Store(#[from] sqlx::Error),

    #[error("listing source failure: {0}")]
    Source(#[from] SourceError),
}

/// Delivery decision rule: alert on listings at or above the threshold
/// that come from a direct employer rather than an agency.
pub fn should_deliver(judgment: &Judgment, threshold: i64) -> bool {
    judgment.score >= threshold && !judgment.is_agency
}

/// Run one sequential pass over the source's output.
pub async fn run_pipeline(
    pool: &SqlitePool,
    source: &dyn ListingSource,
    classifier: &dyn Classifier,
    dispatcher: &dyn Dispatcher,
    opts: &PipelineOptions,
) -> Result<RunSummary, PipelineError> {
    let listings = source.fetch(&opts.endpoint, opts.max_listings).await?;

    let mut summary = RunSummary {
        fetched: listings.len(),
        ..RunSummary::default()
    };

    tracing::info!(count = listings.len(), "fetched listings, beginning processing");

    for listing in &listings {
        if queries::job_exists(pool, &listing.url).await? {
            tracing::info!(title = %listing.title, "skipping already-processed listing");
            summary.skipped += 1;
            continue;
        }

        tracing::info!(title = %listing.title, "evaluating new listing");
        let judgment = classifier
            .classify(&listing.title, &listing.description)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(
                    title = %listing.title,
                    error = %e,
                    "classification failed, recording sentinel judgment"
                );
                Judgment::failed(e)
            });
        summary.evaluated += 1;

        if should_deliver(&judgment, opts.delivery_threshold) {
            tracing::info!(
                title = %listing.title,
                score = judgment.score,
                "match found, dispatching alert"
            );
            if dispatcher.dispatch(listing, &judgment).await {
                summary.delivered += 1;
            } else {
                tracing::warn!(
                    title = %listing.title,
                    "alert delivery failed, listing will still be recorded"
                );
            }
        } else {
            tracing::info!(
                title = %listing.title,
                score = judgment.score,
                is_agency = judgment.is_agency,
                "listing below delivery bar"
            );
        }

        if queries::insert_job(pool, listing, &judgment).await? {
            summary.stored += 1;
        } else {
            // Lost an exists/insert race to another writer.
            tracing::warn!(url = %listing.url, "listing already recorded by a concurrent writer");
        }

        tokio::time::sleep(opts.listing_delay).await;
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn judgment(score: i64, is_agency: bool) -> Judgment {
        Judgment {
            score,
            summary: String::new(),
            is_agency,
        }
    }

    #[test]
    fn delivery_rule_requires_threshold_and_direct_employer() {
        assert!(should_deliver(&judgment(7, false), 5));
        assert!(!should_deliver(&judgment(7, true), 5));
        assert!(!should_deliver(&judgment(4, false), 5));
        assert!(!should_deliver(&judgment(10, true), 5));
    }

    #[test]
    fn delivery_rule_threshold_is_inclusive() {
        assert!(should_deliver(&judgment(5, false), 5));
        assert!(!should_deliver(&judgment(4, false), 5));
    }

    #[test]
    fn sentinel_judgment_is_never_delivered() {
        assert!(!should_deliver(&Judgment::failed("remote call failed"), 5));
    }
}
