//! Run orchestration.
//!
//! One run is a linear pass: load baseline, fetch every page, clear the
//! previous batch artifact, diff, persist the snapshot union, then wipe and
//! re-insert the destination. The destination is only touched when there is
//! confirmed new data and a live connection, so a run that fetched nothing
//! can never empty the store.
//!
//! Known atomicity gap: between the destination wipe and the last record
//! insert, external termination leaves the store cleared but not yet
//! refilled. The data is regenerable from the source on the next run.

use anyhow::Result;
use mediere_client::RawListing;

use crate::baseline::BaselineStore;
use crate::config::Config;
use crate::diff;
use crate::traits::{BaseDestination, BaseListingSource};

/// Terminal state of a run, mapped to the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// New listings were found and the replication pass ran.
    Replicated,
    /// Nothing new this run; destination left untouched.
    NothingNew,
    /// No destination connection; fetch/diff/snapshot phases still ran.
    DestinationUnavailable,
    /// Zero rows fetched and the first page failed at the transport level.
    SourceUnavailable,
}

impl RunOutcome {
    pub fn exit_code(self) -> u8 {
        match self {
            RunOutcome::Replicated | RunOutcome::NothingNew => 0,
            RunOutcome::DestinationUnavailable => 1,
            RunOutcome::SourceUnavailable => 2,
        }
    }
}

/// Summary of one end-to-end run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub fetched: usize,
    pub new: usize,
    pub replicated: usize,
    pub skipped: usize,
    pub purged: u64,
    pub outcome: RunOutcome,
}

impl RunReport {
    fn terminal(fetched: usize, outcome: RunOutcome) -> Self {
        Self {
            fetched,
            new: 0,
            replicated: 0,
            skipped: 0,
            purged: 0,
            outcome,
        }
    }
}

struct FetchOutcome {
    listings: Vec<RawListing>,
    pages: u32,
    transport_error: Option<String>,
}

/// Sequences one fetch -> diff -> snapshot -> wipe -> replicate run.
pub struct Pipeline {
    config: Config,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Execute one run. The destination is `None` when no connection could
    /// be established; everything up to and including snapshot persistence
    /// still happens in that case.
    pub async fn run(
        &self,
        source: &dyn BaseListingSource,
        destination: Option<&dyn BaseDestination>,
    ) -> Result<RunReport> {
        let store = BaselineStore::new(
            self.config.snapshot_path.clone(),
            self.config.batch_path.clone(),
        );
        let baseline = store.load();

        let fetch = fetch_all(source).await;
        tracing::info!(
            fetched = fetch.listings.len(),
            pages = fetch.pages,
            "Fetch phase complete"
        );

        // Stale artifact from the previous run must not survive into this one.
        store.clear_batch()?;

        if fetch.listings.is_empty() {
            // Baseline stays untouched and the destination is never wiped.
            return Ok(if fetch.transport_error.is_some() {
                tracing::error!("Source produced no data due to a transport failure");
                RunReport::terminal(0, RunOutcome::SourceUnavailable)
            } else {
                tracing::info!("Source returned no listings");
                RunReport::terminal(0, RunOutcome::NothingNew)
            });
        }

        let new = diff::new_listings(&fetch.listings, &baseline);
        if new.is_empty() {
            tracing::info!("No new listings this run");
            return Ok(RunReport::terminal(fetch.listings.len(), RunOutcome::NothingNew));
        }
        tracing::info!(new = new.len(), "Diff phase complete");

        // Snapshot before touching the destination: a failed replication
        // phase must not cause re-classification on the next run.
        store.save_batch(&new)?;
        let union: Vec<RawListing> = baseline.into_iter().chain(new.iter().cloned()).collect();
        store.save_snapshot(&union)?;
        tracing::info!(total = union.len(), "Snapshot persisted");

        let Some(destination) = destination else {
            tracing::error!(
                new = new.len(),
                "No destination connection - skipping wipe and replication"
            );
            return Ok(RunReport {
                fetched: fetch.listings.len(),
                new: new.len(),
                replicated: 0,
                skipped: 0,
                purged: 0,
                outcome: RunOutcome::DestinationUnavailable,
            });
        };

        let purged = destination.purge().await?;
        tracing::info!(purged, "Destination wiped");

        let mut replicated = 0usize;
        let mut skipped = 0usize;
        for listing in &new {
            match destination.replicate(listing).await {
                Ok(()) => replicated += 1,
                Err(e) => {
                    // Skip and keep going; the record is logged for manual replay.
                    tracing::error!(id = listing.id(), error = %e, "Failed to replicate listing");
                    skipped += 1;
                }
            }
        }

        Ok(RunReport {
            fetched: fetch.listings.len(),
            new: new.len(),
            replicated,
            skipped,
            purged,
            outcome: RunOutcome::Replicated,
        })
    }
}

/// Drive the source page by page until exhaustion. A transport failure is
/// treated as exhaustion for that page: the run proceeds with whatever was
/// fetched so far rather than aborting.
async fn fetch_all(source: &dyn BaseListingSource) -> FetchOutcome {
    let mut listings = Vec::new();
    let mut page = 1u32;
    let mut transport_error = None;

    loop {
        match source.fetch_page(page).await {
            Ok(batch) if batch.is_empty() => break,
            Ok(mut batch) => {
                tracing::info!(page, count = batch.len(), "Fetched page");
                listings.append(&mut batch);
                page += 1;
            }
            Err(e) => {
                tracing::warn!(page, error = %e, "Page fetch failed - treating as exhausted");
                transport_error = Some(e.to_string());
                break;
            }
        }
    }

    FetchOutcome {
        listings,
        pages: page - 1,
        transport_error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_dependencies::{listing_with_id, MockListingSource};

    #[tokio::test]
    async fn fetch_all_stops_on_first_empty_page() {
        let source = MockListingSource::new()
            .with_page(vec![listing_with_id("1"), listing_with_id("2")])
            .with_page(vec![listing_with_id("3")]);

        let outcome = fetch_all(&source).await;
        assert_eq!(outcome.listings.len(), 3);
        assert_eq!(outcome.pages, 2);
        assert!(outcome.transport_error.is_none());
        // Page 3 (empty) was requested, page 4 never was.
        assert_eq!(source.pages_requested(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn fetch_all_treats_transport_failure_as_exhaustion() {
        let source = MockListingSource::new()
            .with_page(vec![listing_with_id("1")])
            .with_transport_error("connection reset");

        let outcome = fetch_all(&source).await;
        assert_eq!(outcome.listings.len(), 1);
        assert_eq!(outcome.transport_error.as_deref(), Some("connection reset"));
    }

    #[test]
    fn exit_codes_distinguish_failure_modes() {
        assert_eq!(RunOutcome::Replicated.exit_code(), 0);
        assert_eq!(RunOutcome::NothingNew.exit_code(), 0);
        assert_eq!(RunOutcome::DestinationUnavailable.exit_code(), 1);
        assert_eq!(RunOutcome::SourceUnavailable.exit_code(), 2);
    }
}
