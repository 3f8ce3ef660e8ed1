// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - the fetch and replication seams of
// the pipeline. Policy (pagination termination, skip-on-failure) lives in
// the orchestrator, not here.
//
// Naming convention: Base* for trait names (e.g. BaseListingSource)

use anyhow::Result;
use async_trait::async_trait;
use mediere_client::RawListing;

// =============================================================================
// Listing Source Trait (Infrastructure)
// =============================================================================

#[async_trait]
pub trait BaseListingSource: Send + Sync {
    /// Fetch one page of normalized listings. An empty page means the
    /// source is exhausted; an error is a transport failure for that page.
    async fn fetch_page(&self, page: u32) -> Result<Vec<RawListing>>;
}

// =============================================================================
// Destination Store Trait (Infrastructure)
// =============================================================================

#[async_trait]
pub trait BaseDestination: Send + Sync {
    /// Delete every pipeline-managed attribute row, then every
    /// pipeline-managed entity row. Returns the number of entities removed.
    async fn purge(&self) -> Result<u64>;

    /// Write one listing: entity upsert plus its attribute rows, inside a
    /// single commit boundary. Failure rolls back this listing only.
    async fn replicate(&self, listing: &RawListing) -> Result<()>;
}
