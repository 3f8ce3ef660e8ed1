// TestDependencies - mock implementations for testing
//
// Scripted stand-ins for the Base* traits so pipeline behavior can be
// asserted without a network or a database.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use mediere_client::RawListing;
use serde_json::json;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::traits::{BaseDestination, BaseListingSource};

/// Minimal listing carrying only an id, for diff/pipeline tests.
pub fn listing_with_id(id: &str) -> RawListing {
    RawListing::from_api_row([("id".to_string(), json!(id))].into_iter().collect())
}

// =============================================================================
// Mock Listing Source
// =============================================================================

enum ScriptedPage {
    Rows(Vec<RawListing>),
    TransportError(String),
}

pub struct MockListingSource {
    pages: Arc<Mutex<Vec<ScriptedPage>>>,
    requested: Arc<Mutex<Vec<u32>>>,
}

impl MockListingSource {
    pub fn new() -> Self {
        Self {
            pages: Arc::new(Mutex::new(Vec::new())),
            requested: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Script the next page of listings. Pages beyond the script are empty.
    pub fn with_page(self, listings: Vec<RawListing>) -> Self {
        self.pages
            .lock()
            .unwrap()
            .push(ScriptedPage::Rows(listings));
        self
    }

    /// Script a transport failure for the next page.
    pub fn with_transport_error(self, message: &str) -> Self {
        self.pages
            .lock()
            .unwrap()
            .push(ScriptedPage::TransportError(message.to_string()));
        self
    }

    /// Page numbers the pipeline asked for, in order.
    pub fn pages_requested(&self) -> Vec<u32> {
        self.requested.lock().unwrap().clone()
    }
}

impl Default for MockListingSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseListingSource for MockListingSource {
    async fn fetch_page(&self, page: u32) -> Result<Vec<RawListing>> {
        self.requested.lock().unwrap().push(page);
        let pages = self.pages.lock().unwrap();
        match pages.get((page - 1) as usize) {
            Some(ScriptedPage::Rows(listings)) => Ok(listings.clone()),
            Some(ScriptedPage::TransportError(message)) => Err(anyhow!("{}", message)),
            None => Ok(Vec::new()),
        }
    }
}

// =============================================================================
// Mock Destination
// =============================================================================

pub struct MockDestination {
    purge_calls: Arc<Mutex<u32>>,
    replicated: Arc<Mutex<Vec<String>>>,
    failing_ids: HashSet<String>,
    purged_count: u64,
}

impl MockDestination {
    pub fn new() -> Self {
        Self {
            purge_calls: Arc::new(Mutex::new(0)),
            replicated: Arc::new(Mutex::new(Vec::new())),
            failing_ids: HashSet::new(),
            purged_count: 0,
        }
    }

    /// Make `replicate` fail for the given listing id.
    pub fn with_failing_id(mut self, id: &str) -> Self {
        self.failing_ids.insert(id.to_string());
        self
    }

    /// Entity count `purge` reports as removed.
    pub fn with_purged_count(mut self, count: u64) -> Self {
        self.purged_count = count;
        self
    }

    pub fn purge_calls(&self) -> u32 {
        *self.purge_calls.lock().unwrap()
    }

    /// Ids successfully replicated, in order.
    pub fn replicated_ids(&self) -> Vec<String> {
        self.replicated.lock().unwrap().clone()
    }
}

impl Default for MockDestination {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseDestination for MockDestination {
    async fn purge(&self) -> Result<u64> {
        *self.purge_calls.lock().unwrap() += 1;
        Ok(self.purged_count)
    }

    async fn replicate(&self, listing: &RawListing) -> Result<()> {
        if self.failing_ids.contains(listing.id()) {
            return Err(anyhow!("injected write failure for id {}", listing.id()));
        }
        self.replicated
            .lock()
            .unwrap()
            .push(listing.id().to_string());
        Ok(())
    }
}
