//! HTTP-backed listing source.
//!
//! Thin adapter putting `MediereClient` behind the `BaseListingSource`
//! seam so the pipeline can be driven by mocks in tests.

use anyhow::Result;
use async_trait::async_trait;
use mediere_client::{MediereClient, RawListing};

use crate::config::Config;
use crate::traits::BaseListingSource;

pub struct HttpListingSource {
    client: MediereClient,
}

impl HttpListingSource {
    pub fn new(config: &Config) -> Result<Self> {
        let client = MediereClient::new(
            config.api_base_url.clone(),
            config.session_cookie.clone(),
            config.page_size,
        )?;
        Ok(Self { client })
    }
}

#[async_trait]
impl BaseListingSource for HttpListingSource {
    async fn fetch_page(&self, page: u32) -> Result<Vec<RawListing>> {
        let listings = self.client.fetch_page(page).await?;
        Ok(listings)
    }
}
