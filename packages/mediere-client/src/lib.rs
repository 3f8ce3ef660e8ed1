//! Pure REST client for the ANOFM mediere job posting API.
//!
//! A minimal client for the public `vw_public_job_posting` entity endpoint.
//! Supports fetching one page of postings at a time; the caller drives the
//! page counter and stops on the first empty page.
//!
//! # Example
//!
//! ```rust,ignore
//! use mediere_client::MediereClient;
//!
//! let client = MediereClient::new("https://mediere.anofm.ro".into(), None, 100)?;
//!
//! let listings = client.fetch_page(1).await?;
//! for listing in &listings {
//!     println!("{}", listing.id());
//! }
//! ```

pub mod error;
pub mod types;

pub use error::{ClientError, Result};
pub use types::{FieldValue, PageRequest, PageResponse, RawListing};

use std::time::Duration;

/// Entity view queried for public job postings.
const JOB_POSTING_ENTITY: &str = "vw_public_job_posting";

pub struct MediereClient {
    client: reqwest::Client,
    base_url: String,
    page_size: u32,
}

impl MediereClient {
    /// Build a client for the given deployment. The session cookie is
    /// deployment-specific transport configuration; pass `None` when the
    /// endpoint is reachable anonymously.
    pub fn new(
        base_url: String,
        session_cookie: Option<String>,
        page_size: u32,
    ) -> Result<Self> {
        // The endpoint sits behind bot detection; present browser-like headers.
        let user_agent = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/134.0.0.0 Safari/537.36";

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(reqwest::header::ACCEPT, "*/*".parse().unwrap());
        headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            "en-US,en;q=0.9".parse().unwrap(),
        );
        headers.insert(reqwest::header::CONNECTION, "keep-alive".parse().unwrap());
        headers.insert(
            reqwest::header::HeaderName::from_static("x-requested-with"),
            "XMLHttpRequest".parse().unwrap(),
        );
        if let Ok(origin) = base_url.parse() {
            headers.insert(reqwest::header::ORIGIN, origin);
        }
        if let Some(cookie) = &session_cookie {
            if let Ok(value) = cookie.parse() {
                headers.insert(reqwest::header::COOKIE, value);
            }
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(user_agent)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url,
            page_size,
        })
    }

    /// Fetch one page of postings. An empty vector means the source is
    /// exhausted at this page.
    pub async fn fetch_page(&self, page: u32) -> Result<Vec<RawListing>> {
        let url = format!("{}/api/entity/{}", self.base_url, JOB_POSTING_ENTITY);
        let body = PageRequest::new(page, self.page_size);

        let resp = self.client.post(&url).json(&body).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let page_resp: PageResponse = resp.json().await?;
        let listings: Vec<RawListing> = page_resp
            .rows
            .into_iter()
            .map(RawListing::from_api_row)
            .collect();

        tracing::debug!(page, count = listings.len(), "Fetched listing page");
        Ok(listings)
    }
}
