use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;

/// Pipeline configuration loaded from environment variables.
///
/// Built once per run invocation and handed to the orchestrator at
/// construction; nothing here is read lazily mid-run.
#[derive(Debug, Clone)]
pub struct Config {
    /// MySQL connection string for the destination store. Optional: a run
    /// without a reachable destination still fetches, diffs and persists
    /// the snapshot.
    pub database_url: Option<String>,
    /// WordPress table prefix (`{prefix}posts`, `{prefix}postmeta`).
    pub table_prefix: String,
    pub api_base_url: String,
    /// Deployment-specific session cookie for the listing endpoint.
    pub session_cookie: Option<String>,
    pub page_size: u32,
    pub snapshot_path: PathBuf,
    pub batch_path: PathBuf,
    /// Media attachment id used for every listing's `_thumbnail_id`.
    pub thumbnail_id: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").ok(),
            table_prefix: env::var("TABLE_PREFIX").unwrap_or_else(|_| "wp_".to_string()),
            api_base_url: env::var("API_BASE_URL")
                .unwrap_or_else(|_| "https://mediere.anofm.ro".to_string()),
            session_cookie: env::var("API_SESSION_COOKIE").ok(),
            page_size: env::var("PAGE_SIZE")
                .unwrap_or_else(|_| "100".to_string())
                .parse()
                .context("PAGE_SIZE must be a valid number")?,
            snapshot_path: env::var("SNAPSHOT_PATH")
                .unwrap_or_else(|_| "job_postings.csv".to_string())
                .into(),
            batch_path: env::var("BATCH_PATH")
                .unwrap_or_else(|_| "new_jobs.csv".to_string())
                .into(),
            thumbnail_id: env::var("THUMBNAIL_ID").unwrap_or_else(|_| "9769".to_string()),
        })
    }
}
