// Main entry point for the sync run (invoked by an external scheduler)

use jobsync_core::destination::MySqlDestination;
use jobsync_core::pipeline::Pipeline;
use jobsync_core::source::HttpListingSource;
use jobsync_core::traits::BaseDestination;
use jobsync_core::Config;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,jobsync_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting job listing sync run");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load configuration");
            return ExitCode::from(1);
        }
    };

    let source = match HttpListingSource::new(&config) {
        Ok(source) => source,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build listing API client");
            return ExitCode::from(2);
        }
    };

    // A dead destination must not stop the fetch/diff/snapshot phases.
    let destination = match MySqlDestination::connect(&config).await {
        Ok(destination) => Some(destination),
        Err(e) => {
            tracing::error!(error = %e, "Destination unavailable");
            None
        }
    };

    let pipeline = Pipeline::new(config);
    let result = pipeline
        .run(
            &source,
            destination.as_ref().map(|d| d as &dyn BaseDestination),
        )
        .await;

    // Release the connection on every exit path.
    if let Some(destination) = &destination {
        destination.close().await;
    }

    match result {
        Ok(report) => {
            tracing::info!(
                fetched = report.fetched,
                new = report.new,
                replicated = report.replicated,
                skipped = report.skipped,
                purged = report.purged,
                outcome = ?report.outcome,
                "Run finished"
            );
            ExitCode::from(report.outcome.exit_code())
        }
        Err(e) => {
            tracing::error!(error = %e, "Run aborted");
            ExitCode::from(1)
        }
    }
}
