//! Baseline snapshot store.
//!
//! Durable record of every listing seen as of the last successful run,
//! persisted as CSV with the column set derived from the first record.
//! Loads tolerate legacy encodings (the snapshot has historically been
//! edited and re-saved by spreadsheet tools); saves always write UTF-8.
//! A missing or unreadable snapshot is the "first run" state, not an error.

use anyhow::{Context, Result};
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use indexmap::IndexMap;
use mediere_client::{FieldValue, RawListing};
use std::path::{Path, PathBuf};

/// Non-BOM decode attempts, in order. windows-1252 accepts any byte
/// sequence, so it doubles as the latin1/cp1252 fallback.
static FALLBACK_ENCODINGS: [&Encoding; 2] = [UTF_8, WINDOWS_1252];

pub struct BaselineStore {
    snapshot_path: PathBuf,
    batch_path: PathBuf,
}

impl BaselineStore {
    pub fn new(snapshot_path: PathBuf, batch_path: PathBuf) -> Self {
        Self {
            snapshot_path,
            batch_path,
        }
    }

    /// Load the baseline snapshot. Returns an empty baseline when the file
    /// is absent or unreadable in every supported encoding.
    pub fn load(&self) -> Vec<RawListing> {
        let bytes = match std::fs::read(&self.snapshot_path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(
                    path = %self.snapshot_path.display(),
                    "No baseline snapshot found - starting fresh"
                );
                return Vec::new();
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.snapshot_path.display(),
                    error = %e,
                    "Could not read baseline snapshot - treating as empty"
                );
                return Vec::new();
            }
        };

        let Some((text, encoding)) = decode_snapshot(&bytes) else {
            tracing::warn!(
                path = %self.snapshot_path.display(),
                "Baseline snapshot unreadable in every supported encoding - treating as empty"
            );
            return Vec::new();
        };

        match parse_csv(&text) {
            Ok(listings) => {
                tracing::info!(
                    count = listings.len(),
                    encoding,
                    "Loaded baseline snapshot"
                );
                listings
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.snapshot_path.display(),
                    error = %e,
                    "Baseline snapshot is not valid CSV - treating as empty"
                );
                Vec::new()
            }
        }
    }

    /// Persist the full snapshot (old baseline plus this run's new listings).
    pub fn save_snapshot(&self, listings: &[RawListing]) -> Result<()> {
        write_csv(&self.snapshot_path, listings)
    }

    /// Persist this run's new-listings batch for manual replay.
    pub fn save_batch(&self, listings: &[RawListing]) -> Result<()> {
        write_csv(&self.batch_path, listings)
    }

    /// Remove the previous run's batch artifact, if any.
    pub fn clear_batch(&self) -> Result<()> {
        match std::fs::remove_file(&self.batch_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| {
                format!("Failed to remove batch file {}", self.batch_path.display())
            }),
        }
    }
}

fn decode_snapshot(bytes: &[u8]) -> Option<(String, &'static str)> {
    // BOM wins: UTF-16 snapshots are only recognizable this way.
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        return encoding
            .decode_without_bom_handling_and_without_replacement(&bytes[bom_len..])
            .map(|text| (text.into_owned(), encoding.name()));
    }

    for encoding in FALLBACK_ENCODINGS {
        if let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(bytes) {
            return Some((text.into_owned(), encoding.name()));
        }
    }
    None
}

fn parse_csv(text: &str) -> Result<Vec<RawListing>> {
    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let headers: Vec<String> = reader
        .headers()
        .context("Failed to read snapshot header row")?
        .iter()
        .map(str::to_string)
        .collect();

    let mut listings = Vec::new();
    for record in reader.records() {
        let record = record.context("Failed to read snapshot row")?;
        let mut fields = IndexMap::with_capacity(headers.len());
        for (name, value) in headers.iter().zip(record.iter()) {
            fields.insert(name.clone(), FieldValue::Text(value.trim().to_string()));
        }
        listings.push(RawListing::from_fields(fields));
    }
    Ok(listings)
}

/// Write listings as CSV. Columns come from the first record; all records
/// in one snapshot share the same field set (precondition, not validated).
/// An empty set writes nothing.
fn write_csv(path: &Path, listings: &[RawListing]) -> Result<()> {
    let Some(first) = listings.first() else {
        return Ok(());
    };

    let headers: Vec<&str> = first.field_names().collect();
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(&headers)
        .context("Failed to write snapshot header row")?;
    for listing in listings {
        writer
            .write_record(headers.iter().map(|name| listing.render_field(name)))
            .context("Failed to write snapshot row")?;
    }

    let buf = writer
        .into_inner()
        .context("Failed to flush snapshot writer")?;
    std::fs::write(path, buf)
        .with_context(|| format!("Failed to write snapshot file {}", path.display()))?;
    Ok(())
}
